//! Data models shared across database access and API handlers.

pub mod actor;
pub mod artisan;
pub mod audit_log;
pub mod contact;
pub mod review;
