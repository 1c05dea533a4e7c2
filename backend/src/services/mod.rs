pub mod activity_feed;
pub mod audit_log;
pub mod export;
pub mod moderation;
