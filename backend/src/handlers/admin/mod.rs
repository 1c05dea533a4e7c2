pub mod activity;
pub mod audit_logs;
pub mod common;
pub mod export;
pub mod moderation;

pub use activity::*;
pub use audit_logs::*;
pub use export::*;
pub use moderation::*;
