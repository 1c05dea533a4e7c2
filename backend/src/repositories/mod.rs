pub mod artisan;
pub mod audit_log;
pub mod common;
pub mod contact;
pub mod review;

pub use artisan::{ArtisanRepository, ArtisanRepositoryTrait};
pub use audit_log::{AuditLogFilters, AuditLogRepository, AuditLogRepositoryTrait};
pub use common::ExportFilter;
pub use contact::{ContactRepository, ContactRepositoryTrait};
pub use review::{ReviewRepository, ReviewRepositoryTrait};
