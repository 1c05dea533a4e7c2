use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::Config,
    repositories::{
        ArtisanRepository, ArtisanRepositoryTrait, AuditLogRepository, AuditLogRepositoryTrait,
        ContactRepository, ContactRepositoryTrait, ReviewRepository, ReviewRepositoryTrait,
    },
    services::{
        audit_log::AuditLogService, export::ExportService, moderation::ModerationService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub audit: AuditLogService,
    pub moderation: ModerationService,
    pub export: ExportService,
}

impl AppState {
    pub fn new(
        config: Config,
        artisans: Arc<dyn ArtisanRepositoryTrait>,
        reviews: Arc<dyn ReviewRepositoryTrait>,
        contacts: Arc<dyn ContactRepositoryTrait>,
        audit_logs: Arc<dyn AuditLogRepositoryTrait>,
    ) -> Self {
        let audit = AuditLogService::new(
            audit_logs.clone(),
            config.audit_page_size,
            config.audit_max_page_size,
        );
        let moderation = ModerationService::new(artisans.clone(), reviews.clone());
        let export = ExportService::new(
            artisans,
            reviews,
            contacts,
            audit_logs,
            audit.clone(),
            config.time_zone,
        );
        Self {
            config,
            audit,
            moderation,
            export,
        }
    }

    /// Wires every service to the Postgres-backed repositories.
    pub fn from_pool(pool: PgPool, config: Config) -> Self {
        Self::new(
            config,
            Arc::new(ArtisanRepository::new(pool.clone())),
            Arc::new(ReviewRepository::new(pool.clone())),
            Arc::new(ContactRepository::new(pool.clone())),
            Arc::new(AuditLogRepository::new(pool)),
        )
    }
}
