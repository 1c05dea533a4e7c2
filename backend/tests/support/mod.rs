#![allow(dead_code)]
//! In-memory stand-ins for the Postgres repositories plus shared fixtures.
//!
//! `MemoryStore` implements every repository trait against one shared state,
//! so a transition and its audit row land (or fail) together the same way the
//! transactional implementations behave.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Map;
use sqlx::types::Json;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard,
};
use artisan_connect_backend::{
    config::Config,
    models::{
        actor::{Actor, ActorRole},
        artisan::{Artisan, ArtisanStatus, ArtisanTransition},
        audit_log::AuditLog,
        contact::ContactEvent,
        review::{Review, ReviewStatus, ReviewTransition},
    },
    repositories::{
        AuditLogFilters, ArtisanRepositoryTrait, AuditLogRepositoryTrait, ContactRepositoryTrait,
        ExportFilter, ReviewRepositoryTrait,
    },
    state::AppState,
    types::{ArtisanId, AuditLogId, ContactEventId, ReviewId, UserId},
    utils::jwt::create_access_token,
};

#[derive(Default)]
struct Tables {
    artisans: Vec<Artisan>,
    reviews: Vec<Review>,
    contacts: Vec<ContactEvent>,
    audit_logs: Vec<AuditLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_audit: AtomicBool,
    fail_updates: AtomicBool,
    audit_reads: AtomicUsize,
}

fn unavailable() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}

fn newest_first(logs: &mut [AuditLog]) {
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("lock memory store")
    }

    /// Makes every audit read and write fail as if the store were down.
    pub fn set_audit_unavailable(&self, down: bool) {
        self.fail_audit.store(down, Ordering::SeqCst);
    }

    /// Makes status updates fail after the row was matched.
    pub fn set_updates_failing(&self, failing: bool) {
        self.fail_updates.store(failing, Ordering::SeqCst);
    }

    /// Number of `search`/`recent` calls served so far.
    pub fn audit_reads(&self) -> usize {
        self.audit_reads.load(Ordering::SeqCst)
    }

    fn audit_available(&self) -> Result<(), sqlx::Error> {
        if self.fail_audit.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    pub fn insert_artisan(&self, artisan: Artisan) {
        self.tables().artisans.push(artisan);
    }

    pub fn insert_review(&self, review: Review) {
        self.tables().reviews.push(review);
    }

    pub fn insert_contact(&self, contact: ContactEvent) {
        self.tables().contacts.push(contact);
    }

    pub fn insert_log(&self, log: AuditLog) {
        self.tables().audit_logs.push(log);
    }

    pub fn artisan(&self, id: ArtisanId) -> Option<Artisan> {
        self.tables().artisans.iter().find(|a| a.id == id).cloned()
    }

    pub fn review(&self, id: ReviewId) -> Option<Review> {
        self.tables().reviews.iter().find(|r| r.id == id).cloned()
    }

    /// Every audit row, newest first.
    pub fn audit_logs(&self) -> Vec<AuditLog> {
        let mut logs = self.tables().audit_logs.clone();
        newest_first(&mut logs);
        logs
    }

    pub fn app_state(self: &Arc<Self>, config: Config) -> AppState {
        AppState::new(
            config,
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        )
    }
}

fn in_range(created_at: DateTime<Utc>, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    created_at >= from && created_at < to
}

#[async_trait]
impl ArtisanRepositoryTrait for MemoryStore {
    async fn find_by_id(&self, id: ArtisanId) -> Result<Option<Artisan>, sqlx::Error> {
        Ok(self.artisan(id))
    }

    async fn apply_transition(
        &self,
        transition: &ArtisanTransition,
        audit: &AuditLog,
    ) -> Result<Option<Artisan>, sqlx::Error> {
        let mut tables = self.tables();
        let Some(index) = tables
            .artisans
            .iter()
            .position(|a| a.id == transition.id && transition.expected.contains(&a.status))
        else {
            return Ok(None);
        };
        if self.fail_updates.load(Ordering::SeqCst) || self.fail_audit.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let updated = transition.apply(&tables.artisans[index]);
        tables.artisans[index] = updated.clone();
        tables.audit_logs.push(audit.clone());
        Ok(Some(updated))
    }

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Artisan>, sqlx::Error> {
        let mut rows: Vec<Artisan> = self
            .tables()
            .artisans
            .iter()
            .filter(|a| filter.status.as_deref().map_or(true, |s| a.status.as_str() == s))
            .filter(|a| filter.category.as_deref().map_or(true, |c| a.category == c))
            .filter(|a| filter.is_verified.map_or(true, |v| a.is_verified == v))
            .filter(|a| filter.contains(a.created_at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Artisan>, sqlx::Error> {
        Ok(self
            .tables()
            .artisans
            .iter()
            .filter(|a| in_range(a.created_at, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewRepositoryTrait for MemoryStore {
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, sqlx::Error> {
        Ok(self.review(id))
    }

    async fn apply_transition(
        &self,
        transition: &ReviewTransition,
        audit: &AuditLog,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tables = self.tables();
        let Some(index) = tables
            .reviews
            .iter()
            .position(|r| r.id == transition.id && r.status == transition.expected)
        else {
            return Ok(None);
        };
        if self.fail_updates.load(Ordering::SeqCst) || self.fail_audit.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let updated = transition.apply(&tables.reviews[index]);
        tables.reviews[index] = updated.clone();
        tables.audit_logs.push(audit.clone());
        Ok(Some(updated))
    }

    async fn list_for_export(&self, filter: &ExportFilter) -> Result<Vec<Review>, sqlx::Error> {
        let mut rows: Vec<Review> = self
            .tables()
            .reviews
            .iter()
            .filter(|r| filter.status.as_deref().map_or(true, |s| r.status.as_str() == s))
            .filter(|r| filter.contains(r.created_at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_approved_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Review>, sqlx::Error> {
        Ok(self
            .tables()
            .reviews
            .iter()
            .filter(|r| r.status == ReviewStatus::Approved && in_range(r.created_at, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContactRepositoryTrait for MemoryStore {
    async fn list_for_export(
        &self,
        filter: &ExportFilter,
    ) -> Result<Vec<ContactEvent>, sqlx::Error> {
        let mut rows: Vec<ContactEvent> = self
            .tables()
            .contacts
            .iter()
            .filter(|c| filter.contains(c.created_at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContactEvent>, sqlx::Error> {
        Ok(self
            .tables()
            .contacts
            .iter()
            .filter(|c| in_range(c.created_at, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogRepositoryTrait for MemoryStore {
    async fn insert(&self, log: &AuditLog) -> Result<(), sqlx::Error> {
        self.audit_available()?;
        self.tables().audit_logs.push(log.clone());
        Ok(())
    }

    async fn search(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
        self.audit_reads.fetch_add(1, Ordering::SeqCst);
        self.audit_available()?;
        let mut matching: Vec<AuditLog> = self
            .tables()
            .audit_logs
            .iter()
            .filter(|log| filters.matches(log))
            .cloned()
            .collect();
        newest_first(&mut matching);
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        self.audit_reads.fetch_add(1, Ordering::SeqCst);
        self.audit_available()?;
        let mut logs = self.tables().audit_logs.clone();
        newest_first(&mut logs);
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn export(&self, filter: &ExportFilter) -> Result<Vec<AuditLog>, sqlx::Error> {
        self.audit_available()?;
        let mut logs: Vec<AuditLog> = self
            .tables()
            .audit_logs
            .iter()
            .filter(|log| filter.actor_id.map_or(true, |actor| log.actor_id == actor))
            .filter(|log| {
                filter
                    .action_type
                    .as_deref()
                    .map_or(true, |action| log.action_type == action)
            })
            .filter(|log| filter.contains(log.created_at))
            .cloned()
            .collect();
        newest_first(&mut logs);
        Ok(logs)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-jwt-secret".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn admin() -> Actor {
    let mut actor = Actor::new(UserId::new(), ActorRole::Admin);
    actor.name = Some("Ada Admin".to_string());
    actor
}

pub fn artisan_user() -> Actor {
    Actor::new(UserId::new(), ActorRole::Artisan)
}

pub fn buyer() -> Actor {
    Actor::new(UserId::new(), ActorRole::Buyer)
}

pub fn create_test_token(actor: &Actor, config: &Config) -> String {
    create_access_token(actor, &config.jwt_secret, 1).expect("create test token")
}

pub fn make_artisan(status: ArtisanStatus, category: &str) -> Artisan {
    let now = Utc::now();
    Artisan {
        id: ArtisanId::new(),
        user_id: UserId::new(),
        business_name: format!("{} Works", category),
        category: category.to_string(),
        location: "Lagos".to_string(),
        phone: Some("+2348000000000".to_string()),
        status,
        is_verified: false,
        verification_method: None,
        verified_at: None,
        verified_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn make_review(artisan_id: ArtisanId, status: ReviewStatus, rating: i16) -> Review {
    Review {
        id: ReviewId::new(),
        artisan_id,
        reviewer_id: UserId::new(),
        rating,
        comment: Some("Great work".to_string()),
        status,
        moderated_by: None,
        moderated_at: None,
        created_at: Utc::now(),
    }
}

pub fn make_contact(artisan_id: ArtisanId, created_at: DateTime<Utc>) -> ContactEvent {
    ContactEvent {
        id: ContactEventId::new(),
        artisan_id,
        buyer_id: Some(UserId::new()),
        channel: "whatsapp".to_string(),
        created_at,
    }
}

pub fn make_log(actor_id: UserId, action: &str, target_id: &str, created_at: DateTime<Utc>) -> AuditLog {
    AuditLog {
        id: AuditLogId::new(),
        created_at,
        actor_id,
        action_type: action.to_string(),
        target_type: Some("artisan".to_string()),
        target_id: Some(target_id.to_string()),
        details: Json(Map::new()),
        ip: None,
        user_agent: None,
        request_id: None,
    }
}

/// Seeds `count` audit rows one minute apart, newest at `Utc::now()`.
pub fn seed_logs(store: &MemoryStore, actor_id: UserId, count: usize) -> Vec<AuditLog> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let log = make_log(
                actor_id,
                "approve_artisan",
                &format!("artisan-{}", i),
                now - Duration::minutes(i as i64),
            );
            store.insert_log(log.clone());
            log
        })
        .collect()
}
