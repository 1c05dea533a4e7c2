//! Human-readable activity feed built from audit rows, plus the background
//! poller that keeps a feed fresh for one subscriber.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use utoipa::ToSchema;

use crate::{
    models::audit_log::{AuditAction, AuditLog},
    services::audit_log::AuditLogService,
};

const ACTOR_LABEL: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActivityFeedItem {
    pub id: String,
    pub actor_id: String,
    pub action_type: String,
    pub summary: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    /// Display name of the target, when the row recorded one.
    pub target_name: Option<String>,
    pub relative_time: String,
    pub created_at: DateTime<Utc>,
}

fn phrase(action: &AuditAction) -> String {
    let fixed = match action {
        AuditAction::ApproveArtisan => "approved artisan",
        AuditAction::RejectArtisan => "rejected artisan",
        AuditAction::SuspendArtisan => "suspended artisan",
        AuditAction::ActivateArtisan => "activated artisan",
        AuditAction::PauseArtisan => "paused artisan",
        AuditAction::ResumeArtisan => "resumed artisan",
        AuditAction::ApproveReview => "approved review",
        AuditAction::RejectReview => "rejected review",
        AuditAction::ExportArtisans => "exported artisans",
        AuditAction::ExportReviews => "exported reviews",
        AuditAction::ExportContacts => "exported contacts",
        AuditAction::ExportAuditLogs => "exported audit logs",
        AuditAction::GenerateMonthlySummary => "generated monthly summary",
        AuditAction::Other(raw) => return raw.replace('_', " "),
    };
    fixed.to_string()
}

/// One-line summary of an audit row, e.g. `Admin approved artisan`.
pub fn format_action(log: &AuditLog) -> String {
    format!("{} {}", ACTOR_LABEL, phrase(&log.action()))
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Coarse age of `timestamp` relative to `now`. Anything a week or older is
/// shown as a date in `tz`.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let seconds = elapsed.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return plural(days, "day");
    }
    timestamp.with_timezone(tz).format("%b %-d, %Y").to_string()
}

pub fn feed_item(log: &AuditLog, now: DateTime<Utc>, tz: &Tz) -> ActivityFeedItem {
    ActivityFeedItem {
        id: log.id.to_string(),
        actor_id: log.actor_id.to_string(),
        action_type: log.action_type.clone(),
        summary: format_action(log),
        target_type: log.target_type.clone(),
        target_id: log.target_id.clone(),
        target_name: log.detail_str("name").map(str::to_string),
        relative_time: relative_time(log.created_at, now, tz),
        created_at: log.created_at,
    }
}

pub fn build_feed(logs: &[AuditLog], now: DateTime<Utc>, tz: &Tz) -> Vec<ActivityFeedItem> {
    logs.iter().map(|log| feed_item(log, now, tz)).collect()
}

/// Latest feed snapshot published by the poller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "items", rename_all = "snake_case")]
pub enum FeedState {
    Loading,
    Ready(Vec<ActivityFeedItem>),
    Unavailable,
}

/// Refreshes the activity feed on a fixed interval until cancelled, dropped,
/// or abandoned by every subscriber.
pub struct ActivityFeedPoller {
    cancel: watch::Sender<bool>,
    state: Arc<watch::Sender<FeedState>>,
    handle: JoinHandle<()>,
}

impl ActivityFeedPoller {
    /// Starts the refresh task and returns it with the first subscriber.
    /// The poller itself holds no receiver.
    pub fn spawn(
        service: AuditLogService,
        limit: i64,
        interval: Duration,
        tz: Tz,
    ) -> (Self, watch::Receiver<FeedState>) {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(FeedState::Loading);
        let state_tx = Arc::new(state_tx);
        let publisher = Arc::clone(&state_tx);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    _ = publisher.closed() => break,
                    _ = ticker.tick() => {}
                }

                let fetched = tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    result = service.recent_activity(limit) => result,
                };

                let next = match fetched {
                    Ok(logs) => FeedState::Ready(build_feed(&logs, Utc::now(), &tz)),
                    Err(err) => {
                        tracing::warn!(error = %err, "Activity feed refresh failed");
                        FeedState::Unavailable
                    }
                };
                if *cancel_rx.borrow() || publisher.send(next).is_err() {
                    break;
                }
            }
            tracing::debug!("Activity feed poller stopped");
        });

        let poller = Self {
            cancel: cancel_tx,
            state: state_tx,
            handle,
        };
        (poller, state_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ActivityFeedPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}
