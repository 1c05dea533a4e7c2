use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::watch;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    services::activity_feed::{build_feed, ActivityFeedItem, ActivityFeedPoller, FeedState},
    state::AppState,
};

const MAX_FEED_LIMIT: i64 = 100;
const ACTIVITY_EVENT: &str = "activity";

#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityFeedResponse {
    pub items: Vec<ActivityFeedItem>,
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Query(q): Query<ActivityQuery>,
) -> Result<Json<ActivityFeedResponse>, AppError> {
    let limit = q
        .limit
        .unwrap_or(state.config.activity_feed_limit)
        .clamp(1, MAX_FEED_LIMIT);
    let logs = state.audit.recent_activity(limit).await?;
    Ok(Json(ActivityFeedResponse {
        items: build_feed(&logs, Utc::now(), &state.config.time_zone),
    }))
}

fn feed_event(feed: &FeedState) -> Event {
    Event::default()
        .event(ACTIVITY_EVENT)
        .json_data(feed)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to encode activity feed event");
            Event::default().comment("encoding failed")
        })
}

/// Streams feed snapshots until the client disconnects. The poller lives in
/// the stream state, so dropping the response stops it.
pub async fn activity_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (poller, updates) = ActivityFeedPoller::spawn(
        state.audit.clone(),
        state.config.activity_feed_limit,
        state.config.activity_refresh_interval(),
        state.config.time_zone,
    );

    let events = stream::unfold(
        (poller, updates, true),
        |(poller, mut updates, first): (ActivityFeedPoller, watch::Receiver<FeedState>, bool)| async move {
            if !first && updates.changed().await.is_err() {
                return None;
            }
            let event = {
                let snapshot = updates.borrow_and_update();
                feed_event(&snapshot)
            };
            Some((Ok(event), (poller, updates, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}
