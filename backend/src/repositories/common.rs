//! Shared repository utilities.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

use crate::{types::UserId, utils::time::start_of_day};

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Appends `created_at >= from AND created_at < to` for whichever bounds are set.
pub fn push_created_range(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    (from, to): (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
) {
    if let Some(from) = from {
        push_clause(builder, has_clause);
        builder.push("created_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        push_clause(builder, has_clause);
        builder.push("created_at < ").push_bind(to);
    }
}

/// Conjunction of optional predicates applied before an export is
/// materialized. Each export kind reads the predicates that apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    /// Inclusive first day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Inclusive last day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    /// Zone `from` and `to` are calendar days in. UTC when unset.
    #[serde(skip)]
    pub time_zone: Option<Tz>,
}

impl ExportFilter {
    /// Half-open creation-time range covering the inclusive `from..=to` days.
    pub fn created_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let tz = self.time_zone.unwrap_or(chrono_tz::UTC);
        let from = self.from.map(|day| start_of_day(day, &tz));
        let to = self
            .to
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .map(|day| start_of_day(day, &tz));
        (from, to)
    }

    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        let (from, to) = self.created_range();
        from.map_or(true, |from| created_at >= from) && to.map_or(true, |to| created_at < to)
    }

    /// The set predicates, as recorded in the export's audit row.
    pub fn to_details(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
