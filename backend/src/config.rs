use anyhow::anyhow;
use chrono_tz::Tz;
use std::{env, time::Duration};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/artisan_connect";
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-this-in-production";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_AUDIT_PAGE_SIZE: i64 = 50;
const DEFAULT_AUDIT_MAX_PAGE_SIZE: i64 = 200;
const DEFAULT_ACTIVITY_FEED_LIMIT: i64 = 20;
const DEFAULT_ACTIVITY_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub time_zone: Tz,
    pub bind_addr: String,
    pub audit_page_size: i64,
    pub audit_max_page_size: i64,
    pub activity_feed_limit: i64,
    pub activity_refresh_secs: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let time_zone_name = lookup("APP_TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let audit_max_page_size = parse_or(
            lookup("AUDIT_MAX_PAGE_SIZE"),
            DEFAULT_AUDIT_MAX_PAGE_SIZE,
        )
        .max(1);
        let audit_page_size = parse_or(lookup("AUDIT_PAGE_SIZE"), DEFAULT_AUDIT_PAGE_SIZE)
            .clamp(1, audit_max_page_size);
        let activity_feed_limit =
            parse_or(lookup("ACTIVITY_FEED_LIMIT"), DEFAULT_ACTIVITY_FEED_LIMIT).max(1);
        let activity_refresh_secs =
            parse_or(lookup("ACTIVITY_REFRESH_SECS"), DEFAULT_ACTIVITY_REFRESH_SECS).max(1);

        Ok(Config {
            database_url,
            jwt_secret,
            time_zone,
            bind_addr,
            audit_page_size,
            audit_max_page_size,
            activity_feed_limit,
            activity_refresh_secs,
        })
    }

    pub fn activity_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.activity_refresh_secs)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
