//! Environment-driven configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of accepted signups per event
pub const DEFAULT_CAPACITY: usize = 30;
/// Default delay between a reminder firing and the event being cleaned up
pub const DEFAULT_RETENTION_MINUTES: u64 = 120;
/// Default lead time between the reminder and the event itself
pub const DEFAULT_REMINDER_LEAD_MINUTES: u64 = 60;
/// Upper bound for EVENT_RETENTION_MINUTES (30 days)
pub const MAX_RETENTION_MINUTES: u64 = 30 * 24 * 60;
/// Upper bound for REMINDER_LEAD_MINUTES (7 days, one weekly cycle)
pub const MAX_REMINDER_LEAD_MINUTES: u64 = 7 * 24 * 60;
/// Default fallback re-check interval while no event is pending
pub const DEFAULT_IDLE_RECHECK_SECS: u64 = 30 * 60;
/// Default pause after a scheduler cycle fails
pub const DEFAULT_FAULT_PAUSE_SECS: u64 = 5;

/// Timing and capacity knobs shared by the scheduler, the cleanup queue and
/// the RSVP protocol.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub capacity: usize,
    pub retention: Duration,
    pub idle_recheck: Duration,
    pub fault_pause: Duration,
    pub thread_name: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            retention: Duration::from_secs(DEFAULT_RETENTION_MINUTES * 60),
            idle_recheck: Duration::from_secs(DEFAULT_IDLE_RECHECK_SECS),
            fault_pause: Duration::from_secs(DEFAULT_FAULT_PAUSE_SECS),
            thread_name: "Event Discussion & Pings".to_string(),
        }
    }
}

/// How the poll embed is presented
#[derive(Debug, Clone)]
pub struct EventPresentation {
    pub title: String,
    pub footer: Option<String>,
    pub image_url: Option<String>,
    pub reminder_lead: Duration,
}

impl Default for EventPresentation {
    fn default() -> Self {
        Self {
            title: "Event".to_string(),
            footer: None,
            image_url: None,
            reminder_lead: Duration::from_secs(DEFAULT_REMINDER_LEAD_MINUTES * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub database_path: String,
    pub log_level: String,
    pub scheduler: SchedulerSettings,
    pub presentation: EventPresentation,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .context("DISCORD_TOKEN environment variable not set")?;

        let defaults = SchedulerSettings::default();
        let scheduler = SchedulerSettings {
            capacity: parse_or(&lookup, "EVENT_CAPACITY", DEFAULT_CAPACITY)?,
            retention: minutes_or(
                &lookup,
                "EVENT_RETENTION_MINUTES",
                DEFAULT_RETENTION_MINUTES,
                MAX_RETENTION_MINUTES,
            )?,
            idle_recheck: Duration::from_secs(parse_or(
                &lookup,
                "SCHEDULER_IDLE_RECHECK_SECS",
                DEFAULT_IDLE_RECHECK_SECS,
            )?),
            fault_pause: Duration::from_secs(parse_or(
                &lookup,
                "SCHEDULER_FAULT_PAUSE_SECS",
                DEFAULT_FAULT_PAUSE_SECS,
            )?),
            thread_name: lookup("EVENT_THREAD_NAME").unwrap_or(defaults.thread_name),
        };

        if scheduler.capacity == 0 {
            anyhow::bail!("EVENT_CAPACITY must be at least 1");
        }

        let presentation = EventPresentation {
            title: lookup("EVENT_TITLE").unwrap_or_else(|| "Event".to_string()),
            footer: lookup("EVENT_FOOTER").filter(|v| !v.is_empty()),
            image_url: lookup("EVENT_IMAGE_URL").filter(|v| !v.is_empty()),
            reminder_lead: minutes_or(
                &lookup,
                "REMINDER_LEAD_MINUTES",
                DEFAULT_REMINDER_LEAD_MINUTES,
                MAX_REMINDER_LEAD_MINUTES,
            )?,
        };

        Ok(Config {
            discord_token,
            discord_guild_id: lookup("DISCORD_GUILD_ID").filter(|v| !v.is_empty()),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "events.db".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            scheduler,
            presentation,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

/// A minute count no larger than `max`, as a `Duration`
fn minutes_or<F>(lookup: &F, key: &str, default: u64, max: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let minutes: u64 = parse_or(lookup, key, default)?;
    if minutes > max {
        anyhow::bail!("{key} must be at most {max} minutes, got {minutes}");
    }
    let secs = minutes
        .checked_mul(60)
        .with_context(|| format!("{key} overflows: {minutes} minutes"))?;
    Ok(Duration::from_secs(secs))
}
