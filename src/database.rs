//! # SQLite persistence
//!
//! Events and signups live in two tables behind a single async mutex. Every
//! public method takes the lock once, so each call is one critical section.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Persist cleanup due time and discussion thread for restart recovery
//! - 1.0.0: Events and signups tables

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use sqlite::{Connection, State, Statement, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::events::error::EventError;
use crate::features::events::model::{from_millis, to_millis, Event, Signup, SignupStatus};
use crate::features::events::store::{EventStore, SignupStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS events (
        message_id INTEGER PRIMARY KEY,
        channel_id INTEGER NOT NULL,
        due_at INTEGER NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        cleanup_due_at INTEGER,
        thread_id INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_events_active_due ON events (is_active, due_at);
    CREATE INDEX IF NOT EXISTS idx_events_cleanup ON events (is_active, cleanup_due_at);

    CREATE TABLE IF NOT EXISTS signups (
        message_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        status TEXT NOT NULL CHECK(status IN ('accepted', 'declined')),
        PRIMARY KEY (message_id, user_id)
    );
";

/// How long a statement waits on another process's lock before failing
const BUSY_TIMEOUT_MS: usize = 5_000;

const EVENT_COLUMNS: &str = "message_id, channel_id, due_at, is_active, cleanup_due_at, thread_id";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `db_path`; `:memory:` works for tests
    pub async fn new(db_path: &str) -> Result<Self, EventError> {
        let mut connection = sqlite::open(db_path)?;
        connection.set_busy_timeout(BUSY_TIMEOUT_MS)?;
        connection.execute(SCHEMA)?;

        info!("💾 Database ready at {db_path}");
        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

fn in_transaction<T>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> Result<T, EventError>,
) -> Result<T, EventError> {
    conn.execute("BEGIN IMMEDIATE")?;
    let outcome = body(conn).and_then(|value| {
        conn.execute("COMMIT")?;
        Ok(value)
    });

    // A failed COMMIT can leave the transaction open on the shared connection.
    // When SQLite already rolled back, this ROLLBACK fails and is only logged.
    if let Err(e) = &outcome {
        if let Err(rollback) = conn.execute("ROLLBACK") {
            warn!("Rollback failed after {e}: {rollback}");
        }
    }
    outcome
}

fn optional_int(value: Option<u64>) -> Value {
    match value {
        Some(v) => Value::Integer(v as i64),
        None => Value::Null,
    }
}

fn read_optional_int(statement: &Statement<'_>, column: &str) -> Result<Option<i64>, EventError> {
    match statement.read::<Value, _>(column)? {
        Value::Integer(v) => Ok(Some(v)),
        Value::Null => Ok(None),
        other => Err(EventError::Corrupt(format!("{column} holds {other:?}"))),
    }
}

fn read_event(statement: &Statement<'_>) -> Result<Event, EventError> {
    Ok(Event {
        message_id: statement.read::<i64, _>("message_id")? as u64,
        channel_id: statement.read::<i64, _>("channel_id")? as u64,
        due_at: from_millis(statement.read::<i64, _>("due_at")?)?,
        active: statement.read::<i64, _>("is_active")? != 0,
        cleanup_due_at: read_optional_int(statement, "cleanup_due_at")?
            .map(from_millis)
            .transpose()?,
        thread_id: read_optional_int(statement, "thread_id")?.map(|v| v as u64),
    })
}

fn collect_events(mut statement: Statement<'_>) -> Result<Vec<Event>, EventError> {
    let mut events = Vec::new();
    while let State::Row = statement.next()? {
        events.push(read_event(&statement)?);
    }
    Ok(events)
}

fn select_event(conn: &Connection, message_id: u64) -> Result<Option<Event>, EventError> {
    let mut statement = conn.prepare(format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE message_id = ?"
    ))?;
    statement.bind((1, message_id as i64))?;
    Ok(collect_events(statement)?.pop())
}

fn select_signups(conn: &Connection, message_id: u64) -> Result<Vec<Signup>, EventError> {
    let mut statement = conn.prepare(
        "SELECT user_id, status FROM signups WHERE message_id = ? ORDER BY rowid",
    )?;
    statement.bind((1, message_id as i64))?;

    let mut signups = Vec::new();
    while let State::Row = statement.next()? {
        signups.push(Signup {
            user_id: statement.read::<i64, _>("user_id")? as u64,
            status: statement.read::<String, _>("status")?.parse()?,
        });
    }
    Ok(signups)
}

fn count_accepted(conn: &Connection, message_id: u64) -> Result<usize, EventError> {
    let mut statement = conn.prepare(
        "SELECT COUNT(*) AS accepted FROM signups WHERE message_id = ? AND status = 'accepted'",
    )?;
    statement.bind((1, message_id as i64))?;
    statement.next()?;
    Ok(statement.read::<i64, _>("accepted")? as usize)
}

fn write_signup(
    conn: &Connection,
    message_id: u64,
    user_id: u64,
    status: SignupStatus,
) -> Result<(), EventError> {
    let mut statement = conn.prepare(
        "INSERT INTO signups (message_id, user_id, status) VALUES (?, ?, ?)
         ON CONFLICT(message_id, user_id) DO UPDATE SET status = excluded.status",
    )?;
    statement.bind((1, message_id as i64))?;
    statement.bind((2, user_id as i64))?;
    statement.bind((3, status.as_str()))?;
    statement.next()?;
    Ok(())
}

fn remove_signups(conn: &Connection, message_id: u64) -> Result<(), EventError> {
    let mut statement = conn.prepare("DELETE FROM signups WHERE message_id = ?")?;
    statement.bind((1, message_id as i64))?;
    statement.next()?;
    Ok(())
}

fn remove_event(conn: &Connection, message_id: u64) -> Result<bool, EventError> {
    let mut statement = conn.prepare("DELETE FROM events WHERE message_id = ?")?;
    statement.bind((1, message_id as i64))?;
    statement.next()?;
    drop(statement);
    Ok(conn.change_count() > 0)
}

#[async_trait]
impl EventStore for Database {
    async fn insert_event(&self, event: &Event) -> Result<(), EventError> {
        let conn = self.connection.lock().await;

        if select_event(&conn, event.message_id)?.is_some() {
            return Err(EventError::DuplicateKey(event.message_id));
        }

        let mut statement = conn.prepare(
            "INSERT INTO events (message_id, channel_id, due_at, is_active) VALUES (?, ?, ?, 1)",
        )?;
        statement.bind((1, event.message_id as i64))?;
        statement.bind((2, event.channel_id as i64))?;
        statement.bind((3, to_millis(event.due_at)))?;
        statement.next()?;
        Ok(())
    }

    async fn get_event(&self, message_id: u64) -> Result<Option<Event>, EventError> {
        let conn = self.connection.lock().await;
        select_event(&conn, message_id)
    }

    async fn next_due(&self) -> Result<Option<Event>, EventError> {
        let conn = self.connection.lock().await;
        let statement = conn.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY due_at ASC LIMIT 1"
        ))?;
        Ok(collect_events(statement)?.pop())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 AND due_at <= ?"
        ))?;
        statement.bind((1, to_millis(now)))?;
        collect_events(statement)
    }

    async fn list_active(&self) -> Result<Vec<Event>, EventError> {
        let conn = self.connection.lock().await;
        let statement = conn.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY due_at ASC"
        ))?;
        collect_events(statement)
    }

    async fn deactivate(
        &self,
        message_id: u64,
        thread_id: Option<u64>,
        cleanup_due_at: DateTime<Utc>,
    ) -> Result<bool, EventError> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "UPDATE events SET is_active = 0, cleanup_due_at = ?, thread_id = COALESCE(?, thread_id)
             WHERE message_id = ? AND is_active = 1",
        )?;
        statement.bind((1, to_millis(cleanup_due_at)))?;
        statement.bind((2, optional_int(thread_id)))?;
        statement.bind((3, message_id as i64))?;
        statement.next()?;
        drop(statement);
        Ok(conn.change_count() > 0)
    }

    async fn delete_event(&self, message_id: u64) -> Result<(), EventError> {
        let conn = self.connection.lock().await;
        remove_event(&conn, message_id)?;
        Ok(())
    }

    async fn delete_all_active(&self) -> Result<Vec<Event>, EventError> {
        let conn = self.connection.lock().await;
        in_transaction(&conn, |conn| {
            let statement = conn.prepare(format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY due_at ASC"
            ))?;
            let removed = collect_events(statement)?;

            conn.execute(
                "DELETE FROM signups WHERE message_id IN \
                 (SELECT message_id FROM events WHERE is_active = 1)",
            )?;
            conn.execute("DELETE FROM events WHERE is_active = 1")?;
            Ok(removed)
        })
    }

    async fn next_cleanup_due(&self) -> Result<Option<DateTime<Utc>>, EventError> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT MIN(cleanup_due_at) AS next_cleanup FROM events
             WHERE is_active = 0 AND cleanup_due_at IS NOT NULL",
        )?;
        statement.next()?;
        read_optional_int(&statement, "next_cleanup")?
            .map(from_millis)
            .transpose()
    }

    async fn list_cleanup_due(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE is_active = 0 AND cleanup_due_at IS NOT NULL AND cleanup_due_at <= ?"
        ))?;
        statement.bind((1, to_millis(now)))?;
        collect_events(statement)
    }

    async fn purge_event(&self, message_id: u64) -> Result<bool, EventError> {
        let conn = self.connection.lock().await;
        in_transaction(&conn, |conn| {
            remove_signups(conn, message_id)?;
            remove_event(conn, message_id)
        })
    }
}

#[async_trait]
impl SignupStore for Database {
    async fn accepted_count(&self, message_id: u64) -> Result<usize, EventError> {
        let conn = self.connection.lock().await;
        count_accepted(&conn, message_id)
    }

    async fn upsert_signup(
        &self,
        message_id: u64,
        user_id: u64,
        status: SignupStatus,
    ) -> Result<(), EventError> {
        let conn = self.connection.lock().await;
        write_signup(&conn, message_id, user_id, status)
    }

    async fn list_signups(&self, message_id: u64) -> Result<Vec<Signup>, EventError> {
        let conn = self.connection.lock().await;
        select_signups(&conn, message_id)
    }

    async fn delete_signups(&self, message_id: u64) -> Result<(), EventError> {
        let conn = self.connection.lock().await;
        remove_signups(&conn, message_id)
    }

    async fn apply_rsvp(
        &self,
        message_id: u64,
        user_id: u64,
        status: SignupStatus,
        capacity: usize,
    ) -> Result<Vec<Signup>, EventError> {
        let conn = self.connection.lock().await;
        in_transaction(&conn, |conn| {
            if select_event(conn, message_id)?.is_none() {
                return Err(EventError::UnknownEvent(message_id));
            }

            let current = select_signups(conn, message_id)?
                .into_iter()
                .find(|s| s.user_id == user_id)
                .map(|s| s.status);

            let joining = status == SignupStatus::Accepted && current != Some(status);
            if joining && count_accepted(conn, message_id)? >= capacity {
                return Err(EventError::CapacityExceeded {
                    event_id: message_id,
                    capacity,
                });
            }

            if current != Some(status) {
                write_signup(conn, message_id, user_id, status)?;
            }

            select_signups(conn, message_id)
        })
    }
}
