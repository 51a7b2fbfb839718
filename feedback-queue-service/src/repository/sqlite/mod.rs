//! SQLite implementation of `FeedbackRepository`.
//!
//! This provides persistent storage that survives service restarts.
//!
//! # Schema Versioning
//!
//! The database has a `schema_version` table that tracks the schema version.
//! When the schema needs to change, increment `CURRENT_SCHEMA_VERSION` and add
//! a migration in `run_migrations()`. Migrations run sequentially from the
//! current version to the target version.
//!
//! # Layout
//!
//! One row per entry in `feedback_entries`. Enumerations are stored in their
//! canonical string form, timestamps as unix milliseconds, and the payload as
//! TEXT exactly as submitted.


use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedback_queue_core::{
    FeedbackEntry, FeedbackFilter, FeedbackId, FeedbackPayload, FeedbackRecord, FeedbackStatus,
    PageRequest, ReviewNotes, TargetId,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{FeedbackRepository, RepositoryError, UpdateOutcome};

/// Current schema version. Increment this when making schema changes and add
/// corresponding migration logic in `run_migrations()`.
const CURRENT_SCHEMA_VERSION: i64 = 2;

const SELECT_COLUMNS: &str = "SELECT id, target_type, target_id, feedback_type, payload, status,
        risk_level, review_notes, created_at, updated_at
 FROM feedback_entries";

/// `:memory:` and the empty path (an anonymous temporary database) have no
/// file of their own to protect.
fn is_on_disk(path: &Path) -> bool {
    let raw = path.as_os_str();
    !raw.is_empty() && raw != ":memory:"
}

/// Create the directory holding `db` and close it to other users.
///
/// The directory matters as much as the file: SQLite writes its `-wal` and
/// `-shm` companions next to the database.
fn prepare_state_dir(db: &Path) -> Result<(), RepositoryError> {
    let Some(dir) = db.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        RepositoryError::storage(
            "create database directory",
            format!("{}: {}", dir.display(), e),
        )
    })?;
    restrict_permissions(dir, 0o700, "state directory");
    Ok(())
}

/// Best effort; a filesystem that refuses the mode only earns a warning.
#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32, what: &str) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "Could not restrict {} permissions", what);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32, _what: &str) {}

/// Ask for WAL and check that SQLite actually switched.
///
/// On filesystems without shared memory the pragma quietly leaves the
/// journal in its old mode. Databases with no file report `memory`.
fn enable_wal(conn: &Connection, on_disk: bool) -> Result<(), RepositoryError> {
    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(|e| RepositoryError::storage("set journal_mode", e.to_string()))?;

    if mode.eq_ignore_ascii_case("wal") || (!on_disk && mode.eq_ignore_ascii_case("memory")) {
        return Ok(());
    }
    Err(RepositoryError::storage(
        "configure journal_mode",
        format!(
            "journal_mode stayed '{}' after requesting WAL; move the state directory \
             to a filesystem with shared memory support",
            mode
        ),
    ))
}

/// Version recorded in `schema_version`, or 0 for a fresh database.
fn stored_schema_version(conn: &Connection) -> Result<i64, RepositoryError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             id INTEGER PRIMARY KEY CHECK (id = 1),
             version INTEGER NOT NULL
         );",
    )
    .map_err(|e| RepositoryError::storage("create schema_version table", e.to_string()))?;

    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| RepositoryError::storage("get schema version", e.to_string()))?;
    Ok(version.unwrap_or(0))
}

/// SQLite-backed feedback repository.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous rusqlite operations
/// without blocking the async runtime. All access goes through one connection.
pub struct SqliteRepository {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open (or create) the database at `path` and bring its schema up to date.
    ///
    /// A file-backed database lives in a private state directory (0700) as a
    /// private file (0600), journals in WAL mode, syncs with
    /// `synchronous = FULL` and waits up to 5s on a locked database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let on_disk = is_on_disk(path);

        if on_disk {
            prepare_state_dir(path)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;
        if on_disk {
            restrict_permissions(path, 0o600, "database file");
        }

        enable_wal(&conn, on_disk)?;
        conn.execute_batch("PRAGMA synchronous = FULL; PRAGMA busy_timeout = 5000;")
            .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        let version = stored_schema_version(&conn)?;
        Self::run_migrations(&conn, version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run migrations from `from_version` to `CURRENT_SCHEMA_VERSION`.
    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}. \
                     Please upgrade the application.",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        debug!(
            from = from_version,
            to = CURRENT_SCHEMA_VERSION,
            "Migrating feedback database"
        );

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS feedback_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    target_type TEXT NOT NULL,
                    target_id INTEGER,
                    feedback_type TEXT NOT NULL,
                    payload TEXT NOT NULL,
                    status TEXT NOT NULL,
                    risk_level TEXT NOT NULL,
                    review_notes TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_feedback_status
                    ON feedback_entries(status);
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v1", e.to_string()))?;
        }

        // Version 2: indexes for the queue views and per-target lookups.
        if from_version < 2 {
            conn.execute_batch(
                r#"
                CREATE INDEX IF NOT EXISTS idx_feedback_status_risk
                    ON feedback_entries(status, risk_level);
                CREATE INDEX IF NOT EXISTS idx_feedback_target
                    ON feedback_entries(target_type, target_id);
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v2", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| RepositoryError::storage("update schema version", e.to_string()))?;

        Ok(())
    }

    /// Create a new in-memory SQLite repository (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }
}

fn lock<'a>(
    conn: &'a Mutex<Connection>,
    operation: &str,
) -> Result<MutexGuard<'a, Connection>, RepositoryError> {
    conn.lock()
        .map_err(|_| RepositoryError::storage(operation, "connection mutex poisoned"))
}

/// Columns exactly as read, before any decoding.
struct RawRow {
    id: i64,
    target_type: String,
    target_id: Option<i64>,
    feedback_type: String,
    payload: String,
    status: String,
    risk_level: String,
    review_notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            target_type: row.get(1)?,
            target_id: row.get(2)?,
            feedback_type: row.get(3)?,
            payload: row.get(4)?,
            status: row.get(5)?,
            risk_level: row.get(6)?,
            review_notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<FeedbackEntry, RepositoryError> {
        let what = |column: &str| format!("feedback_entries.{} (id {})", column, self.id);

        let id = u64::try_from(self.id)
            .ok()
            .filter(|id| *id > 0)
            .map(FeedbackId)
            .ok_or_else(|| RepositoryError::corruption(what("id")))?;
        let target_id = self
            .target_id
            .map(|raw| u64::try_from(raw).map(TargetId))
            .transpose()
            .map_err(|_| RepositoryError::corruption(what("target_id")))?;

        let record = FeedbackRecord {
            id,
            target_type: self
                .target_type
                .parse()
                .map_err(|_| RepositoryError::corruption(what("target_type")))?,
            target_id,
            feedback_type: self
                .feedback_type
                .parse()
                .map_err(|_| RepositoryError::corruption(what("feedback_type")))?,
            payload: FeedbackPayload::new(self.payload)
                .map_err(|_| RepositoryError::corruption(what("payload")))?,
            status: self
                .status
                .parse()
                .map_err(|_| RepositoryError::corruption(what("status")))?,
            risk_level: self
                .risk_level
                .parse()
                .map_err(|_| RepositoryError::corruption(what("risk_level")))?,
            review_notes: ReviewNotes::parse(self.review_notes)
                .map_err(|_| RepositoryError::corruption(what("review_notes")))?,
            created_at: from_millis(self.created_at)
                .ok_or_else(|| RepositoryError::corruption(what("created_at")))?,
            updated_at: from_millis(self.updated_at)
                .ok_or_else(|| RepositoryError::corruption(what("updated_at")))?,
        };
        Ok(FeedbackEntry::from(record))
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn id_param(id: FeedbackId, operation: &str) -> Result<i64, RepositoryError> {
    i64::try_from(id.0)
        .map_err(|_| RepositoryError::storage(operation, format!("id {} out of range", id)))
}

fn target_id_param(target_id: Option<TargetId>) -> Result<Option<i64>, RepositoryError> {
    target_id
        .map(|t| {
            i64::try_from(t.0).map_err(|_| {
                RepositoryError::storage("encode target_id", format!("{} out of range", t))
            })
        })
        .transpose()
}

/// Push `column IN (?, ?, ...)` for a non-empty set.
fn push_in_clause<T>(
    clauses: &mut Vec<String>,
    values: &mut Vec<Value>,
    column: &str,
    set: &[T],
    as_str: impl Fn(&T) -> &'static str,
) {
    if set.is_empty() {
        return;
    }
    let placeholders = vec!["?"; set.len()].join(", ");
    clauses.push(format!("{} IN ({})", column, placeholders));
    values.extend(set.iter().map(|v| Value::Text(as_str(v).to_string())));
}

/// Build the listing query for `filter` and `page`.
fn list_query(
    filter: &FeedbackFilter,
    page: &PageRequest,
) -> Result<(String, Vec<Value>), RepositoryError> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    push_in_clause(&mut clauses, &mut values, "status", &filter.statuses, |s| {
        s.as_str()
    });
    push_in_clause(
        &mut clauses,
        &mut values,
        "target_type",
        &filter.target_types,
        |t| t.as_str(),
    );
    push_in_clause(
        &mut clauses,
        &mut values,
        "feedback_type",
        &filter.feedback_types,
        |t| t.as_str(),
    );
    push_in_clause(
        &mut clauses,
        &mut values,
        "risk_level",
        &filter.risk_levels,
        |r| r.as_str(),
    );
    if let Some(target_id) = target_id_param(filter.target_id)? {
        clauses.push("target_id = ?".to_string());
        values.push(Value::Integer(target_id));
    }
    if let Some(cursor) = page.cursor() {
        clauses.push("id < ?".to_string());
        values.push(Value::Integer(id_param(cursor, "list")?));
    }

    let mut sql = SELECT_COLUMNS.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?");
    values.push(Value::Integer(page.fetch_size() as i64));

    Ok((sql, values))
}

#[async_trait]
impl FeedbackRepository for SqliteRepository {
    async fn insert(&self, entry: &FeedbackEntry) -> Result<FeedbackId, RepositoryError> {
        if !entry.is_new() {
            return Err(RepositoryError::AlreadyPersisted);
        }

        let conn = self.conn.clone();
        let target_type = entry.target_type().as_str();
        let target_id = target_id_param(entry.target_id())?;
        let feedback_type = entry.feedback_type().as_str();
        let payload = entry.payload().as_str().to_string();
        let status = entry.status().as_str();
        let risk_level = entry.risk_level().as_str();
        let review_notes = entry.review_notes().map(|n| n.as_str().to_string());
        let created_at = entry.created_at().timestamp_millis();
        let updated_at = entry.updated_at().timestamp_millis();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "insert")?;

            conn.execute(
                "INSERT INTO feedback_entries (target_type, target_id, feedback_type, payload,
                                               status, risk_level, review_notes,
                                               created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    target_type,
                    target_id,
                    feedback_type,
                    payload,
                    status,
                    risk_level,
                    review_notes,
                    created_at,
                    updated_at
                ],
            )
            .map_err(|e| RepositoryError::storage("insert", e.to_string()))?;

            let rowid = conn.last_insert_rowid();
            u64::try_from(rowid)
                .map(FeedbackId)
                .map_err(|_| RepositoryError::corruption(format!("assigned rowid {}", rowid)))
        })
        .await
        .map_err(|e| RepositoryError::storage("insert", e.to_string()))?
    }

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackEntry>, RepositoryError> {
        let conn = self.conn.clone();
        let id = id_param(id, "find_by_id")?;

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "find_by_id")?;

            let raw = conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    params![id],
                    RawRow::read,
                )
                .optional()
                .map_err(|e| RepositoryError::storage("find_by_id", e.to_string()))?;

            raw.map(RawRow::decode).transpose()
        })
        .await
        .map_err(|e| RepositoryError::storage("find_by_id", e.to_string()))?
    }

    async fn exists(&self, id: FeedbackId) -> Result<bool, RepositoryError> {
        let conn = self.conn.clone();
        let id = id_param(id, "exists")?;

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "exists")?;

            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM feedback_entries WHERE id = ?1)",
                params![id],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|e| RepositoryError::storage("exists", e.to_string()))
        })
        .await
        .map_err(|e| RepositoryError::storage("exists", e.to_string()))?
    }

    async fn update(
        &self,
        entry: &FeedbackEntry,
        expected_status: FeedbackStatus,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let id = entry.id().ok_or(RepositoryError::NotPersisted)?;
        let id = id_param(id, "update")?;

        let conn = self.conn.clone();
        let status = entry.status().as_str();
        let review_notes = entry.review_notes().map(|n| n.as_str().to_string());
        let updated_at = entry.updated_at().timestamp_millis();
        let expected = expected_status.as_str();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "update")?;

            // Only the columns a transition may change are written.
            let changed = conn
                .execute(
                    "UPDATE feedback_entries
                     SET status = ?1, review_notes = ?2, updated_at = ?3
                     WHERE id = ?4 AND status = ?5",
                    params![status, review_notes, updated_at, id, expected],
                )
                .map_err(|e| RepositoryError::storage("update", e.to_string()))?;

            Ok(if changed == 1 {
                UpdateOutcome::Applied
            } else {
                UpdateOutcome::Conflict
            })
        })
        .await
        .map_err(|e| RepositoryError::storage("update", e.to_string()))?
    }

    async fn list(
        &self,
        filter: &FeedbackFilter,
        page: &PageRequest,
    ) -> Result<Vec<FeedbackEntry>, RepositoryError> {
        let conn = self.conn.clone();
        let (sql, values) = list_query(filter, page)?;

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "list")?;

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| RepositoryError::storage("list", e.to_string()))?;

            let rows = stmt
                .query_map(params_from_iter(values.iter()), RawRow::read)
                .map_err(|e| RepositoryError::storage("list", e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                let raw = row.map_err(|e| RepositoryError::storage("list", e.to_string()))?;
                entries.push(raw.decode()?);
            }
            Ok(entries)
        })
        .await
        .map_err(|e| RepositoryError::storage("list", e.to_string()))?
    }
}
