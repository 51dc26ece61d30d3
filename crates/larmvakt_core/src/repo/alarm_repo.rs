//! Alarm repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four store operations the ingestion decision engine needs:
//!   open-alarm lookup, alarm creation, idempotent department assignment and
//!   case-insensitive department resolution.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `AlarmRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `find_open_alarm` matches (what, where, alarm_type) under null-safe
//!   equality: a null field matches only a null field.

use crate::db::DbError;
use crate::model::alarm::{
    AlarmId, AlarmKind, AlarmRecord, AlarmValidationError, DepartmentId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ALARM_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    description,
    occurred_at,
    ended_at,
    source,
    alarm_type,
    what,
    where_location,
    who_called
FROM alarms";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for alarm persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(AlarmValidationError),
    Db(DbError),
    NotFound(AlarmId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "alarm not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted alarm data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<AlarmValidationError> for RepoError {
    fn from(value: AlarmValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field-and-window probe for the open-alarm dedup lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupProbe {
    pub source: String,
    pub alarm_type: Option<String>,
    pub what: Option<String>,
    pub where_location: Option<String>,
    /// Inclusive window bounds, unix epoch seconds.
    pub window_start: i64,
    pub window_end: i64,
}

/// Store contract required by the ingestion decision engine.
pub trait AlarmRepository {
    /// Finds the newest open alarm matching the probe, if any.
    fn find_open_alarm(&self, probe: &DedupProbe) -> RepoResult<Option<AlarmId>>;
    /// Persists a new alarm record.
    fn create_alarm(&self, alarm: &AlarmRecord) -> RepoResult<AlarmId>;
    /// Resolves a department code case-insensitively.
    fn resolve_department(&self, code: &str) -> RepoResult<Option<DepartmentId>>;
    /// Assigns a department to an alarm; duplicate assignment is a no-op.
    /// Returns whether a new assignment row was inserted.
    fn assign_department(
        &self,
        alarm_id: AlarmId,
        department_id: DepartmentId,
    ) -> RepoResult<bool>;
    /// Creates or refreshes a department row, returning its stable id.
    fn upsert_department(&self, code: &str, name: &str) -> RepoResult<DepartmentId>;
    /// Loads one alarm by id.
    fn get_alarm(&self, id: AlarmId) -> RepoResult<Option<AlarmRecord>>;
    /// Returns the codes of all departments assigned to an alarm, sorted.
    fn assigned_department_codes(&self, alarm_id: AlarmId) -> RepoResult<Vec<String>>;
    /// Counts persisted alarm records.
    fn count_alarms(&self) -> RepoResult<u64>;
}

/// SQLite-backed alarm repository.
pub struct SqliteAlarmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAlarmRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AlarmRepository for SqliteAlarmRepository<'_> {
    fn find_open_alarm(&self, probe: &DedupProbe) -> RepoResult<Option<AlarmId>> {
        // `IS` gives null-safe equality: NULL matches only NULL.
        let uuid_text: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid
                 FROM alarms
                 WHERE source = ?1
                   AND what IS ?2
                   AND where_location IS ?3
                   AND alarm_type IS ?4
                   AND occurred_at BETWEEN ?5 AND ?6
                   AND ended_at IS NULL
                 ORDER BY occurred_at DESC
                 LIMIT 1;",
                params![
                    probe.source,
                    probe.what,
                    probe.where_location,
                    probe.alarm_type,
                    probe.window_start,
                    probe.window_end,
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match uuid_text {
            Some(text) => Ok(Some(parse_uuid(&text, "alarms.uuid")?)),
            None => Ok(None),
        }
    }

    fn create_alarm(&self, alarm: &AlarmRecord) -> RepoResult<AlarmId> {
        alarm.validate()?;

        self.conn.execute(
            "INSERT INTO alarms (
                uuid,
                kind,
                description,
                occurred_at,
                ended_at,
                source,
                alarm_type,
                what,
                where_location,
                who_called
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                alarm.uuid.to_string(),
                kind_to_db(alarm.kind),
                alarm.description.as_str(),
                alarm.occurred_at,
                alarm.ended_at,
                alarm.source.as_str(),
                alarm.alarm_type.as_deref(),
                alarm.what.as_deref(),
                alarm.where_location.as_deref(),
                alarm.who_called.as_deref(),
            ],
        )?;

        Ok(alarm.uuid)
    }

    fn resolve_department(&self, code: &str) -> RepoResult<Option<DepartmentId>> {
        let uuid_text: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid FROM departments WHERE UPPER(code) = UPPER(?1);",
                [code],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match uuid_text {
            Some(text) => Ok(Some(parse_uuid(&text, "departments.uuid")?)),
            None => Ok(None),
        }
    }

    fn assign_department(
        &self,
        alarm_id: AlarmId,
        department_id: DepartmentId,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO alarm_departments (alarm_id, department_id)
             VALUES (?1, ?2)
             ON CONFLICT (alarm_id, department_id) DO NOTHING;",
            params![alarm_id.to_string(), department_id.to_string()],
        )?;

        Ok(inserted > 0)
    }

    fn upsert_department(&self, code: &str, name: &str) -> RepoResult<DepartmentId> {
        if let Some(existing) = self.resolve_department(code)? {
            self.conn.execute(
                "UPDATE departments SET name = ?2 WHERE uuid = ?1;",
                params![existing.to_string(), name],
            )?;
            return Ok(existing);
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO departments (uuid, code, name) VALUES (?1, ?2, ?3);",
            params![id.to_string(), code, name],
        )?;
        Ok(id)
    }

    fn get_alarm(&self, id: AlarmId) -> RepoResult<Option<AlarmRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ALARM_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_alarm_row(row)?));
        }

        Ok(None)
    }

    fn assigned_department_codes(&self, alarm_id: AlarmId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.code
             FROM alarm_departments ad
             JOIN departments d ON d.uuid = ad.department_id
             WHERE ad.alarm_id = ?1
             ORDER BY d.code ASC;",
        )?;

        let mut rows = stmt.query([alarm_id.to_string()])?;
        let mut codes = Vec::new();
        while let Some(row) = rows.next()? {
            codes.push(row.get::<_, String>(0)?);
        }

        Ok(codes)
    }

    fn count_alarms(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM alarms;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn parse_alarm_row(row: &Row<'_>) -> RepoResult<AlarmRecord> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "alarms.uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid alarm kind `{kind_text}` in alarms.kind"))
    })?;

    Ok(AlarmRecord {
        uuid,
        kind,
        description: row.get("description")?,
        occurred_at: row.get("occurred_at")?,
        ended_at: row.get("ended_at")?,
        source: row.get("source")?,
        alarm_type: row.get("alarm_type")?,
        what: row.get("what")?,
        where_location: row.get("where_location")?,
        who_called: row.get("who_called")?,
    })
}

fn parse_uuid(text: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

fn kind_to_db(kind: AlarmKind) -> &'static str {
    match kind {
        AlarmKind::Real => "real",
        AlarmKind::Practice => "practice",
        AlarmKind::Test => "test",
        AlarmKind::Ignore => "ignore",
    }
}

fn parse_kind(value: &str) -> Option<AlarmKind> {
    match value {
        "real" => Some(AlarmKind::Real),
        "practice" => Some(AlarmKind::Practice),
        "test" => Some(AlarmKind::Test),
        "ignore" => Some(AlarmKind::Ignore),
        _ => None,
    }
}
