//! Alarm domain records.
//!
//! # Responsibility
//! - Define the parsed message shape handed from the normalizer to the
//!   ingestion decision, and the persisted alarm record shape.
//! - Provide persistence-guard validation for alarm records.
//!
//! # Invariants
//! - `ParsedAlarm` is immutable once produced and consumed exactly once.
//! - `AlarmKind::Ignore` never reaches storage.
//! - `ended_at`, when set, is never earlier than `occurred_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted alarm record.
pub type AlarmId = Uuid;

/// Stable identifier for a department row in the store.
pub type DepartmentId = Uuid;

/// Top-level incident classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    /// A live incident.
    Real,
    /// Announced practice/drill traffic.
    Practice,
    /// Gateway or pager test traffic.
    Test,
    /// Administrative noise that must never become an alarm.
    Ignore,
}

/// One inbound gateway message, owned by the transport for the duration of
/// a single ingestion call. Never persisted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Full message text as delivered by the gateway.
    pub content: String,
    /// Sender identity when the gateway supplies one.
    pub sender: Option<String>,
    /// Arrival time, unix epoch seconds.
    pub received_at: i64,
}

impl RawMessage {
    /// Creates a message with no sender metadata.
    pub fn new(content: impl Into<String>, received_at: i64) -> Self {
        Self {
            content: content.into(),
            sender: None,
            received_at,
        }
    }
}

/// Structured result of normalizing one gateway message.
///
/// `department_codes` may legitimately be empty (no known department was
/// addressed); that is the one condition under which ingestion ignores the
/// message instead of creating or merging a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAlarm {
    pub kind: AlarmKind,
    pub alarm_type: Option<String>,
    pub what: Option<String>,
    pub where_location: Option<String>,
    pub who_called: Option<String>,
    /// Department codes in configured department order, not text order.
    pub department_codes: Vec<String>,
    /// Human-readable description; the raw content verbatim.
    pub description: String,
    pub raw_content: String,
}

/// Persisted alarm record shape shared with the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub uuid: AlarmId,
    pub kind: AlarmKind,
    pub description: String,
    /// Incident time, unix epoch seconds.
    pub occurred_at: i64,
    /// Close time; `None` means the alarm is still open.
    pub ended_at: Option<i64>,
    /// Originating channel, e.g. the gateway name.
    pub source: String,
    pub alarm_type: Option<String>,
    pub what: Option<String>,
    pub where_location: Option<String>,
    pub who_called: Option<String>,
}

impl AlarmRecord {
    /// Builds a fresh open record from a parsed message.
    pub fn from_parsed(parsed: &ParsedAlarm, occurred_at: i64, source: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind: parsed.kind,
            description: parsed.description.clone(),
            occurred_at,
            ended_at: None,
            source: source.into(),
            alarm_type: parsed.alarm_type.clone(),
            what: parsed.what.clone(),
            where_location: parsed.where_location.clone(),
            who_called: parsed.who_called.clone(),
        }
    }

    /// Returns whether this record counts as open for dedup purposes.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Validates persistence-level invariants before any SQL mutation.
    pub fn validate(&self) -> Result<(), AlarmValidationError> {
        if self.kind == AlarmKind::Ignore {
            return Err(AlarmValidationError::IgnoreKindPersisted);
        }
        if self.source.trim().is_empty() {
            return Err(AlarmValidationError::EmptySource);
        }
        if self.description.trim().is_empty() {
            return Err(AlarmValidationError::EmptyDescription);
        }
        if let Some(ended_at) = self.ended_at {
            if ended_at < self.occurred_at {
                return Err(AlarmValidationError::EndedBeforeOccurred {
                    occurred_at: self.occurred_at,
                    ended_at,
                });
            }
        }
        Ok(())
    }
}

/// Validation failure for alarm record persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmValidationError {
    IgnoreKindPersisted,
    EmptySource,
    EmptyDescription,
    EndedBeforeOccurred { occurred_at: i64, ended_at: i64 },
}

impl Display for AlarmValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IgnoreKindPersisted => {
                write!(f, "alarms of kind `ignore` must not be persisted")
            }
            Self::EmptySource => write!(f, "alarm source cannot be empty"),
            Self::EmptyDescription => write!(f, "alarm description cannot be empty"),
            Self::EndedBeforeOccurred {
                occurred_at,
                ended_at,
            } => write!(
                f,
                "ended_at {ended_at} is earlier than occurred_at {occurred_at}"
            ),
        }
    }
}

impl Error for AlarmValidationError {}
