//! Inbound alarm-message ingestion pipeline.
//!
//! Receives free-text alarm notifications from an SMS gateway, classifies
//! them into structured fields via an ordered grammar cascade, detects the
//! addressed departments, and decides whether each message merges into an
//! already-open incident or creates a new alarm record.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod parser;
pub mod repo;
pub mod service;

pub use config::{AlarmConfig, ConfigError, DepartmentAlias, KindKeywords};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::alarm::{
    AlarmId, AlarmKind, AlarmRecord, AlarmValidationError, DepartmentId, ParsedAlarm, RawMessage,
};
pub use parser::departments::DepartmentMatcher;
pub use parser::grammar::{parse_details, AlarmDetails, UNKNOWN_ALARM_TYPE};
pub use parser::normalize::MessageNormalizer;
pub use repo::alarm_repo::{
    AlarmRepository, DedupProbe, RepoError, RepoResult, SqliteAlarmRepository,
};
pub use service::ingest_service::{
    seed_departments, AlarmPipeline, IngestOutcome, IngestService, DEDUP_WINDOW_SECS,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
