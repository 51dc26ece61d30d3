//! Ingestion decision engine and pipeline assembly.
//!
//! # Responsibility
//! - Decide per parsed message: ignore, merge into an existing open alarm,
//!   or create a new alarm with its department assignments.
//! - Wire normalizer + decision engine into a single per-message entry
//!   point for transports.
//!
//! # Invariants
//! - A message with no detected department is ignored; no store write
//!   happens.
//! - Dedup matches only open alarms (`ended_at` null) from the same source
//!   with an equal (what, where, alarm_type) triple inside the ±2 minute
//!   window.
//! - Department assignment is a set: re-assigning an already-assigned
//!   department is a no-op.
//! - The find-then-write sequence is not atomic; concurrent near-duplicate
//!   ingestions can race. Accepted: the store does not serialize on a
//!   natural key.

use crate::config::{AlarmConfig, ConfigError};
use crate::model::alarm::{AlarmId, AlarmKind, AlarmRecord, ParsedAlarm, RawMessage};
use crate::parser::normalize::MessageNormalizer;
use crate::repo::alarm_repo::{AlarmRepository, DedupProbe, RepoResult};
use log::{info, warn};

/// Half-width of the duplicate-detection window, in seconds. The gateway
/// re-transmits one incident to different distribution lists seconds apart.
pub const DEDUP_WINDOW_SECS: i64 = 120;

/// Per-message ingestion result handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No record was created or modified.
    Ignored { reason: String },
    /// Departments were merged onto an existing open alarm.
    Merged { alarm_id: AlarmId },
    /// A new alarm record was created.
    Created { alarm_id: AlarmId },
}

/// Decision engine: turns a `ParsedAlarm` into a create-or-merge effect.
pub struct IngestService<R: AlarmRepository> {
    repo: R,
    source: String,
}

impl<R: AlarmRepository> IngestService<R> {
    /// Creates a service writing alarms stamped with `source`.
    pub fn new(repo: R, source: impl Into<String>) -> Self {
        Self {
            repo,
            source: source.into(),
        }
    }

    /// Borrows the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Runs the create-or-merge decision for one parsed message.
    ///
    /// # Errors
    /// Store failures propagate unchanged; the caller owns retry policy.
    pub fn ingest(&self, parsed: &ParsedAlarm, received_at: i64) -> RepoResult<IngestOutcome> {
        if parsed.kind == AlarmKind::Ignore {
            info!("event=ingest module=service status=ignored reason=ignore_marker");
            return Ok(IngestOutcome::Ignored {
                reason: "ignore marker".to_string(),
            });
        }

        if parsed.department_codes.is_empty() {
            info!("event=ingest module=service status=ignored reason=unknown_department");
            return Ok(IngestOutcome::Ignored {
                reason: "unknown department".to_string(),
            });
        }

        let probe = DedupProbe {
            source: self.source.clone(),
            alarm_type: parsed.alarm_type.clone(),
            what: parsed.what.clone(),
            where_location: parsed.where_location.clone(),
            window_start: received_at - DEDUP_WINDOW_SECS,
            window_end: received_at + DEDUP_WINDOW_SECS,
        };

        if let Some(alarm_id) = self.repo.find_open_alarm(&probe)? {
            self.assign_departments(alarm_id, &parsed.department_codes)?;
            info!(
                "event=ingest module=service status=merged alarm_id={} departments={}",
                alarm_id,
                parsed.department_codes.len()
            );
            return Ok(IngestOutcome::Merged { alarm_id });
        }

        let record = AlarmRecord::from_parsed(parsed, received_at, self.source.clone());
        let alarm_id = self.repo.create_alarm(&record)?;
        self.assign_departments(alarm_id, &parsed.department_codes)?;
        info!(
            "event=ingest module=service status=created alarm_id={} kind={:?} departments={}",
            alarm_id,
            parsed.kind,
            parsed.department_codes.len()
        );

        Ok(IngestOutcome::Created { alarm_id })
    }

    // A code the store does not know is logged and skipped; it never aborts
    // the remaining codes.
    fn assign_departments(&self, alarm_id: AlarmId, codes: &[String]) -> RepoResult<()> {
        for code in codes {
            match self.repo.resolve_department(code)? {
                Some(department_id) => {
                    self.repo.assign_department(alarm_id, department_id)?;
                }
                None => {
                    warn!(
                        "event=department_resolve module=service status=skipped code={}",
                        code
                    );
                }
            }
        }
        Ok(())
    }
}

/// End-to-end pipeline: one call per inbound gateway message.
///
/// Holds only immutable configuration-derived state; safe to invoke from
/// concurrent transports, one pipeline per store connection.
pub struct AlarmPipeline<R: AlarmRepository> {
    normalizer: MessageNormalizer,
    ingest: IngestService<R>,
}

impl<R: AlarmRepository> AlarmPipeline<R> {
    /// Builds the pipeline, validating configuration up front.
    pub fn new(config: &AlarmConfig, repo: R) -> Result<Self, ConfigError> {
        let normalizer = MessageNormalizer::new(config)?;
        let ingest = IngestService::new(repo, config.gateway_source.clone());
        Ok(Self { normalizer, ingest })
    }

    /// Normalizes one raw message and runs the ingestion decision.
    pub fn process(&self, message: &RawMessage) -> RepoResult<IngestOutcome> {
        let parsed = self.normalizer.normalize(&message.content);
        self.ingest.ingest(&parsed, message.received_at)
    }

    /// Normalizes without touching the store; used by dry-run transports.
    pub fn normalize(&self, content: &str) -> ParsedAlarm {
        self.normalizer.normalize(content)
    }

    /// Borrows the underlying decision engine.
    pub fn ingest_service(&self) -> &IngestService<R> {
        &self.ingest
    }
}

/// Seeds the store's department table from the configured alias list.
///
/// Intended for host bootstrap; existing rows keep their ids.
pub fn seed_departments<R: AlarmRepository>(repo: &R, config: &AlarmConfig) -> RepoResult<()> {
    for dept in &config.departments {
        repo.upsert_department(&dept.code, &dept.code)?;
    }
    Ok(())
}
