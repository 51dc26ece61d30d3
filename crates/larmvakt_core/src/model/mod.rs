//! Domain model for alarm ingestion.
//!
//! # Responsibility
//! - Define the canonical records flowing through the ingestion pipeline.
//! - Keep text-parsing and SQL concerns out of the data shapes.
//!
//! # Invariants
//! - Every persisted alarm is identified by a stable `AlarmId`.
//! - An alarm is "open" for dedup purposes iff `ended_at` is `None`.

pub mod alarm;
