//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract required by the ingestion decision engine.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `AlarmRecord::validate()` before SQL
//!   mutations.
//! - Department assignment inserts are idempotent.

pub mod alarm_repo;
