//! Inbound alarm-message parsing.
//!
//! # Responsibility
//! - Turn free-text gateway messages into structured `ParsedAlarm` records
//!   via the grammar cascade, department matcher and kind classifier.
//!
//! # Invariants
//! - Parsing never fails: unrecognized shapes resolve to the fallback
//!   classification instead of an error.
//! - All parsing is deterministic given the same static configuration.

pub mod codes;
pub mod departments;
pub mod grammar;
pub mod normalize;
