//! Ingestion use-case services.
//!
//! # Responsibility
//! - Orchestrate normalizer and repository calls into the per-message
//!   ingestion decision.
//! - Keep transport layers decoupled from parsing and storage details.

pub mod ingest_service;
