//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `larmvakt_core` wiring end to
//!   end against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use larmvakt_core::{
    seed_departments, AlarmConfig, AlarmPipeline, RawMessage, SqliteAlarmRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("larmvakt: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    println!("larmvakt_core version={}", larmvakt_core::core_version());

    let conn = larmvakt_core::db::open_db_in_memory().map_err(|err| err.to_string())?;
    let config = AlarmConfig::builtin();
    let repo = SqliteAlarmRepository::new(&conn);
    seed_departments(&repo, &config).map_err(|err| err.to_string())?;

    let pipeline = AlarmPipeline::new(&config, repo).map_err(|err| err.to_string())?;

    let samples = [
        "Main Street 12, City; /Klass: Major Alarm - Automatic Alarm.; A01, A02, A03",
        "Main Street 12, City; /Klass: Major Alarm - Automatic Alarm.; B01, B02",
        "PROVALARM Station A. Practice drill tonight at 19:00.",
    ];

    for (offset, content) in samples.iter().enumerate() {
        let message = RawMessage::new(*content, 1_700_000_000 + offset as i64 * 5);
        let outcome = pipeline.process(&message).map_err(|err| err.to_string())?;
        println!("message={content:?} outcome={outcome:?}");
    }

    Ok(())
}
