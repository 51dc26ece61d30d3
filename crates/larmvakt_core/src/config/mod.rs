//! Static pipeline configuration.
//!
//! # Responsibility
//! - Hold the department alias table, kind keyword table and ignore-phrase
//!   list as immutable process-wide data.
//! - Fail fast on malformed tables at load time, not per message.
//!
//! # Invariants
//! - Department order in the table defines the output order of every
//!   department detection, regardless of message phrasing.
//! - Kind keyword rows are checked in table order; the first matching row
//!   wins.

use crate::model::alarm::AlarmKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One configured department and the alias tokens that address it.
///
/// Aliases are matched case-insensitively; short aliases (4 chars or less,
/// typically vehicle call-signs) additionally require non-alphanumeric
/// boundaries in the message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAlias {
    /// Stable department code, e.g. `DEPT01`.
    pub code: String,
    /// Alias tokens: call-signs, codes and long-form names.
    pub patterns: Vec<String>,
}

/// One kind-classification row: trigger phrases for an alarm kind.
///
/// Phrases are matched as case-sensitive substrings of the raw content, in
/// the order given here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindKeywords {
    pub kind: AlarmKind,
    pub phrases: Vec<String>,
}

/// Immutable pipeline configuration, loaded once at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Ordered department alias table.
    pub departments: Vec<DepartmentAlias>,
    /// Ordered kind keyword table; messages matching no row default to
    /// `AlarmKind::Real`.
    pub kind_keywords: Vec<KindKeywords>,
    /// Literal phrases that short-circuit the whole cascade as `Ignore`.
    pub ignore_phrases: Vec<String>,
    /// Source label stamped on every alarm created by this pipeline.
    pub gateway_source: String,
}

impl AlarmConfig {
    /// Returns the built-in table set mirroring the default deployment.
    pub fn builtin() -> Self {
        Self {
            departments: vec![
                department("DEPT01", &["A01", "A02", "A03", "DEPT01", "Station A"]),
                department("DEPT02", &["B01", "B02", "B03", "DEPT02", "Station B"]),
                department("DEPT03", &["C01", "C02", "C03", "DEPT03", "Station C"]),
                department("DEPT04", &["D01", "D02", "D03", "DEPT04", "Station D"]),
                department("DEPT05", &["E01", "E02", "E03", "DEPT05", "Station E"]),
                department("RESCUE", &["RESCUE01", "Rescue Team", "Emergency Response"]),
            ],
            kind_keywords: vec![
                KindKeywords {
                    kind: AlarmKind::Practice,
                    phrases: vec![
                        "PROVALARM".to_string(),
                        "Övning".to_string(),
                        "test".to_string(),
                    ],
                },
                KindKeywords {
                    kind: AlarmKind::Test,
                    phrases: vec!["TEST".to_string()],
                },
            ],
            ignore_phrases: vec![
                "PROVALARM-BEFOLKNINGSSKYDD".to_string(),
                "Återbud".to_string(),
            ],
            gateway_source: "SMS".to_string(),
        }
    }

    /// Validates table-level invariants.
    ///
    /// # Errors
    /// - Empty department table, blank codes/patterns or duplicate codes.
    /// - Blank kind phrases or ignore phrases.
    /// - Blank gateway source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.departments.is_empty() {
            return Err(ConfigError::NoDepartments);
        }

        let mut seen = BTreeSet::<String>::new();
        for dept in &self.departments {
            let code = dept.code.trim();
            if code.is_empty() {
                return Err(ConfigError::EmptyDepartmentCode);
            }
            if !seen.insert(code.to_uppercase()) {
                return Err(ConfigError::DuplicateDepartmentCode(code.to_string()));
            }
            if dept.patterns.is_empty() {
                return Err(ConfigError::NoAliases(code.to_string()));
            }
            if dept.patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyAlias(code.to_string()));
            }
        }

        for row in &self.kind_keywords {
            if row.phrases.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyKindPhrase);
            }
        }

        if self.ignore_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyIgnorePhrase);
        }

        if self.gateway_source.trim().is_empty() {
            return Err(ConfigError::EmptyGatewaySource);
        }

        Ok(())
    }
}

fn department(code: &str, patterns: &[&str]) -> DepartmentAlias {
    DepartmentAlias {
        code: code.to_string(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

/// Configuration-load failure; aborts startup rather than surfacing per
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoDepartments,
    EmptyDepartmentCode,
    DuplicateDepartmentCode(String),
    NoAliases(String),
    EmptyAlias(String),
    EmptyKindPhrase,
    EmptyIgnorePhrase,
    EmptyGatewaySource,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDepartments => write!(f, "department alias table is empty"),
            Self::EmptyDepartmentCode => write!(f, "department code cannot be blank"),
            Self::DuplicateDepartmentCode(code) => {
                write!(f, "duplicate department code `{code}`")
            }
            Self::NoAliases(code) => {
                write!(f, "department `{code}` declares no alias patterns")
            }
            Self::EmptyAlias(code) => {
                write!(f, "department `{code}` declares a blank alias pattern")
            }
            Self::EmptyKindPhrase => write!(f, "kind keyword table contains a blank phrase"),
            Self::EmptyIgnorePhrase => write!(f, "ignore phrase list contains a blank phrase"),
            Self::EmptyGatewaySource => write!(f, "gateway source label cannot be blank"),
        }
    }
}

impl Error for ConfigError {}
