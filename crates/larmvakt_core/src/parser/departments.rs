//! Department detection over message text.
//!
//! # Responsibility
//! - Map call-sign tokens and long-form names in a message to configured
//!   department codes.
//!
//! # Invariants
//! - Results iterate departments in configured order, never in order of
//!   appearance in the text.
//! - Aliases of 4 chars or less require non-alphanumeric boundaries on both
//!   sides in body text (`E11` must not match inside `LE112`).
//! - An empty result is a valid, expected outcome.

use crate::config::{AlarmConfig, ConfigError};
use crate::parser::codes::{extract_code_tail, extract_leading_run, split_codes};
use regex::Regex;
use std::collections::BTreeSet;

// Aliases at or below this length are call-sign codes and need strict
// boundary checks; longer aliases are human-readable names.
const SHORT_ALIAS_MAX_LEN: usize = 4;

enum AliasMatcher {
    /// Exact uppercased token, plus manual boundary scan in body text.
    ShortCode(String),
    /// Word-boundary regex over uppercased body text.
    Name { token: String, body: Regex },
}

struct DepartmentEntry {
    code: String,
    aliases: Vec<AliasMatcher>,
}

/// Detects configured departments addressed by a message.
pub struct DepartmentMatcher {
    departments: Vec<DepartmentEntry>,
}

impl DepartmentMatcher {
    /// Builds a matcher from a validated configuration.
    ///
    /// # Errors
    /// Returns the underlying validation error for malformed tables; alias
    /// regexes are compiled here so bad configuration fails at startup.
    pub fn new(config: &AlarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let departments = config
            .departments
            .iter()
            .map(|dept| DepartmentEntry {
                code: dept.code.trim().to_string(),
                aliases: dept
                    .patterns
                    .iter()
                    .map(|pattern| build_alias(pattern.trim()))
                    .collect(),
            })
            .collect();

        Ok(Self { departments })
    }

    /// Returns the codes of all departments addressed by `content`, in
    /// configured department order.
    pub fn detect(&self, content: &str) -> Vec<String> {
        let content_upper = content.to_uppercase();
        let candidates = candidate_tokens(content, &content_upper);

        self.departments
            .iter()
            .filter(|dept| {
                dept.aliases
                    .iter()
                    .any(|alias| alias_matches(alias, &candidates, &content_upper))
            })
            .map(|dept| dept.code.clone())
            .collect()
    }
}

// Candidate token set from the trailing code list and the leading code run.
fn candidate_tokens(content: &str, content_upper: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    if let Some(tail) = extract_code_tail(content) {
        tokens.extend(split_codes(&tail.codes));
    }
    if let Some(run) = extract_leading_run(content_upper) {
        tokens.extend(split_codes(&run));
    }

    tokens
}

fn build_alias(pattern: &str) -> AliasMatcher {
    let token = pattern.to_uppercase();
    if pattern.chars().count() <= SHORT_ALIAS_MAX_LEN {
        AliasMatcher::ShortCode(token)
    } else {
        let body = Regex::new(&format!(r"\b{}\b", regex::escape(&token)))
            .expect("escaped alias regex must compile");
        AliasMatcher::Name { token, body }
    }
}

fn alias_matches(alias: &AliasMatcher, candidates: &BTreeSet<String>, body_upper: &str) -> bool {
    match alias {
        AliasMatcher::ShortCode(token) => {
            candidates.contains(token) || bounded_contains(body_upper, token)
        }
        AliasMatcher::Name { token, body } => {
            candidates.contains(token) || body.is_match(body_upper)
        }
    }
}

// Boundary-sensitive substring search for short codes: every occurrence must
// be delimited by a non-alphanumeric char or the string edge on both sides.
fn bounded_contains(haystack: &str, needle: &str) -> bool {
    for (start, found) in haystack.match_indices(needle) {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric());
        let after_ok = haystack[start + found.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{bounded_contains, DepartmentMatcher};
    use crate::config::AlarmConfig;

    fn matcher() -> DepartmentMatcher {
        DepartmentMatcher::new(&AlarmConfig::builtin()).unwrap()
    }

    #[test]
    fn bounded_contains_rejects_embedded_codes() {
        assert!(!bounded_contains("ROUTE LE112 NORTH", "E11"));
        assert!(bounded_contains("UNITS E11, B02", "E11"));
        assert!(bounded_contains("E11", "E11"));
        assert!(bounded_contains("CALL E11_NOW", "E11"));
    }

    #[test]
    fn detection_preserves_configured_order() {
        let codes = matcher().detect("Fire at mill; Klass: Larm - Brand.; E01, B01, A01");
        assert_eq!(codes, vec!["DEPT01", "DEPT02", "DEPT05"]);
    }

    #[test]
    fn long_form_names_match_on_word_boundaries() {
        let codes = matcher().detect("Practice drill at Station B tonight");
        assert_eq!(codes, vec!["DEPT02"]);
    }

    #[test]
    fn no_match_yields_empty_result() {
        assert!(matcher().detect("nothing relevant here").is_empty());
    }
}
