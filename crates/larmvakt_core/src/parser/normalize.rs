//! Message normalization: raw gateway text to `ParsedAlarm`.
//!
//! # Responsibility
//! - Combine ignore-marker screening, kind classification, the grammar
//!   cascade and department detection into one structured record.
//!
//! # Invariants
//! - Ignore markers are checked before any shape rule runs; a tripped
//!   marker short-circuits the whole cascade.
//! - Kind classification is independent of the grammar cascade and uses its
//!   own keyword table; the first matching row wins, default `Real`.
//! - Normalization is a pure function of the input and static
//!   configuration.

use crate::config::{AlarmConfig, ConfigError, KindKeywords};
use crate::model::alarm::{AlarmKind, ParsedAlarm};
use crate::parser::departments::DepartmentMatcher;
use crate::parser::grammar::parse_details;

/// Stateless normalizer built once from static configuration.
pub struct MessageNormalizer {
    matcher: DepartmentMatcher,
    kind_keywords: Vec<KindKeywords>,
    ignore_phrases: Vec<String>,
}

impl MessageNormalizer {
    /// Builds a normalizer, validating the configuration up front.
    pub fn new(config: &AlarmConfig) -> Result<Self, ConfigError> {
        let matcher = DepartmentMatcher::new(config)?;
        Ok(Self {
            matcher,
            kind_keywords: config.kind_keywords.clone(),
            ignore_phrases: config.ignore_phrases.clone(),
        })
    }

    /// Normalizes one message into an immutable `ParsedAlarm`.
    pub fn normalize(&self, content: &str) -> ParsedAlarm {
        if let Some(marker) = self.tripped_ignore_marker(content) {
            log::info!(
                "event=message_ignored module=parser status=ok marker={}",
                marker
            );
            return ParsedAlarm {
                kind: AlarmKind::Ignore,
                alarm_type: None,
                what: None,
                where_location: None,
                who_called: None,
                department_codes: Vec::new(),
                description: content.to_string(),
                raw_content: content.to_string(),
            };
        }

        let kind = self.classify_kind(content);
        let details = parse_details(content);
        let department_codes = self.matcher.detect(content);

        ParsedAlarm {
            kind,
            alarm_type: details.alarm_type,
            what: details.what,
            where_location: details.where_location,
            who_called: details.who_called,
            department_codes,
            description: content.to_string(),
            raw_content: content.to_string(),
        }
    }

    fn tripped_ignore_marker(&self, content: &str) -> Option<&str> {
        self.ignore_phrases
            .iter()
            .find(|phrase| content.contains(phrase.as_str()))
            .map(|phrase| phrase.as_str())
    }

    fn classify_kind(&self, content: &str) -> AlarmKind {
        for row in &self.kind_keywords {
            if row.phrases.iter().any(|phrase| content.contains(phrase)) {
                return row.kind;
            }
        }
        AlarmKind::Real
    }
}
