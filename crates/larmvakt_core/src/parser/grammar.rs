//! Grammar cascade for gateway message shapes.
//!
//! # Responsibility
//! - Classify free-text alarm messages into {alarm_type, what, where,
//!   who_called} using an ordered list of total-string shape rules.
//! - Guarantee a well-formed fallback result for unrecognized shapes.
//!
//! # Invariants
//! - Rules are evaluated strictly in declaration order; the first rule whose
//!   pattern matches the entire message wins and evaluation stops.
//! - Rules anchored on rarer separators (`/Klass:`, `_X_123_` infix codes)
//!   precede rules built on generic separators (`;`, `,`, `.`), because
//!   generic separators occur inside free-text fields.
//! - The rule order was tuned against real gateway traffic; changing it
//!   silently reclassifies historical message shapes.
//! - No rule ever fails the parse: unmatched input falls back to
//!   `alarm_type = "Unknown"` with the full content as `what`.

use crate::parser::codes::extract_code_tail;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Extracted detail fields for one message; all optional by design.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmDetails {
    pub alarm_type: Option<String>,
    pub what: Option<String>,
    pub where_location: Option<String>,
    pub who_called: Option<String>,
}

struct ShapeRule {
    name: &'static str,
    pattern: Regex,
    extract: fn(&Captures<'_>) -> AlarmDetails,
}

/// Fallback alarm type used when no shape rule matches.
pub const UNKNOWN_ALARM_TYPE: &str = "Unknown";

// Alarm-type keywords recognized inside free-form infix-coded messages.
const INFIX_TYPE_KEYWORDS: &[&str] = &["Beredskapsalarm", "Övrigt", "Meddelande"];
const INFIX_DEFAULT_TYPE: &str = "Larm";

static KLASS_TYPE_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Klass:\s*([^.-]+)").expect("klass type regex must compile"));

static RULES: Lazy<Vec<ShapeRule>> = Lazy::new(build_rules);

/// Parses message details by running the shape-rule cascade.
///
/// Total by construction: malformed or unexpected input yields the
/// low-confidence fallback, never an error.
pub fn parse_details(content: &str) -> AlarmDetails {
    for rule in RULES.iter() {
        if let Some(captures) = rule.pattern.captures(content) {
            let mut details = (rule.extract)(&captures);
            details.what = details.what.as_deref().map(tidy_what);
            log::debug!(
                "event=shape_rule_matched module=parser status=ok rule={}",
                rule.name
            );
            return details;
        }
    }

    log::debug!("event=shape_rule_matched module=parser status=fallback");
    AlarmDetails {
        alarm_type: Some(UNKNOWN_ALARM_TYPE.to_string()),
        what: Some(tidy_what(content)),
        where_location: None,
        who_called: None,
    }
}

/// Returns the ordered shape-rule names, for diagnostics.
pub fn rule_names() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.name).collect()
}

/// Uniform cleanup for extracted `what` text: collapse space-before-period
/// and doubled periods, trim surrounding whitespace.
fn tidy_what(raw: &str) -> String {
    let mut text = raw.trim().replace(" .", ".");
    while text.contains("..") {
        text = text.replace("..", ".");
    }
    text.trim().to_string()
}

fn rule(
    name: &'static str,
    pattern: &str,
    extract: fn(&Captures<'_>) -> AlarmDetails,
) -> ShapeRule {
    ShapeRule {
        name,
        pattern: Regex::new(pattern).expect("shape rule regex must compile"),
        extract,
    }
}

fn group(captures: &Captures<'_>, index: usize) -> String {
    captures
        .get(index)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn strip_location(raw: &str) -> String {
    raw.trim().trim_start_matches('_').trim().to_string()
}

fn build_rules() -> Vec<ShapeRule> {
    vec![
        // Bare practice alarm: "PROVALARM <free text>".
        rule("provalarm_plain", r"^PROVALARM\s+(.+)$", |c| AlarmDetails {
            alarm_type: Some("PROVALARM".to_string()),
            what: Some(group(c, 1)),
            where_location: None,
            who_called: None,
        }),
        // Coded practice alarm: "DEPT_N_900_PROVALARM <text>._<location>".
        rule(
            "provalarm_coded",
            r"^([A-Za-z]+)_([A-Z]_\d+)_PROVALARM\s+(.+?)\._(.+)$",
            |c| AlarmDetails {
                alarm_type: Some("PROVALARM".to_string()),
                what: Some(group(c, 3)),
                where_location: Some(strip_location(&group(c, 4))),
                who_called: None,
            },
        ),
        // Infix-coded free-form message: "<who>_C_441_<text>.<location>".
        rule(
            "infix_code_freeform",
            r"^([^_]+)_([A-Z]_\d+)_(.+?)\.(.+)$",
            |c| {
                let description = group(c, 3);
                let alarm_type = INFIX_TYPE_KEYWORDS
                    .iter()
                    .find(|keyword| description.contains(*keyword))
                    .map(|keyword| keyword.to_string())
                    .unwrap_or_else(|| INFIX_DEFAULT_TYPE.to_string());
                AlarmDetails {
                    alarm_type: Some(alarm_type),
                    what: Some(description),
                    where_location: Some(strip_location(&group(c, 4))),
                    who_called: Some(group(c, 1)),
                }
            },
        ),
        // Infix-coded classed message: "<who>_A_422_Klass: <type> - <what>.<location>".
        rule(
            "infix_code_klass",
            r"^([^_]+)_([A-Z]_\d+)_([^_]+)\.(.+)$",
            |c| {
                let description = group(c, 3);
                let alarm_type = KLASS_TYPE_IN_TEXT
                    .captures(&description)
                    .map(|k| k[1].trim().to_string());
                let what = description
                    .split_once(" - ")
                    .map(|(_, rest)| rest.trim().to_string())
                    .unwrap_or(description);
                AlarmDetails {
                    alarm_type,
                    what: Some(what),
                    where_location: Some(strip_location(&group(c, 4))),
                    who_called: Some(group(c, 1)),
                }
            },
        ),
        // "<loc>; Klass: <type>. Händelse? <what>. Övrigt: <extra>; <who>".
        rule(
            "klass_handelse_question",
            r"^(.+?);\s*Klass:\s*([^;]+)\.\s*Händelse\?\s*([^;]+)\.\s*Övrigt:\s*([^;]+);\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(format!("{}. Övrigt: {}", group(c, 3), group(c, 4))),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 5)),
            },
        ),
        // "<loc>; Klass: <type>. Händelse: <what>; <who>".
        rule(
            "klass_handelse",
            r"^(.+?);\s*Klass:\s*([^;]+)\.\s*Händelse:\s*([^;]+);\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // "<loc>; <loc detail>; Klass: <type> - <what>. <extra>; <who>".
        rule(
            "klass_two_locations",
            r"^(.+?);\s+(.+?);\s+Klass:\s*([^-]+?)\s*-\s*([^.;]+?)\.\s*([^;]+?);\s+(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 3)),
                what: Some(format!("{}. {}", group(c, 4), group(c, 5))),
                where_location: Some(format!("{}; {}", group(c, 1), group(c, 2))),
                who_called: Some(group(c, 6)),
            },
        ),
        // Tolerant variant of the Händelse? shape: stray spaces/periods
        // around sentences, location detail in a second segment.
        rule(
            "klass_handelse_question_tolerant",
            r"^(.+?);\s*(.+?);\s*Klass:\s*([^.;]+)\.\s*Händelse\?\s*([^.;]+?)\s*\.?\s*Övrigt:\s*([^;]+?)\s*\.?\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 3)),
                what: Some(format!("{}. Övrigt: {}", group(c, 4), group(c, 5))),
                where_location: Some(format!("{}; {}", group(c, 1), group(c, 2))),
                who_called: Some(group(c, 6)),
            },
        ),
        // "<loc>; /Klass: <type> - <what>. <trailing text + code list>".
        rule(
            "slash_klass_code_tail",
            r"^(.+?);\s*/Klass:\s*([^-]+?)\s*-\s*([^.;]+?)\s*\.\s*(.+)$",
            |c| with_code_tail(group(c, 2), group(c, 3), group(c, 1), &group(c, 4)),
        ),
        // "<loc>; Klass: <type>-<what>. <trailing text + code list>".
        rule(
            "klass_dash_code_tail",
            r"^(.+?);\s*Klass:\s*([^-]+?)-([^.;]+?)\s*\.\s*(.+)$",
            |c| with_code_tail(group(c, 2), group(c, 3), group(c, 1), &group(c, 4)),
        ),
        // "<loc>; /Klass: <type> - <what>.; <who>".
        rule(
            "slash_klass_who",
            r"^(.+?);\s*/Klass:\s*([^-]+?)\s*-\s*([^;]+?)\s*\.\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // "<loc>; Klass: <type>-<what>.; <who>".
        rule(
            "klass_dash_who",
            r"^(.+?);\s*Klass:\s*([^-]+?)-([^;]+?)\s*\.\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // "<loc>; Klass: <type> - <what>. <extra>; <who>".
        rule(
            "klass_extra_info",
            r"^(.+?);\s*Klass:\s*([^-]+?)\s*-\s*([^.]+?)\.\s*([^;]+)\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(format!("{}. {}", group(c, 3), group(c, 4))),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 5)),
            },
        ),
        // Comma variant: "<loc>, Klass: <type> - <what>. <extra>; <who>".
        rule(
            "klass_extra_info_comma",
            r"^(.+?),\s*Klass:\s*([^-]+?)\s*-\s*([^.]+?)\.\s*([^;]+)\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(format!("{}. {}", group(c, 3), group(c, 4))),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 5)),
            },
        ),
        // "<loc>; Klass: <type> - <what>.; <who>".
        rule(
            "klass_simple",
            r"^(.+?);\s*Klass:\s*([^-]+?)\s*-\s*([^;]+?)\s*\.\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // "<loc>; Beredskapsalarm <text>. Övrigt <extra>., <who>".
        rule(
            "beredskap_ovrigt",
            r"^(.+?);\s*(Beredskapsalarm|Övrigt)\s*(.+?)\s*\.\s*Övrigt\s+([^.,]+?)\s*\.\s*,\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(format!("{}. Övrigt {}", group(c, 3), group(c, 4))),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 5)),
            },
        ),
        // "<loc>; Beredskapsalarm <text>., <who>".
        rule(
            "beredskap_simple",
            r"^(.+?);\s*(Beredskapsalarm|Övrigt)\s*(.+?)\s*\.\s*,\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // Reinforcement request: "<loc>; Typ av förstärkning <unit>. Övrig
        // information: <text>.; <who>".
        rule(
            "forstarkning",
            r"^(.+?);\s*Typ av förstärkning\s+([^.;]+?)\.\s*Övrig information:\s*([^;]+?)\s*\.\s*;\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some("Förstärkning".to_string()),
                what: Some(format!(
                    "Typ av förstärkning {}. Övrig information: {}",
                    group(c, 2),
                    group(c, 3)
                )),
                where_location: Some(group(c, 1)),
                who_called: Some(group(c, 4)),
            },
        ),
        // Inverted shape: "<who> Klass: <type> - <what>. <location>".
        rule(
            "leading_codes_klass",
            r"^(.+?)\s+Klass:\s*([^-]+?)\s*-\s*([^.]+?)\.\s*(.+)$",
            |c| AlarmDetails {
                alarm_type: Some(group(c, 2)),
                what: Some(group(c, 3)),
                where_location: Some(group(c, 4)),
                who_called: Some(group(c, 1)),
            },
        ),
    ]
}

// Shared extraction for the code-tail rules: the trailing segment mixes
// free text with an addressee code list; the code list becomes who_called
// and any leading text is folded into `what`.
fn with_code_tail(
    alarm_type: String,
    what: String,
    where_location: String,
    rest: &str,
) -> AlarmDetails {
    let (who_called, what) = match extract_code_tail(rest) {
        Some(tail) => {
            let what = match tail.remainder {
                Some(remainder) => format!("{what}. {remainder}"),
                None => what,
            };
            (Some(tail.codes), what)
        }
        None if rest.is_empty() => (None, what),
        None => (None, format!("{what}. {rest}")),
    };

    AlarmDetails {
        alarm_type: Some(alarm_type),
        what: Some(what),
        where_location: Some(where_location),
        who_called,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_details, rule_names, tidy_what, UNKNOWN_ALARM_TYPE};

    #[test]
    fn fallback_never_fails() {
        let details = parse_details("completely unstructured text with no separators");
        assert_eq!(details.alarm_type.as_deref(), Some(UNKNOWN_ALARM_TYPE));
        assert_eq!(
            details.what.as_deref(),
            Some("completely unstructured text with no separators")
        );
        assert_eq!(details.where_location, None);
        assert_eq!(details.who_called, None);
    }

    #[test]
    fn rule_order_starts_with_provalarm_shapes() {
        let names = rule_names();
        assert_eq!(names[0], "provalarm_plain");
        assert_eq!(names[1], "provalarm_coded");
        // Infix-code rules precede every generic-separator rule.
        assert!(
            names.iter().position(|n| *n == "infix_code_freeform")
                < names.iter().position(|n| *n == "klass_simple")
        );
    }

    #[test]
    fn tidy_what_collapses_doubled_periods() {
        assert_eq!(tidy_what("Station A. . Drill tonight."), "Station A. Drill tonight.");
        assert_eq!(tidy_what("  plain text "), "plain text");
    }
}
