//! Call-sign code-run extraction.
//!
//! # Responsibility
//! - Isolate trailing comma-separated code lists ("code list tails") and
//!   leading code runs from message text.
//! - Shared by the grammar cascade (who-called extraction) and the
//!   department matcher (candidate token building).
//!
//! # Invariants
//! - Tail shape patterns are tried in fixed priority order; the first match
//!   wins and extraction stops there.
//! - A message with no code-shaped run yields `None`, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

// One code token: letter-prefixed call-sign (`A01`, `Ma3`) or an all-caps
// word (`POLIS`).
const CODE_TOKEN: &str = r"[A-Z][a-z]?\d+|[A-Z]+";

static TAIL_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Multiple comma-joined codes with optional trailing punctuation.
        Regex::new(&format!(
            r"({CODE_TOKEN})(?:\s*,\s*(?:{CODE_TOKEN}))+\s*\.?\.?$"
        ))
        .expect("tail shape regex must compile"),
        // Single code at the end.
        Regex::new(&format!(r"({CODE_TOKEN})\s*\.?\.?$")).expect("tail shape regex must compile"),
        // Flexible run tolerating a dangling comma.
        Regex::new(&format!(
            r"({CODE_TOKEN})(?:\s*,\s*(?:{CODE_TOKEN}))*(?:\s*,\s*)?\s*\.?\.?$"
        ))
        .expect("tail shape regex must compile"),
    ]
});

static LEADING_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^({CODE_TOKEN})(?:\s*,\s*(?:{CODE_TOKEN}))*(?:\s*,\s*|_)"
    ))
    .expect("leading run regex must compile")
});

/// A trailing code list split off from message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTail {
    /// The comma-separated code list, trailing punctuation stripped.
    pub codes: String,
    /// Text preceding the code list, `None` when only separators remain.
    pub remainder: Option<String>,
}

/// Extracts a trailing code list from `text` using the tail shape patterns.
pub fn extract_code_tail(text: &str) -> Option<CodeTail> {
    let text = text.trim_end();
    if text.is_empty() {
        return None;
    }

    for shape in TAIL_SHAPES.iter() {
        if let Some(found) = shape.find(text) {
            let codes = found
                .as_str()
                .trim_end_matches(['.', ','])
                .trim()
                .to_string();
            if codes.is_empty() {
                continue;
            }
            let remainder = strip_dangling_separators(&text[..found.start()]);
            return Some(CodeTail { codes, remainder });
        }
    }

    None
}

/// Extracts a leading comma/underscore-terminated code run.
///
/// Expects uppercased input; returns the comma-separated run without the
/// terminating separator.
pub fn extract_leading_run(content_upper: &str) -> Option<String> {
    let found = LEADING_RUN.find(content_upper)?;
    let run = found
        .as_str()
        .trim()
        .trim_end_matches(['_', ','])
        .trim_end()
        .to_string();
    if run.is_empty() {
        None
    } else {
        Some(run)
    }
}

/// Splits a comma-separated code list into uppercased tokens.
pub fn split_codes(list: &str) -> Vec<String> {
    list.split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect()
}

fn strip_dangling_separators(text: &str) -> Option<String> {
    let stripped = text
        .trim()
        .trim_end_matches([';', ','])
        .trim()
        .to_string();
    if stripped.is_empty() || stripped.chars().all(|c| matches!(c, ';' | ',' | '.')) {
        None
    } else {
        Some(stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_code_tail, extract_leading_run, split_codes};

    #[test]
    fn multiple_codes_at_end_are_extracted() {
        let tail = extract_code_tail("Other information Automatic alarm A01, A02, A03..").unwrap();
        assert_eq!(tail.codes, "A01, A02, A03");
        assert_eq!(
            tail.remainder.as_deref(),
            Some("Other information Automatic alarm")
        );
    }

    #[test]
    fn separator_only_remainder_becomes_none() {
        let tail = extract_code_tail("; A01, A02, A03").unwrap();
        assert_eq!(tail.codes, "A01, A02, A03");
        assert_eq!(tail.remainder, None);
    }

    #[test]
    fn single_code_at_end_is_extracted() {
        let tail = extract_code_tail("Standby at depot B01.").unwrap();
        assert_eq!(tail.codes, "B01");
        assert_eq!(tail.remainder.as_deref(), Some("Standby at depot"));
    }

    #[test]
    fn text_without_codes_yields_none() {
        assert_eq!(extract_code_tail("no codes here at all"), None);
        assert_eq!(extract_code_tail(""), None);
    }

    #[test]
    fn leading_run_stops_at_first_non_code_token() {
        // Mixed letter-block-plus-digit tokens like DEPT01 are left for the
        // body search; the run captures the call-sign prefix.
        let run = extract_leading_run("A01, B02, DEPT01_C_440_REST OF MESSAGE").unwrap();
        assert_eq!(run, "A01, B02");
    }

    #[test]
    fn leading_run_requires_a_terminator() {
        assert_eq!(extract_leading_run("PLAIN TEXT MESSAGE"), None);
    }

    #[test]
    fn split_codes_uppercases_and_trims() {
        assert_eq!(
            split_codes("A01,  b02 , , C03"),
            vec!["A01".to_string(), "B02".to_string(), "C03".to_string()]
        );
    }
}
