// ============================================================================
// Log Sanitization - CRM-supplied values are untrusted input
// ============================================================================
//
// Account names, ids and emails arrive from an external system and end up in
// log lines. Newlines and ANSI escapes would let a record forge log entries,
// so everything coming from a record goes through `sanitize_for_log` first.
//
// ============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters kept from a logged value.
const MAX_LOG_LENGTH: usize = 200;

static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI escape pattern is valid")
});

/// Strips ANSI escapes and control characters, flattens line breaks and
/// truncates to `MAX_LOG_LENGTH` characters.
pub fn sanitize_for_log(input: &str) -> String {
    let no_ansi = ANSI_ESCAPE_REGEX.replace_all(input, "");

    let cleaned: String = no_ansi
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().count() > MAX_LOG_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_LOG_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

pub fn sanitize_option_for_log(input: Option<&str>) -> String {
    match input {
        Some(value) => sanitize_for_log(value),
        None => "None".to_string(),
    }
}

/// Keeps the first character of the local part and the domain: `j***@acme.com`.
pub fn mask_email_for_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            sanitize_for_log(&format!("{}***@{}", first, domain))
        }
        None => "[INVALID-EMAIL]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_flattened() {
        assert_eq!(
            sanitize_for_log("ACME\nINFO: Fake log entry"),
            "ACME INFO: Fake log entry"
        );
        assert_eq!(sanitize_for_log("a\r\nb\tc"), "a  b c");
    }

    #[test]
    fn test_ansi_and_control_removed() {
        assert_eq!(sanitize_for_log("test\x1b[31mred\x1b[0m"), "testred");
        assert_eq!(sanitize_for_log("nul\x00byte\x7f"), "nulbyte");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long_name = "ü".repeat(300);
        let sanitized = sanitize_for_log(&long_name);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), MAX_LOG_LENGTH + 3);
    }

    #[test]
    fn test_option_and_email() {
        assert_eq!(sanitize_option_for_log(None), "None");
        assert_eq!(sanitize_option_for_log(Some("x\ny")), "x y");
        assert_eq!(mask_email_for_log("john@acme.com"), "j***@acme.com");
        assert_eq!(mask_email_for_log("not-an-email"), "[INVALID-EMAIL]");
    }
}
