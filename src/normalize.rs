//! Pure text cleaning and record validation.

use crate::error::ValidationFailure;
use crate::models::RawRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trim surrounding whitespace and collapse internal runs to one space.
///
/// Case is preserved. Returns `None` when nothing is left, which keeps the
/// function idempotent for whitespace-only input.
///
/// ```ignore
/// assert_eq!(clean_text("  BreakING   News!  ").as_deref(), Some("BreakING News!"));
/// ```
pub fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RUN.replace_all(trimmed, " ").into_owned())
}

/// Check the minimum shape of a record, reporting the first problem found.
///
/// This is purely syntactic: the url only has to start with `http`.
///
/// # Errors
///
/// - [`ValidationFailure::MissingTitle`] if the title is absent or empty
/// - [`ValidationFailure::MissingUrl`] if the url is absent or empty
/// - [`ValidationFailure::NonHttpUrl`] if the url does not start with `http`
pub fn check(record: &RawRecord) -> Result<(), ValidationFailure> {
    let title = record.title.as_deref().unwrap_or_default();
    if title.is_empty() {
        return Err(ValidationFailure::MissingTitle);
    }
    let url = record.url.as_deref().unwrap_or_default();
    if url.is_empty() {
        return Err(ValidationFailure::MissingUrl);
    }
    if !url.starts_with("http") {
        return Err(ValidationFailure::NonHttpUrl);
    }
    Ok(())
}

/// `true` if `record` has a title and an `http` url.
///
/// Whitespace-only titles pass here; they are caught after cleaning.
pub fn validate(record: &RawRecord) -> bool {
    check(record).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: Option<&str>, url: Option<&str>) -> RawRecord {
        RawRecord {
            title: title.map(str::to_string),
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Big   News! ").as_deref(), Some("Big News!"));
        assert_eq!(clean_text("a\t\tb\n\nc").as_deref(), Some("a b c"));
        assert_eq!(clean_text("Hello World").as_deref(), Some("Hello World"));
    }

    #[test]
    fn test_clean_text_preserves_case() {
        assert_eq!(
            clean_text("  BreakING   News!  ").as_deref(),
            Some("BreakING News!")
        );
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text("   \n\t "), None);
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let samples = [
            "",
            " ",
            "plain",
            "  padded  ",
            "many    inner\t\tgaps",
            "\u{00a0}non-breaking\u{2003}spaces\u{00a0}",
            "line\r\nbreaks\n",
        ];
        for s in samples {
            let once = clean_text(s);
            let twice = once.as_deref().and_then(clean_text);
            assert_eq!(twice, once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_validate_boundaries() {
        assert!(validate(&record(Some("T"), Some("http://x"))));
        assert!(validate(&record(Some("T"), Some("https://x"))));
        assert!(!validate(&record(Some(""), Some("http://x"))));
        assert!(!validate(&record(Some("T"), Some("ftp://x"))));
        assert!(!validate(&record(Some("T"), None)));
        assert!(!validate(&record(None, Some("http://x"))));
    }

    #[test]
    fn test_check_reports_reason() {
        assert_eq!(
            check(&record(None, None)),
            Err(ValidationFailure::MissingTitle)
        );
        assert_eq!(
            check(&record(Some("T"), Some(""))),
            Err(ValidationFailure::MissingUrl)
        );
        assert_eq!(
            check(&record(Some("T"), Some("item?id=1"))),
            Err(ValidationFailure::NonHttpUrl)
        );
    }
}
