//! Lenient string helpers for request input.
//!
//! Request parameters arrive as loose strings. A missing value and a
//! whitespace-only value are treated the same, and numbers that fail to parse
//! fall back to a default instead of failing the request.

/// True for empty or whitespace-only strings.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Keeps `value` only when it holds non-whitespace text. The text itself is
/// returned unchanged.
pub fn non_blank<S: AsRef<str>>(value: Option<S>) -> Option<S> {
    value.filter(|v| !is_blank(v.as_ref()))
}

/// Parses a trimmed integer; blank or malformed input yields `None`.
pub fn parse_int(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

pub fn parse_int_or(s: Option<&str>, default: i32) -> i32 {
    s.and_then(parse_int).unwrap_or(default)
}

pub fn parse_long_or(s: Option<&str>, default: i64) -> i64 {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parses every entry, dropping the ones that are not integers.
pub fn parse_int_list<S: AsRef<str>>(values: &[S]) -> Vec<i32> {
    values
        .iter()
        .filter_map(|v| parse_int(v.as_ref()))
        .collect()
}

/// Wraps a trimmed value in `%` wildcards for a `LIKE` comparison.
pub fn like_pattern(s: &str) -> String {
    format!("%{}%", s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("Li")), Some("Li"));
        assert_eq!(non_blank(Some(" Li ")), Some(" Li "));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank::<&str>(None), None);
        assert_eq!(non_blank(Some(String::new())), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 7 "), Some(7));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int("99999999999"), None);
    }

    #[test]
    fn test_parse_with_defaults() {
        assert_eq!(parse_int_or(Some("3"), 1), 3);
        assert_eq!(parse_int_or(Some("x"), 1), 1);
        assert_eq!(parse_int_or(None, 10), 10);
        assert_eq!(parse_long_or(Some(" 12 "), 0), 12);
        assert_eq!(parse_long_or(Some(""), 5), 5);
    }

    #[test]
    fn test_parse_int_list_drops_garbage() {
        assert_eq!(parse_int_list(&["1", "x", " 3", ""]), vec![1, 3]);
        assert!(parse_int_list::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("Li"), "%Li%");
        assert_eq!(like_pattern("  Li "), "%Li%");
        assert_eq!(like_pattern(""), "%%");
    }
}
