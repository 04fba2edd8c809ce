/// Marker appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Keep the first `max_chars` characters of `text` and append `...` when
/// anything was cut. Counts `char`s, so multi-byte text is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Leading year of an ISO-like date ("1999-03-30" -> "1999").
/// `None` when the date is empty or starts with a hyphen.
pub fn leading_year(date: &str) -> Option<&str> {
    date.split('-').next().filter(|year| !year.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(250);
        let out = truncate_chars(&text, 200);
        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_short_text_unchanged() {
        let text = "b".repeat(150);
        assert_eq!(truncate_chars(&text, 200), text);
        assert_eq!(truncate_chars(&"c".repeat(200), 200), "c".repeat(200));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    #[test]
    fn test_leading_year() {
        assert_eq!(leading_year("1999-03-30"), Some("1999"));
        assert_eq!(leading_year("2011"), Some("2011"));
        assert_eq!(leading_year(""), None);
        assert_eq!(leading_year("-03-30"), None);
    }
}
