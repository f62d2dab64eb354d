pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Local date as YYYY-MM-DD, used to prefill a package's play date.
pub(crate) fn today_iso_local() -> String {
    // Use system local timezone (browser runtime).
    let d = js_sys::Date::new_0();
    let y = d.get_full_year();
    let m = d.get_month() + 1;
    let day = d.get_date();
    format!("{:04}-{:02}-{:02}", y, m, day)
}

/// Clamp a parsed difficulty value into the 1..=5 range the backend accepts.
pub(crate) fn clamp_difficulty(raw: i32) -> i32 {
    raw.clamp(1, 5)
}

/// Trimmed view of a required text field; `None` when effectively empty.
/// Forms use this to block a save instead of sending a blank title/name.
pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_difficulty_bounds() {
        assert_eq!(clamp_difficulty(0), 1);
        assert_eq!(clamp_difficulty(3), 3);
        assert_eq!(clamp_difficulty(9), 5);
    }

    #[test]
    fn test_non_blank_rejects_whitespace_only() {
        assert_eq!(non_blank("  Round 1 "), Some("Round 1"));
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
    }
}
