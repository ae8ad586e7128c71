/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new local identifier (UUID v4)
pub fn new_local_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Truncate `text` to at most `max_chars` characters, appending `…` when cut
pub fn snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("  short  ", 10), "short");
        assert_eq!(snippet("abcdefghij", 4), "abcd…");
        // multi-byte characters are counted, not bytes
        assert_eq!(snippet("ação ação", 4), "ação…");
    }

    #[test]
    fn test_new_local_id_unique() {
        assert_ne!(new_local_id(), new_local_id());
    }
}
