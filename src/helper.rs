// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// First line of `content`, cut to `max_chars` characters
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_and_drops_empty() {
        assert_eq!(
            parse_tags(Some(" work, ,ideas,".to_string())),
            vec!["work", "ideas"]
        );
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("\n  \nhello\nworld", 10), "hello");
        assert_eq!(content_preview("abcdefghij", 4), "abcd...");
        assert_eq!(content_preview("", 4), "");
    }
}
