use similar::TextDiff;

/// Render a unified diff between two strings
pub fn render_unified_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    diff.unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_change_shows_up() {
        let diff = render_unified_diff("a\r\nb\n", "a\nb\n", "a/README.md", "b/README.md");
        assert!(diff.starts_with("--- a/README.md\n+++ b/README.md\n"), "{diff}");
        assert!(diff.contains("-a\r\n"));
        assert!(diff.contains("+a\n"));
    }

    #[test]
    fn test_identical_is_empty() {
        assert_eq!(render_unified_diff("a\n", "a\n", "a", "b"), "");
    }
}
