pub mod projects;
pub mod search;
pub mod sessions;
pub mod show;
pub mod trash;

/// Truncate for table display, first line only.
pub(crate) fn ellipsize(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::ellipsize;

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("exactly-ten", 11), "exactly-ten");
        assert_eq!(ellipsize("a very long title indeed", 10), "a very ...");
        assert_eq!(ellipsize("first\nsecond", 20), "first");
    }
}
