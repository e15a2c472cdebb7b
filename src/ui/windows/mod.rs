pub mod library;
pub mod metadata;
pub mod toc;

/// Formats a `YYYY-MM-DD` date for display, passing other strings through.
pub fn display_date(raw: Option<&str>) -> String {
    match raw {
        Some(date) => match chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
            Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
            Err(_) => date.to_string(),
        },
        None => "Unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(Some("2025-04-12")), "April 12, 2025");
        assert_eq!(display_date(Some("Unknown")), "Unknown");
        assert_eq!(display_date(None), "Unknown date");
    }
}
