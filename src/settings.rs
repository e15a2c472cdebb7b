use crate::models::FontSize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one folder per book.
    pub library_root: String,
    /// When set, books are fetched over HTTP instead of from `library_root`.
    pub base_url: Option<String>,
    pub fetch_workers: usize,
    pub width_small: usize,
    pub width_medium: usize,
    pub width_large: usize,
    pub show_illustrations: bool,
    pub hyphenate: bool,
}

impl Settings {
    pub fn merge(&mut self, other: Self) {
        self.library_root = other.library_root;
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        self.fetch_workers = other.fetch_workers;
        self.width_small = other.width_small;
        self.width_medium = other.width_medium;
        self.width_large = other.width_large;
        self.show_illustrations = other.show_illustrations;
        self.hyphenate = other.hyphenate;
    }

    /// Text width used for a font size. Larger type fits fewer columns.
    pub fn width_for(&self, font_size: FontSize) -> usize {
        match font_size {
            FontSize::Small => self.width_small,
            FontSize::Medium => self.width_medium,
            FontSize::Large => self.width_large,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_root: "books".to_string(),
            base_url: None,
            fetch_workers: 8,
            width_small: 100,
            width_medium: 80,
            width_large: 60,
            show_illustrations: true,
            hyphenate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.library_root, "books");
        assert_eq!(settings.base_url, None);
        assert_eq!(settings.fetch_workers, 8);
        assert!(settings.show_illustrations);
    }

    #[test]
    fn test_width_shrinks_with_font_size() {
        let settings = Settings::default();
        assert!(settings.width_for(FontSize::Small) > settings.width_for(FontSize::Medium));
        assert!(settings.width_for(FontSize::Medium) > settings.width_for(FontSize::Large));
    }

    #[test]
    fn test_settings_merge() {
        let mut settings = Settings::default();
        settings.base_url = Some("http://localhost:8000".to_string());

        let other = Settings {
            library_root: "/srv/books".to_string(),
            fetch_workers: 2,
            show_illustrations: false,
            ..Settings::default()
        };
        settings.merge(other);

        assert_eq!(settings.library_root, "/srv/books");
        assert_eq!(settings.fetch_workers, 2);
        assert!(!settings.show_illustrations);
        // An unset base url does not clear a configured one.
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{"width_medium": 72}"#).unwrap();
        assert_eq!(settings.width_medium, 72);
        assert_eq!(settings.width_small, 100);
    }
}
