use crate::markup;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DESCRIPTION: &str = "A generated story";
pub const PLACEHOLDER_BODY: &str = "This chapter could not be loaded.";
const SHORT_DESCRIPTION_LIMIT: usize = 120;

/// One entry of the book catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "date")]
    pub creation_date: Option<String>,
    #[serde(default, alias = "chapters")]
    pub chapter_count: Option<usize>,
    pub folder: String,
}

impl BookSummary {
    pub fn from_metadata(folder: &str, metadata: &BookMetadata) -> Self {
        Self {
            id: folder.to_string(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            creation_date: metadata.creation_date.clone(),
            chapter_count: Some(metadata.total_chapters),
            folder: folder.to_string(),
        }
    }

    /// Catalog entry for a folder whose metadata could not be read.
    pub fn from_folder_name(folder: &str) -> Self {
        let title = folder.replace('_', " ").replacen("book about ", "", 1);
        Self {
            id: folder.to_string(),
            title,
            description: DEFAULT_DESCRIPTION.to_string(),
            creation_date: None,
            chapter_count: None,
            folder: folder.to_string(),
        }
    }

    pub fn category(&self) -> Category {
        let title = self.title.to_lowercase();
        if title.contains("space") || title.contains("future") {
            Category::SciFi
        } else if title.contains("love") || title.contains("romance") {
            Category::Romance
        } else if title.contains("crime") || title.contains("thriller") {
            Category::Crime
        } else {
            Category::Fiction
        }
    }

    pub fn short_description(&self) -> String {
        if self.description.is_empty() {
            return "No description available.".to_string();
        }
        if self.description.chars().count() > SHORT_DESCRIPTION_LIMIT {
            let cut: String = self
                .description
                .chars()
                .take(SHORT_DESCRIPTION_LIMIT - 3)
                .collect();
            format!("{}...", cut)
        } else {
            self.description.clone()
        }
    }

    /// Case-insensitive match on title or description. An empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SciFi,
    Romance,
    Crime,
    Fiction,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SciFi => "sci-fi",
            Category::Romance => "romance",
            Category::Crime => "crime",
            Category::Fiction => "fiction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sci-fi" | "scifi" => Ok(Category::SciFi),
            "romance" => Ok(Category::Romance),
            "crime" => Ok(Category::Crime),
            "fiction" => Ok(Category::Fiction),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Book-level information from the `book_info` object of `book_metadata.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookMetadata {
    pub title: String,
    pub description: String,
    pub topic: Option<String>,
    pub creation_date: Option<String>,
    pub last_updated: Option<String>,
    pub status: Option<String>,
    pub total_chapters: usize,
    pub completed_chapters: usize,
    pub estimated_word_count: u64,
    pub estimated_page_count: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataFile {
    pub book_info: BookMetadata,
}

impl BookMetadata {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<MetadataFile>(json).map(|file| file.book_info)
    }

    pub fn created_on(&self) -> Option<NaiveDate> {
        let date = self.creation_date.as_deref()?;
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
    }

    /// Completed chapters for display. Zero means "not tracked" and falls back
    /// to the number of chapters actually loaded.
    pub fn completed_or(&self, loaded: usize) -> usize {
        if self.completed_chapters == 0 {
            loaded
        } else {
            self.completed_chapters
        }
    }

    pub fn progress_percent(&self, loaded: usize) -> u32 {
        if loaded == 0 {
            return 0;
        }
        let completed = self.completed_or(loaded) as f64;
        ((completed / loaded as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub number: usize,
    pub title: String,
    pub content: String,
    pub illustration: Option<String>,
}

impl Chapter {
    /// Builds a chapter from fetched markup. The title comes from the first
    /// heading, the illustration from the first image.
    pub fn from_text(number: usize, content: String, asset_root: &str) -> Self {
        let title = markup::first_heading(&content).unwrap_or_else(|| format!("Chapter {}", number));
        let illustration = markup::illustration(&content, asset_root).map(|image| image.src);
        Self {
            number,
            title,
            content,
            illustration,
        }
    }

    pub fn placeholder(number: usize) -> Self {
        Self {
            number,
            title: format!("Chapter {}", number),
            content: PLACEHOLDER_BODY.to_string(),
            illustration: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.content == PLACEHOLDER_BODY
    }

    /// Title without the redundant "Chapter N: " prefix, as shown in chapter lists.
    pub fn display_name(&self) -> &str {
        let prefix = format!("Chapter {}: ", self.number);
        self.title.strip_prefix(prefix.as_str()).unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn next(self) -> Self {
        match self {
            FontSize::Small => FontSize::Medium,
            FontSize::Medium => FontSize::Large,
            FontSize::Large => FontSize::Small,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            FontSize::Small => 0,
            FontSize::Medium => 1,
            FontSize::Large => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(FontSize::Small),
            1 => Some(FontSize::Medium),
            2 => Some(FontSize::Large),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Overview,
    Reading,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str, description: &str) -> BookSummary {
        BookSummary {
            id: "id".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            creation_date: None,
            chapter_count: Some(3),
            folder: "folder".to_string(),
        }
    }

    #[test]
    fn test_font_size_cycle() {
        let start = FontSize::default();
        assert_eq!(start, FontSize::Medium);
        assert_eq!(start.next(), FontSize::Large);
        assert_eq!(start.next().next(), FontSize::Small);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_font_size_index() {
        for size in [FontSize::Small, FontSize::Medium, FontSize::Large] {
            assert_eq!(FontSize::from_index(size.index()), Some(size));
        }
        assert_eq!(FontSize::from_index(3), None);
    }

    #[test]
    fn test_category_from_title() {
        assert_eq!(
            summary("Space exploration in the distant future", "").category(),
            Category::SciFi
        );
        assert_eq!(summary("I love you Maya", "").category(), Category::Romance);
        assert_eq!(
            summary("An Indian crime thriller", "").category(),
            Category::Crime
        );
        assert_eq!(summary("The Lighthouse", "").category(), Category::Fiction);
        assert_eq!("Sci-Fi".parse::<Category>(), Ok(Category::SciFi));
        assert!("poetry".parse::<Category>().is_err());
    }

    #[test]
    fn test_short_description() {
        let long = "x".repeat(130);
        let short = summary("t", &long).short_description();
        assert_eq!(short.chars().count(), 120);
        assert!(short.ends_with("..."));

        assert_eq!(summary("t", "brief").short_description(), "brief");
        assert_eq!(
            summary("t", "").short_description(),
            "No description available."
        );
    }

    #[test]
    fn test_summary_from_folder_name() {
        let summary = BookSummary::from_folder_name("book_about_dark_romance");
        assert_eq!(summary.title, "dark romance");
        assert_eq!(summary.description, DEFAULT_DESCRIPTION);
        assert_eq!(summary.chapter_count, None);
        assert_eq!(summary.id, "book_about_dark_romance");
    }

    #[test]
    fn test_metadata_from_json() {
        let json = r#"{
            "book_info": {
                "title": "Lost in Your Memories",
                "description": "A love story",
                "topic": "romance",
                "creation_date": "2025-05-11",
                "status": "complete",
                "total_chapters": 5,
                "completed_chapters": 4,
                "estimated_word_count": 12000,
                "estimated_page_count": 48.0
            },
            "chapters": []
        }"#;
        let metadata = BookMetadata::from_json(json).unwrap();
        assert_eq!(metadata.title, "Lost in Your Memories");
        assert_eq!(metadata.total_chapters, 5);
        assert_eq!(
            metadata.created_on(),
            NaiveDate::from_ymd_opt(2025, 5, 11)
        );
        assert_eq!(metadata.progress_percent(5), 80);
        assert_eq!(metadata.last_updated, None);
    }

    #[test]
    fn test_progress_falls_back_to_loaded_count() {
        let metadata = BookMetadata {
            total_chapters: 3,
            ..Default::default()
        };
        assert_eq!(metadata.completed_or(3), 3);
        assert_eq!(metadata.progress_percent(3), 100);
        assert_eq!(metadata.progress_percent(0), 0);
    }

    #[test]
    fn test_chapter_from_text() {
        let text = "# Chapter 1: Arrival\n\n![Chapter 1 Illustration](illustrations/one.png)\n\nHello.";
        let chapter = Chapter::from_text(1, text.to_string(), "books/b");
        assert_eq!(chapter.title, "Chapter 1: Arrival");
        assert_eq!(
            chapter.illustration.as_deref(),
            Some("books/b/illustrations/one.png")
        );

        let untitled = Chapter::from_text(3, "Just prose.".to_string(), "books/b");
        assert_eq!(untitled.title, "Chapter 3");
        assert_eq!(untitled.illustration, None);
    }

    #[test]
    fn test_chapter_display_name() {
        let chapter = Chapter {
            number: 2,
            title: "Chapter 2: The Storm".to_string(),
            content: String::new(),
            illustration: None,
        };
        assert_eq!(chapter.display_name(), "The Storm");
        assert_eq!(Chapter::placeholder(4).display_name(), "Chapter 4");
        assert!(Chapter::placeholder(4).is_placeholder());
    }

    #[test]
    fn test_summary_matches() {
        let book = summary("Dark Romance", "A tale of shadows");
        assert!(book.matches(""));
        assert!(book.matches("ROMANCE"));
        assert!(book.matches("shadows"));
        assert!(!book.matches("space"));
    }
}
