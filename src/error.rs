use thiserror::Error;

/// Failures a reading session can run into.
///
/// `ChapterUnavailable` never leaves the session: a chapter that cannot be
/// fetched is replaced by a placeholder. `OutOfRangeNavigation` is handed back
/// to the caller but is not shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    #[error("Unable to load books: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to load book details for '{book}': {reason}")]
    MetadataUnavailable { book: String, reason: String },

    #[error("Failed to fetch chapter {number} of '{book}': {reason}")]
    ChapterUnavailable {
        book: String,
        number: usize,
        reason: String,
    },

    #[error("Chapter index {requested} is out of range (book has {available} chapters)")]
    OutOfRangeNavigation { requested: usize, available: usize },
}

impl ReaderError {
    /// Whether the presentation surface should show this error to the reader.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ReaderError::CatalogUnavailable(_) | ReaderError::MetadataUnavailable { .. }
        )
    }
}
