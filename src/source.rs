use crate::error::ReaderError;
use crate::models::{BookMetadata, BookSummary};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const METADATA_FILE: &str = "book_metadata.json";
pub const CATALOG_ENDPOINT: &str = "books-structure";

/// Where books come from. Implementations must be shareable across the
/// chapter fetch workers.
pub trait ContentSource: Sync {
    fn list_books(&self) -> Result<Vec<BookSummary>, ReaderError>;
    fn book_metadata(&self, book: &BookSummary) -> Result<BookMetadata, ReaderError>;
    fn chapter_text(&self, book: &BookSummary, number: usize) -> Result<String, ReaderError>;

    /// Base that relative illustration paths of this book resolve against.
    fn asset_root(&self, book: &BookSummary) -> String;
}

impl<T: ContentSource + ?Sized> ContentSource for Box<T> {
    fn list_books(&self) -> Result<Vec<BookSummary>, ReaderError> {
        (**self).list_books()
    }

    fn book_metadata(&self, book: &BookSummary) -> Result<BookMetadata, ReaderError> {
        (**self).book_metadata(book)
    }

    fn chapter_text(&self, book: &BookSummary, number: usize) -> Result<String, ReaderError> {
        (**self).chapter_text(book, number)
    }

    fn asset_root(&self, book: &BookSummary) -> String {
        (**self).asset_root(book)
    }
}

pub fn chapter_file_name(number: usize) -> String {
    format!("chapter_{:02}_chapter_{}.md", number, number)
}

/// Parses the `books-structure` listing, which names dates and chapter counts
/// `date` and `chapters`.
pub fn parse_catalog(body: &str) -> serde_json::Result<Vec<BookSummary>> {
    serde_json::from_str(body)
}

/// Books stored as folders under a library directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn book_dir(&self, book: &BookSummary) -> PathBuf {
        self.root.join(&book.folder)
    }

    fn read_metadata(&self, folder: &str) -> Result<BookMetadata, String> {
        let path = self.root.join(folder).join(METADATA_FILE);
        let json = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
        BookMetadata::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

impl ContentSource for FsContentSource {
    fn list_books(&self) -> Result<Vec<BookSummary>, ReaderError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            ReaderError::CatalogUnavailable(format!("{}: {}", self.root.display(), e))
        })?;

        let mut folders: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        folders.sort();

        let books = folders
            .iter()
            .map(|folder| match self.read_metadata(folder) {
                Ok(metadata) => BookSummary::from_metadata(folder, &metadata),
                Err(err) => {
                    log::warn!("Error fetching {}: {}", folder, err);
                    BookSummary::from_folder_name(folder)
                }
            })
            .collect();
        Ok(books)
    }

    fn book_metadata(&self, book: &BookSummary) -> Result<BookMetadata, ReaderError> {
        self.read_metadata(&book.folder)
            .map_err(|reason| ReaderError::MetadataUnavailable {
                book: book.id.clone(),
                reason,
            })
    }

    fn chapter_text(&self, book: &BookSummary, number: usize) -> Result<String, ReaderError> {
        let path = self.book_dir(book).join(chapter_file_name(number));
        fs::read_to_string(&path).map_err(|e| ReaderError::ChapterUnavailable {
            book: book.id.clone(),
            number,
            reason: format!("{}: {}", path.display(), e),
        })
    }

    fn asset_root(&self, book: &BookSummary) -> String {
        self.book_dir(book).to_string_lossy().into_owned()
    }
}

/// The same folder layout served over HTTP, with the catalog published as a
/// JSON list at `<base>/books-structure`.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpContentSource {
    pub fn new(base_url: &str) -> eyre::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn book_url(&self, book: &BookSummary) -> String {
        format!("{}/books/{}", self.base_url, book.folder)
    }

    fn get_text(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("{} returned {}", url, response.status()));
        }
        response.text().map_err(|e| e.to_string())
    }
}

impl ContentSource for HttpContentSource {
    fn list_books(&self) -> Result<Vec<BookSummary>, ReaderError> {
        let url = format!("{}/{}", self.base_url, CATALOG_ENDPOINT);
        let body = self.get_text(&url).map_err(ReaderError::CatalogUnavailable)?;
        parse_catalog(&body).map_err(|e| ReaderError::CatalogUnavailable(format!("{}: {}", url, e)))
    }

    fn book_metadata(&self, book: &BookSummary) -> Result<BookMetadata, ReaderError> {
        let url = format!("{}/{}", self.book_url(book), METADATA_FILE);
        let metadata_error = |reason: String| ReaderError::MetadataUnavailable {
            book: book.id.clone(),
            reason,
        };
        let body = self.get_text(&url).map_err(metadata_error)?;
        BookMetadata::from_json(&body).map_err(|e| metadata_error(e.to_string()))
    }

    fn chapter_text(&self, book: &BookSummary, number: usize) -> Result<String, ReaderError> {
        let url = format!("{}/{}", self.book_url(book), chapter_file_name(number));
        self.get_text(&url)
            .map_err(|reason| ReaderError::ChapterUnavailable {
                book: book.id.clone(),
                number,
                reason,
            })
    }

    fn asset_root(&self, book: &BookSummary) -> String {
        self.book_url(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_book(root: &Path, folder: &str, title: &str, chapters: usize) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        let metadata = serde_json::json!({
            "book_info": {
                "title": title,
                "description": "desc",
                "creation_date": "2025-04-12",
                "total_chapters": chapters,
            }
        });
        fs::write(dir.join(METADATA_FILE), metadata.to_string()).unwrap();
        for n in 1..=chapters {
            fs::write(dir.join(chapter_file_name(n)), format!("# Chapter {}\n\nText", n)).unwrap();
        }
    }

    #[test]
    fn test_chapter_file_name() {
        assert_eq!(chapter_file_name(1), "chapter_01_chapter_1.md");
        assert_eq!(chapter_file_name(12), "chapter_12_chapter_12.md");
    }

    #[test]
    fn test_fs_list_books() {
        let dir = TempDir::new().unwrap();
        write_book(dir.path(), "book_b", "Beta", 2);
        write_book(dir.path(), "book_a", "Alpha", 3);
        fs::create_dir_all(dir.path().join("book_about_broken_thing")).unwrap();
        fs::write(dir.path().join("stray.txt"), "not a book").unwrap();

        let source = FsContentSource::new(dir.path());
        let books = source.list_books().unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "broken thing", "Beta"]);
        assert_eq!(books[0].chapter_count, Some(3));
        assert_eq!(books[1].chapter_count, None);
    }

    #[test]
    fn test_fs_missing_root() {
        let dir = TempDir::new().unwrap();
        let source = FsContentSource::new(dir.path().join("nope"));
        assert!(matches!(
            source.list_books(),
            Err(ReaderError::CatalogUnavailable(_))
        ));
    }

    #[test]
    fn test_fs_metadata_and_chapters() {
        let dir = TempDir::new().unwrap();
        write_book(dir.path(), "book_a", "Alpha", 2);
        let source = FsContentSource::new(dir.path());
        let book = BookSummary::from_folder_name("book_a");

        let metadata = source.book_metadata(&book).unwrap();
        assert_eq!(metadata.title, "Alpha");
        assert_eq!(source.chapter_text(&book, 2).unwrap(), "# Chapter 2\n\nText");
        assert!(matches!(
            source.chapter_text(&book, 3),
            Err(ReaderError::ChapterUnavailable { number: 3, .. })
        ));
        assert!(source.asset_root(&book).ends_with("book_a"));

        let missing = BookSummary::from_folder_name("book_missing");
        assert!(matches!(
            source.book_metadata(&missing),
            Err(ReaderError::MetadataUnavailable { .. })
        ));
    }

    #[test]
    fn test_parse_catalog() {
        let body = r#"[
            {"id": "book_about_dark_romance", "title": "Dark Romance",
             "description": "Letters at night", "date": "2025-04-12",
             "chapters": 7, "folder": "book_about_dark_romance"},
            {"id": "book_about_space", "title": "Space", "folder": "book_about_space"}
        ]"#;
        let books = parse_catalog(body).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].creation_date.as_deref(), Some("2025-04-12"));
        assert_eq!(books[0].chapter_count, Some(7));
        assert_eq!(books[1].description, "");
        assert_eq!(books[1].chapter_count, None);

        assert!(parse_catalog(r#"{"books": []}"#).is_err());
    }

    #[test]
    fn test_http_urls() {
        let source = HttpContentSource::new("http://localhost:8000/").unwrap();
        let book = BookSummary::from_folder_name("book_about_dark_romance");
        assert_eq!(
            source.asset_root(&book),
            "http://localhost:8000/books/book_about_dark_romance"
        );
    }
}
