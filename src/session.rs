use crate::error::ReaderError;
use crate::markup::{self, StructuredContent};
use crate::models::{BookMetadata, BookSummary, Chapter, FontSize, SessionState};
use crate::source::ContentSource;
use crate::state::PreferenceStore;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

pub const FONT_SIZE_KEY: &str = "font_size";
pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const DEFAULT_FETCH_WORKERS: usize = 8;

type Bookmarks = BTreeMap<String, BTreeSet<usize>>;

/// Notifications for presentation surfaces. `generation` identifies the
/// `open_book` call that produced the event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loading { generation: u64, book: BookSummary },
    Loaded { generation: u64, book_id: String, chapters: usize },
    Failed { generation: u64, message: String },
}

/// A book with all of its chapters fetched.
#[derive(Debug, Clone)]
pub struct OpenBook {
    pub summary: BookSummary,
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
    pub asset_root: String,
}

/// Read-only view of the session for rendering.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub state: SessionState,
    pub book: Option<&'a OpenBook>,
    pub chapter_index: usize,
    pub chapter: Option<&'a Chapter>,
    pub content: Option<StructuredContent>,
    pub font_size: FontSize,
    pub bookmarked: bool,
    pub has_prev: bool,
    pub has_next: bool,
    pub error: Option<&'a ReaderError>,
}

pub struct ReadingSession<C, P> {
    source: C,
    store: P,
    state: SessionState,
    book: Option<OpenBook>,
    current: usize,
    font_size: FontSize,
    bookmarks: Bookmarks,
    error: Option<ReaderError>,
    generation: u64,
    fetch_workers: usize,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl<C: ContentSource, P: PreferenceStore> ReadingSession<C, P> {
    /// Creates a closed session, restoring font size and bookmarks from `store`.
    pub fn new(source: C, store: P) -> Self {
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|value| value.trim().parse::<u8>().ok())
            .and_then(FontSize::from_index)
            .unwrap_or_default();

        let bookmarks = match store.get(BOOKMARKS_KEY) {
            Some(json) => serde_json::from_str::<Bookmarks>(&json).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable bookmarks: {}", err);
                Bookmarks::new()
            }),
            None => Bookmarks::new(),
        };

        Self {
            source,
            store,
            state: SessionState::Closed,
            book: None,
            current: 0,
            font_size,
            bookmarks,
            error: None,
            generation: 0,
            fetch_workers: DEFAULT_FETCH_WORKERS,
            subscribers: Vec::new(),
        }
    }

    pub fn with_fetch_workers(mut self, workers: usize) -> Self {
        self.fetch_workers = workers.max(1);
        self
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn list_books(&mut self) -> Result<Vec<BookSummary>, ReaderError> {
        match self.source.list_books() {
            Ok(books) => {
                if matches!(self.error, Some(ReaderError::CatalogUnavailable(_))) {
                    self.error = None;
                }
                Ok(books)
            }
            Err(err) => {
                log::error!("Error fetching books: {}", err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Loads `book` and shows its overview. Chapters that fail to load are
    /// replaced by placeholders; only a metadata failure fails the call, in
    /// which case the session stays closed.
    pub fn open_book(&mut self, book: &BookSummary) -> Result<(), ReaderError> {
        self.generation += 1;
        let generation = self.generation;
        self.book = None;
        self.state = SessionState::Closed;
        self.current = 0;
        self.error = None;
        self.emit(SessionEvent::Loading {
            generation,
            book: book.clone(),
        });
        log::info!("Loading book content for '{}'", book.id);

        let metadata = match self.source.book_metadata(book) {
            Ok(metadata) => metadata,
            Err(err) => {
                log::error!("Error fetching book details: {}", err);
                self.error = Some(err.clone());
                self.emit(SessionEvent::Failed {
                    generation,
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        let asset_root = self.source.asset_root(book);
        let chapters = fetch_chapters(
            &self.source,
            book,
            metadata.total_chapters,
            &asset_root,
            self.fetch_workers,
        );
        let count = chapters.len();

        self.book = Some(OpenBook {
            summary: book.clone(),
            metadata,
            chapters,
            asset_root,
        });
        self.state = SessionState::Overview;
        self.emit(SessionEvent::Loaded {
            generation,
            book_id: book.id.clone(),
            chapters: count,
        });
        log::debug!("Opened '{}' with {} chapters", book.id, count);
        Ok(())
    }

    pub fn start_reading(&mut self) -> Result<(), ReaderError> {
        self.select_chapter(0)
    }

    /// Jumps to chapter `index` (0-based). Out-of-range requests leave the
    /// position unchanged.
    pub fn select_chapter(&mut self, index: usize) -> Result<(), ReaderError> {
        let available = self.chapter_count();
        if self.book.is_none() || index >= available {
            log::debug!("Rejected chapter {} of {}", index, available);
            return Err(ReaderError::OutOfRangeNavigation {
                requested: index,
                available,
            });
        }
        self.current = index;
        self.state = SessionState::Reading;
        Ok(())
    }

    /// Moves to the next chapter. Returns false at the last chapter.
    pub fn next_chapter(&mut self) -> bool {
        self.current + 1 < self.chapter_count() && self.select_chapter(self.current + 1).is_ok()
    }

    /// Moves to the previous chapter. Returns false at the first chapter.
    pub fn prev_chapter(&mut self) -> bool {
        self.current > 0 && self.select_chapter(self.current - 1).is_ok()
    }

    pub fn show_overview(&mut self) {
        if self.book.is_some() {
            self.state = SessionState::Overview;
        }
    }

    /// Drops the open book. Preferences are left untouched.
    pub fn close(&mut self) {
        self.book = None;
        self.state = SessionState::Closed;
        self.current = 0;
        self.error = None;
    }

    /// Flips the bookmark on the current chapter and persists it. Returns the
    /// new bookmark state.
    pub fn toggle_bookmark(&mut self) -> bool {
        let Some(book) = &self.book else {
            return false;
        };
        if self.current >= book.chapters.len() {
            return false;
        }

        let id = book.summary.id.clone();
        let marks = self.bookmarks.entry(id.clone()).or_default();
        let bookmarked = if marks.remove(&self.current) {
            false
        } else {
            marks.insert(self.current);
            true
        };
        if marks.is_empty() {
            self.bookmarks.remove(&id);
        }

        self.persist_bookmarks();
        bookmarked
    }

    pub fn is_bookmarked(&self) -> bool {
        self.book.as_ref().is_some_and(|book| {
            self.bookmarks
                .get(&book.summary.id)
                .is_some_and(|marks| marks.contains(&self.current))
        })
    }

    /// Bookmarked chapter indices of the open book that still exist.
    pub fn bookmarks(&self) -> Vec<usize> {
        let Some(book) = &self.book else {
            return Vec::new();
        };
        self.bookmarks
            .get(&book.summary.id)
            .map(|marks| {
                marks
                    .iter()
                    .copied()
                    .filter(|&index| index < book.chapters.len())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cycle_font_size(&mut self) -> FontSize {
        self.font_size = self.font_size.next();
        let value = self.font_size.index().to_string();
        if let Err(err) = self.store.set(FONT_SIZE_KEY, &value) {
            log::warn!("Could not save font size: {}", err);
        }
        self.font_size
    }

    fn persist_bookmarks(&mut self) {
        let result = serde_json::to_string(&self.bookmarks)
            .map_err(eyre::Report::from)
            .and_then(|json| self.store.set(BOOKMARKS_KEY, &json));
        if let Err(err) = result {
            log::warn!("Could not save bookmarks: {}", err);
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn book(&self) -> Option<&OpenBook> {
        self.book.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.book.as_ref()?.chapters.get(self.current)
    }

    pub fn chapter_count(&self) -> usize {
        self.book.as_ref().map_or(0, |book| book.chapters.len())
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn error(&self) -> Option<&ReaderError> {
        self.error.as_ref()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn into_parts(self) -> (C, P) {
        (self.source, self.store)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let chapter = match self.state {
            SessionState::Reading => self.current_chapter(),
            _ => None,
        };
        let content = match (&self.book, chapter) {
            (Some(book), Some(chapter)) => {
                Some(markup::render_in_book(&chapter.content, &book.asset_root))
            }
            _ => None,
        };
        let count = self.chapter_count();

        Snapshot {
            state: self.state,
            book: self.book.as_ref(),
            chapter_index: self.current,
            chapter,
            content,
            font_size: self.font_size,
            bookmarked: self.is_bookmarked(),
            has_prev: count > 0 && self.current > 0,
            has_next: self.current + 1 < count,
            error: self.error.as_ref(),
        }
    }
}

/// Fetches chapters `1..=total` on up to `workers` threads and returns them in
/// chapter order, substituting placeholders for failures.
fn fetch_chapters<C: ContentSource>(
    source: &C,
    book: &BookSummary,
    total: usize,
    asset_root: &str,
    workers: usize,
) -> Vec<Chapter> {
    if total == 0 {
        return Vec::new();
    }

    let next = AtomicUsize::new(1);
    let (tx, rx) = mpsc::channel();
    thread::scope(|scope| {
        for _ in 0..workers.clamp(1, total) {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let number = next.fetch_add(1, Ordering::Relaxed);
                    if number > total {
                        break;
                    }
                    let result = source.chapter_text(book, number);
                    if tx.send((number, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut chapters: Vec<Chapter> = rx
        .into_iter()
        .map(|(number, result)| match result {
            Ok(text) => Chapter::from_text(number, text, asset_root),
            Err(err) => {
                log::warn!("{}", err);
                Chapter::placeholder(number)
            }
        })
        .collect();
    chapters.sort_by_key(|chapter| chapter.number);
    chapters
}
