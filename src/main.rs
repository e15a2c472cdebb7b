use storyshelf::{
    cli::{Cli, Command},
    config::Config,
    logging,
    models::{BookSummary, Category},
    session::ReadingSession,
    settings::Settings,
    source::{ContentSource, FsContentSource, HttpContentSource},
    state::{MemoryStore, PreferenceStore, SqliteStore},
    ui::{reader::Reader, windows::library::LibraryWindow},
};

use clap::Parser;
use eyre::{Result, eyre};
use std::io::IsTerminal;

type Session = ReadingSession<Box<dyn ContentSource>, Box<dyn PreferenceStore>>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.debug));

    let mut settings = load_settings(&cli);
    if let Some(library) = &cli.library {
        settings.library_root = library.to_string_lossy().into_owned();
        settings.base_url = None;
    }
    if let Some(url) = &cli.url {
        settings.base_url = Some(url.clone());
    }

    let mut session = ReadingSession::new(open_source(&settings)?, open_store(cli.no_save))
        .with_fetch_workers(settings.fetch_workers);

    match cli.command.clone().unwrap_or(Command::List {
        search: None,
        category: None,
    }) {
        Command::List { search, category } => list_books(&mut session, search, category),
        Command::Overview { book } => {
            let book = find_book(&mut session, &book)?;
            session.open_book(&book)?;
            print_page(&session, &settings);
            Ok(())
        }
        Command::Read { book, chapter } => {
            let book = find_book(&mut session, &book)?;
            session.open_book(&book)?;
            select(&mut session, chapter)?;
            print_page(&session, &settings);
            Ok(())
        }
        Command::Bookmark { book, chapter } => {
            let book = find_book(&mut session, &book)?;
            session.open_book(&book)?;
            select(&mut session, chapter)?;
            if session.toggle_bookmark() {
                println!("Bookmarked chapter {} of '{}'", chapter, book.title);
            } else {
                println!("Removed bookmark from chapter {} of '{}'", chapter, book.title);
            }
            Ok(())
        }
        Command::FontSize => {
            let size = session.cycle_font_size();
            println!("Font size: {}", size.as_str());
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> Settings {
    let config = match &cli.config {
        Some(path) => Config::load_from(path.clone()),
        None => Config::new(),
    };
    match config {
        Ok(config) => config.settings,
        Err(err) => {
            eprintln!("Warning: Could not load configuration: {}", err);
            eprintln!("Starting with default settings");
            Settings::default()
        }
    }
}

fn open_source(settings: &Settings) -> Result<Box<dyn ContentSource>> {
    match &settings.base_url {
        Some(url) => Ok(Box::new(HttpContentSource::new(url)?)),
        None => Ok(Box::new(FsContentSource::new(&settings.library_root))),
    }
}

fn open_store(no_save: bool) -> Box<dyn PreferenceStore> {
    if no_save {
        return Box::new(MemoryStore::new());
    }
    match SqliteStore::new() {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::warn!("Preferences will not be saved: {}", err);
            Box::new(MemoryStore::new())
        }
    }
}

fn list_books(session: &mut Session, search: Option<String>, category: Option<String>) -> Result<()> {
    let category = category
        .map(|c| c.parse::<Category>().map_err(|e| eyre!(e)))
        .transpose()?;
    let books = session.list_books()?;
    let entries = LibraryWindow::filter(&books, search.as_deref(), category);
    for line in LibraryWindow::render(&entries) {
        println!("{}", line);
    }
    Ok(())
}

/// Resolves a book by id or by its 1-based position in the catalog.
fn find_book(session: &mut Session, key: &str) -> Result<BookSummary> {
    let books = session.list_books()?;
    if let Some(book) = books.iter().find(|book| book.id == key) {
        return Ok(book.clone());
    }
    key.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| books.get(i).cloned())
        .ok_or_else(|| eyre!("No book named '{}' in the library", key))
}

fn select(session: &mut Session, chapter: usize) -> Result<()> {
    let index = chapter
        .checked_sub(1)
        .ok_or_else(|| eyre!("Chapters are numbered from 1"))?;
    session
        .select_chapter(index)
        .map_err(|_| eyre!("Chapter {} not found (book has {} chapters)", chapter, session.chapter_count()))
}

fn print_page(session: &Session, settings: &Settings) {
    let reader = Reader::new(settings).with_styles(std::io::stdout().is_terminal());
    for line in reader.render(&session.snapshot(), &session.bookmarks()) {
        println!("{}", line);
    }
}
