use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "storyshelf",
    version,
    about = "Read generated story collections in the terminal.",
    long_about = None
)]
pub struct Cli {
    /// Library directory with one folder per book
    #[clap(short, long, value_name = "DIR", global = true)]
    pub library: Option<PathBuf>,

    /// Fetch books from a server instead of a local directory
    #[clap(short, long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Use a specific configuration file
    #[clap(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Keep preferences in memory only
    #[clap(long, global = true)]
    pub no_save: bool,

    /// Increase verbosity (-v, -vv)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug output
    #[clap(long, global = true)]
    pub debug: bool,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the books in the library
    List {
        /// Only show books whose title or description contains this text
        #[clap(short, long)]
        search: Option<String>,

        /// Only show books of this category (sci-fi, romance, crime, fiction)
        #[clap(long)]
        category: Option<String>,
    },
    /// Show a book's overview and chapter list
    Overview {
        /// Book id (folder name) or catalog number
        book: String,
    },
    /// Print a chapter
    Read {
        /// Book id (folder name) or catalog number
        book: String,

        /// Chapter number, starting at 1
        #[clap(long, default_value_t = 1)]
        chapter: usize,
    },
    /// Toggle the bookmark on a chapter
    Bookmark {
        /// Book id (folder name) or catalog number
        book: String,

        /// Chapter number, starting at 1
        #[clap(long)]
        chapter: usize,
    },
    /// Switch to the next font size (small, medium, large)
    FontSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read() {
        let cli = Cli::parse_from(["storyshelf", "read", "book_a", "--chapter", "3", "-vv"]);
        assert_eq!(
            cli.command,
            Some(Command::Read {
                book: "book_a".to_string(),
                chapter: 3
            })
        );
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::parse_from(["storyshelf", "--library", "/tmp/books", "list"]);
        assert_eq!(cli.library, Some(PathBuf::from("/tmp/books")));
        assert_eq!(
            cli.command,
            Some(Command::List {
                search: None,
                category: None
            })
        );
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["storyshelf"]);
        assert!(cli.command.is_none());
        assert!(!cli.no_save);
    }
}
