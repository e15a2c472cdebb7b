pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod markup;
pub mod models;
pub mod session;
pub mod settings;
pub mod source;
pub mod state;
pub mod ui;

pub use error::ReaderError;
pub use markup::{StructuredContent, render};
pub use session::{ReadingSession, Snapshot};
