use crate::models::SessionState;
use crate::session::Snapshot;
use crate::settings::Settings;
use crate::ui::board::Board;
use crate::ui::windows::{metadata::MetadataWindow, toc::TocWindow};

/// Turns session snapshots into terminal output.
pub struct Reader<'a> {
    settings: &'a Settings,
    styled: bool,
}

impl<'a> Reader<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            styled: false,
        }
    }

    pub fn with_styles(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn render(&self, snapshot: &Snapshot<'_>, bookmarks: &[usize]) -> Vec<String> {
        if let Some(err) = snapshot.error.filter(|err| err.is_user_visible()) {
            return vec![err.to_string(), "Please try again later.".to_string()];
        }

        let Some(book) = snapshot.book else {
            return Vec::new();
        };

        match snapshot.state {
            SessionState::Closed => Vec::new(),
            SessionState::Overview => {
                let mut lines = MetadataWindow::render(book);
                lines.push(String::new());
                lines.extend(TocWindow::render(&book.chapters, None, bookmarks));
                lines
            }
            SessionState::Reading => {
                let (Some(chapter), Some(content)) = (snapshot.chapter, &snapshot.content) else {
                    return Vec::new();
                };
                let width = self.settings.width_for(snapshot.font_size);
                let board = Board::new()
                    .with_width(width)
                    .with_hyphenation(self.settings.hyphenate)
                    .with_illustration(self.settings.show_illustrations)
                    .with_styles(self.styled);

                let marker = if snapshot.bookmarked { " [bookmarked]" } else { "" };
                let mut lines = vec![
                    format!(
                        "{} | Chapter {} of {}{}",
                        book.metadata.title,
                        chapter.number,
                        book.chapters.len(),
                        marker
                    ),
                    "-".repeat(width),
                ];
                lines.extend(board.render(content));
                lines.push("-".repeat(width));
                lines.push(format!(
                    "{}   font: {}   {}",
                    if snapshot.has_prev { "< previous" } else { "          " },
                    snapshot.font_size.as_str(),
                    if snapshot.has_next { "next >" } else { "" }
                ));
                lines
            }
        }
    }
}
