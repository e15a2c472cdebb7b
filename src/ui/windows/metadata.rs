use crate::session::OpenBook;

const PROGRESS_BAR_WIDTH: usize = 20;

/// The book overview shown before reading starts.
pub struct MetadataWindow;

impl MetadataWindow {
    pub fn render(book: &OpenBook) -> Vec<String> {
        let info = &book.metadata;
        let loaded = book.chapters.len();
        let created = super::display_date(info.creation_date.as_deref());

        let mut lines = vec![
            info.title.clone(),
            "=".repeat(info.title.chars().count()),
            info.description.clone(),
            String::new(),
            format!(
                "Created: {} | {} chapters | Status: {}",
                created,
                info.total_chapters,
                info.status.as_deref().unwrap_or("unknown")
            ),
            format!(
                "Words: {} | Pages: {} | Category: {}",
                if info.estimated_word_count > 0 {
                    info.estimated_word_count.to_string()
                } else {
                    "Unknown".to_string()
                },
                if info.estimated_page_count > 0.0 {
                    info.estimated_page_count.to_string()
                } else {
                    "Unknown".to_string()
                },
                info.topic.as_deref().unwrap_or("Fiction")
            ),
        ];

        let percent = info.progress_percent(loaded);
        let filled = (percent as usize * PROGRESS_BAR_WIDTH / 100).min(PROGRESS_BAR_WIDTH);
        lines.push(format!(
            "[{}{}] {} of {} chapters",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled),
            info.completed_or(loaded),
            loaded
        ));
        lines.push(String::new());
        lines.push(format!("This book was generated using AI on {}.", created));
        lines
    }
}
