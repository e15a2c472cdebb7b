use crate::models::Chapter;

/// Chapter list with the current chapter and bookmarks marked.
pub struct TocWindow;

impl TocWindow {
    pub fn render(chapters: &[Chapter], current: Option<usize>, bookmarks: &[usize]) -> Vec<String> {
        let mut lines = vec!["CHAPTERS".to_string()];
        for (index, chapter) in chapters.iter().enumerate() {
            let cursor = if current == Some(index) { '>' } else { ' ' };
            let mark = if bookmarks.contains(&index) { '*' } else { ' ' };
            lines.push(format!(
                "{}{} Chapter {:<3} {}",
                cursor,
                mark,
                chapter.number,
                chapter.display_name()
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        let chapters = vec![
            Chapter {
                number: 1,
                title: "Chapter 1: Arrival".to_string(),
                content: String::new(),
                illustration: None,
            },
            Chapter::placeholder(2),
        ];
        let lines = TocWindow::render(&chapters, Some(1), &[0]);
        assert_eq!(lines[0], "CHAPTERS");
        assert_eq!(lines[1], " * Chapter 1   Arrival");
        assert_eq!(lines[2], ">  Chapter 2   Chapter 2");
    }
}
