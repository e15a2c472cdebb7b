use crate::models::{BookSummary, Category};

pub struct LibraryWindow;

impl LibraryWindow {
    /// Books matching `query` (title or description) and `category`.
    pub fn filter<'a>(
        books: &'a [BookSummary],
        query: Option<&str>,
        category: Option<Category>,
    ) -> Vec<(usize, &'a BookSummary)> {
        books
            .iter()
            .enumerate()
            .filter(|(_, book)| query.is_none_or(|q| book.matches(q)))
            .filter(|(_, book)| category.is_none_or(|c| book.category() == c))
            .map(|(i, book)| (i + 1, book))
            .collect()
    }

    pub fn render(entries: &[(usize, &BookSummary)]) -> Vec<String> {
        if entries.is_empty() {
            return vec!["No books found.".to_string()];
        }

        let mut lines = Vec::new();
        for (number, book) in entries {
            let chapters = book
                .chapter_count
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            lines.push(format!(
                "{:>3}. {} [{}]",
                number,
                book.title,
                book.category()
            ));
            lines.push(format!(
                "     {} | {} chapters | {}",
                super::display_date(book.creation_date.as_deref()),
                chapters,
                book.id
            ));
            lines.push(format!("     {}", book.short_description()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, description: &str) -> BookSummary {
        BookSummary {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            creation_date: Some("2025-05-04".to_string()),
            chapter_count: Some(5),
            folder: id.to_string(),
        }
    }

    #[test]
    fn test_filter_keeps_catalog_numbers() {
        let books = vec![
            book("a", "Space Pilots", "stars"),
            book("b", "I Love You Maya", "a romance"),
            book("c", "Crime in Delhi", "a thriller"),
        ];
        let romance = LibraryWindow::filter(&books, None, Some(Category::Romance));
        assert_eq!(romance.len(), 1);
        assert_eq!(romance[0].0, 2);

        let searched = LibraryWindow::filter(&books, Some("thriller"), None);
        assert_eq!(searched[0].1.id, "c");
        assert_eq!(LibraryWindow::filter(&books, None, None).len(), 3);
    }

    #[test]
    fn test_render() {
        let books = vec![book("b", "I Love You Maya", "a romance")];
        let entries = LibraryWindow::filter(&books, None, None);
        let lines = LibraryWindow::render(&entries);
        assert_eq!(lines[0], "  1. I Love You Maya [romance]");
        assert_eq!(lines[1], "     May 4, 2025 | 5 chapters | b");
        assert_eq!(lines[2], "     a romance");
        assert_eq!(LibraryWindow::render(&[]), vec!["No books found."]);
    }
}
