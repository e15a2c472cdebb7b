use hyphenation::{Language, Load, Standard};
use std::sync::LazyLock;
use textwrap::{Options, WordSplitter};

use crate::markup::{Block, Inline, StructuredContent};

static EN_US: LazyLock<Option<Standard>> = LazyLock::new(|| match Standard::from_embedded(Language::EnglishUS) {
    Ok(dictionary) => Some(dictionary),
    Err(err) => {
        log::warn!("Hyphenation dictionary unavailable: {}", err);
        None
    }
});

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[22m";
const ITALIC_ON: &str = "\x1b[3m";
const ITALIC_OFF: &str = "\x1b[23m";

/// Lays rendered chapter content out as terminal lines.
pub struct Board {
    width: usize,
    hyphenate: bool,
    styled: bool,
    show_illustration: bool,
}

impl Board {
    pub fn new() -> Self {
        Self {
            width: 80,
            hyphenate: true,
            styled: false,
            show_illustration: true,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(10);
        self
    }

    pub fn with_hyphenation(mut self, enabled: bool) -> Self {
        self.hyphenate = enabled;
        self
    }

    /// Emit ANSI bold/italic escapes instead of plain markers.
    pub fn with_styles(mut self, enabled: bool) -> Self {
        self.styled = enabled;
        self
    }

    pub fn with_illustration(mut self, show: bool) -> Self {
        self.show_illustration = show;
        self
    }

    pub fn render(&self, content: &StructuredContent) -> Vec<String> {
        let mut lines = Vec::new();

        if self.show_illustration {
            if let Some(image) = &content.illustration {
                lines.push(format!("[Illustration: {}] ({})", image.alt, image.src));
                lines.push(String::new());
            }
        }

        for block in &content.blocks {
            match block {
                Block::Heading { level, content } => {
                    let text = self.inline(content);
                    lines.extend(self.wrap(&text));
                    let underline = match level {
                        1 => Some('='),
                        2 => Some('-'),
                        _ => None,
                    };
                    if let Some(ch) = underline {
                        let width = textwrap::core::display_width(&text).min(self.width);
                        lines.push(ch.to_string().repeat(width));
                    }
                }
                Block::Paragraph(content) => {
                    lines.extend(self.wrap(&self.inline(content)));
                }
            }
            lines.push(String::new());
        }

        if lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn inline(&self, content: &[Inline]) -> String {
        let mut text = String::new();
        for inline in content {
            match inline {
                Inline::Text(s) => text.push_str(s),
                Inline::Bold(children) => {
                    let inner = self.inline(children);
                    if self.styled {
                        text.push_str(&format!("{BOLD_ON}{inner}{BOLD_OFF}"));
                    } else {
                        text.push_str(&inner);
                    }
                }
                Inline::Italic(children) => {
                    let inner = self.inline(children);
                    if self.styled {
                        text.push_str(&format!("{ITALIC_ON}{inner}{ITALIC_OFF}"));
                    } else {
                        text.push_str(&format!("_{}_", inner));
                    }
                }
                Inline::Image(image) => {
                    text.push_str(&format!("[Image: {}] ({})", image.alt, image.src));
                }
            }
        }
        text
    }

    fn wrap(&self, text: &str) -> Vec<String> {
        let splitter = match (self.hyphenate, EN_US.as_ref()) {
            (true, Some(dictionary)) => WordSplitter::Hyphenation(dictionary.clone()),
            _ => WordSplitter::NoHyphenation,
        };
        let options = Options::new(self.width).word_splitter(splitter);
        textwrap::wrap(text, &options)
            .into_iter()
            .map(|line| line.trim_end().to_string())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::render;

    #[test]
    fn test_heading_underlined() {
        let lines = Board::new().render(&render("# Title\n\nBody text"));
        assert_eq!(lines, vec!["Title", "=====", "", "Body text"]);
    }

    #[test]
    fn test_lines_fit_width() {
        let text = "This paragraph is long enough that it has to wrap several times at a narrow width, including pneumonoultramicroscopicsilicovolcanoconiosis.";
        let lines = Board::new().with_width(30).render(&render(text));
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(textwrap::core::display_width(line) <= 30, "too wide: '{}'", line);
        }
    }

    #[test]
    fn test_plain_and_styled_emphasis() {
        let content = render("**bold** and *italic*");
        assert_eq!(Board::new().render(&content), vec!["bold and _italic_"]);
        assert_eq!(
            Board::new().with_styles(true).render(&content),
            vec!["\x1b[1mbold\x1b[22m and \x1b[3mitalic\x1b[23m"]
        );
    }

    #[test]
    fn test_nested_emphasis_keeps_outer_style() {
        let content = render("**a *b* c**");
        assert_eq!(
            Board::new().with_styles(true).render(&content),
            vec!["\x1b[1ma \x1b[3mb\x1b[23m c\x1b[22m"]
        );
        assert_eq!(Board::new().render(&render("*a **b** c*")), vec!["_a b c_"]);
    }

    #[test]
    fn test_illustration_toggle() {
        let content = render("![Cover](illustrations/c.png)\n\nText");
        let shown = Board::new().render(&content);
        assert_eq!(shown[0], "[Illustration: Cover] (illustrations/c.png)");
        let hidden = Board::new().with_illustration(false).render(&content);
        assert_eq!(hidden, vec!["Text"]);
    }
}
