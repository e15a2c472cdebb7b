//! Chapter markup rendering.
//!
//! Chapters are written in a small markdown subset: `#`..`####` headings,
//! `![alt](src)` images, `**bold**`, `*italic*` and blank-line separated
//! paragraphs. Rendering never fails; anything that does not match one of
//! those constructs is kept as literal text.

use regex::Regex;
use std::sync::LazyLock;

pub const ILLUSTRATIONS_DIR: &str = "illustrations/";

static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

// Longest prefix first so "#### " is never taken for a level-1 heading.
const HEADING_PREFIXES: [(&str, u8); 4] = [("#### ", 4), ("### ", 3), ("## ", 2), ("# ", 1)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Image(ImageRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
}

/// Rendered chapter: the illustration pulled out of the text plus the
/// remaining content as blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredContent {
    pub illustration: Option<ImageRef>,
    pub blocks: Vec<Block>,
}

impl StructuredContent {
    /// Images left inline in the content, in document order.
    pub fn inline_images(&self) -> Vec<&ImageRef> {
        let mut images = Vec::new();
        for block in &self.blocks {
            collect_images(block.content(), &mut images);
        }
        images
    }

    pub fn headings(&self) -> impl Iterator<Item = (u8, String)> + '_ {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading { level, content } => Some((*level, inline_text(content))),
            Block::Paragraph(_) => None,
        })
    }
}

impl Block {
    pub fn content(&self) -> &[Inline] {
        match self {
            Block::Heading { content, .. } => content,
            Block::Paragraph(content) => content,
        }
    }

    pub fn plain_text(&self) -> String {
        inline_text(self.content())
    }
}

fn collect_images<'a>(content: &'a [Inline], out: &mut Vec<&'a ImageRef>) {
    for inline in content {
        match inline {
            Inline::Image(image) => out.push(image),
            Inline::Bold(children) | Inline::Italic(children) => collect_images(children, out),
            Inline::Text(_) => {}
        }
    }
}

/// Concatenated text of inline content, without markup. Images contribute
/// their alt text.
pub fn inline_text(content: &[Inline]) -> String {
    let mut text = String::new();
    for inline in content {
        match inline {
            Inline::Text(s) => text.push_str(s),
            Inline::Bold(children) | Inline::Italic(children) => {
                text.push_str(&inline_text(children))
            }
            Inline::Image(image) => text.push_str(&image.alt),
        }
    }
    text
}

pub fn render(raw: &str) -> StructuredContent {
    render_with(raw, None)
}

/// Like [`render`], resolving image paths against the book's asset root.
pub fn render_in_book(raw: &str, asset_root: &str) -> StructuredContent {
    render_with(raw, Some(asset_root))
}

fn render_with(raw: &str, asset_root: Option<&str>) -> StructuredContent {
    let text = raw.replace("\r\n", "\n");

    let (text, illustration) = match IMAGE.find(&text) {
        Some(found) => {
            let illustration = image_ref(&text[found.range()], |src| {
                resolve_illustration(src, asset_root)
            });
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..found.start()]);
            stripped.push_str(&text[found.end()..]);
            (stripped, illustration)
        }
        None => (text, None),
    };

    let mut blocks = Vec::new();
    for chunk in BLANK_LINE.split(&text) {
        let mut paragraph: Vec<Inline> = Vec::new();
        for line in chunk.lines() {
            if let Some((level, rest)) = heading(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Heading {
                    level,
                    content: parse_inline(rest.trim(), asset_root),
                });
                continue;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !paragraph.is_empty() {
                push_text(&mut paragraph, " ");
            }
            for inline in parse_inline(line, asset_root) {
                match inline {
                    Inline::Text(s) => push_text(&mut paragraph, &s),
                    other => paragraph.push(other),
                }
            }
        }
        flush_paragraph(&mut paragraph, &mut blocks);
    }

    StructuredContent {
        illustration,
        blocks,
    }
}

fn flush_paragraph(paragraph: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    let content = std::mem::take(paragraph);
    let blank = content
        .iter()
        .all(|inline| matches!(inline, Inline::Text(s) if s.trim().is_empty()));
    if !blank {
        blocks.push(Block::Paragraph(content));
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    HEADING_PREFIXES
        .iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest)))
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn image_ref(matched: &str, resolve: impl Fn(&str) -> String) -> Option<ImageRef> {
    let caps = IMAGE.captures(matched)?;
    Some(ImageRef {
        alt: caps[1].to_string(),
        src: resolve(&caps[2]),
    })
}

fn is_absolute(src: &str) -> bool {
    src.starts_with('/') || src.contains("://") || src.starts_with("data:")
}

fn join_root(root: &str, src: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), src)
}

fn resolve_illustration(src: &str, asset_root: Option<&str>) -> String {
    match asset_root {
        Some(root) if !is_absolute(src) => join_root(root, src),
        _ => src.to_string(),
    }
}

fn resolve_inline(src: &str, asset_root: Option<&str>) -> String {
    match asset_root {
        Some(root) if src.starts_with(ILLUSTRATIONS_DIR) => join_root(root, src),
        _ => src.to_string(),
    }
}

fn parse_inline(line: &str, asset_root: Option<&str>) -> Vec<Inline> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in IMAGE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        split_bold(&line[last..whole.start()], &mut pieces);
        pieces.push(Inline::Image(ImageRef {
            alt: caps[1].to_string(),
            src: resolve_inline(&caps[2], asset_root),
        }));
        last = whole.end();
    }
    split_bold(&line[last..], &mut pieces);
    apply_italic(pieces)
}

fn split_bold(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for caps in BOLD.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(out, &text[last..whole.start()]);
        out.push(Inline::Bold(apply_italic(vec![Inline::Text(caps[1].to_string())])));
        last = whole.end();
    }
    push_text(out, &text[last..]);
}

enum Unit {
    Char(char),
    Node(Inline),
}

impl Unit {
    fn is_star(&self) -> bool {
        matches!(self, Unit::Char('*'))
    }
}

/// Pairs up the single stars left after bold matching. A span may enclose
/// bold runs and images; a span holding nothing but stars stays literal.
fn apply_italic(pieces: Vec<Inline>) -> Vec<Inline> {
    let mut units = Vec::new();
    for piece in pieces {
        match piece {
            Inline::Text(s) => units.extend(s.chars().map(Unit::Char)),
            other => units.push(Unit::Node(other)),
        }
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < units.len() {
        if units[i].is_star() {
            let close = (i + 2..units.len())
                .find(|&j| units[j].is_star() && units[i + 1..j].iter().any(|u| !u.is_star()));
            if let Some(close) = close {
                let mut children = Vec::new();
                for unit in &units[i + 1..close] {
                    push_unit(&mut children, unit);
                }
                out.push(Inline::Italic(children));
                i = close + 1;
                continue;
            }
        }
        push_unit(&mut out, &units[i]);
        i += 1;
    }
    out
}

fn push_unit(out: &mut Vec<Inline>, unit: &Unit) {
    match unit {
        Unit::Char(c) => push_text(out, c.encode_utf8(&mut [0; 4])),
        Unit::Node(inline) => out.push(inline.clone()),
    }
}

/// Text of the first line-leading heading of any level.
pub fn first_heading(raw: &str) -> Option<String> {
    raw.lines()
        .find_map(heading)
        .map(|(_, rest)| rest.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// The image that [`render`] would pull out as the chapter illustration,
/// with its path resolved against `asset_root`.
pub fn illustration(raw: &str, asset_root: &str) -> Option<ImageRef> {
    let found = IMAGE.find(raw)?;
    image_ref(found.as_str(), |src| resolve_illustration(src, Some(asset_root)))
}
