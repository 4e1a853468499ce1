//! PDF export of the admin statistics.
//!
//! The document is laid out as a flat list of blocks first, then drawn onto
//! A4 pages with the built-in Helvetica font. Blocks that would run past the
//! bottom margin continue on a new page.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::stats::ReportSnapshot;

pub const REPORT_FILENAME: &str = "StyleShare_Report.pdf";
pub const REPORT_TITLE: &str = "StyleShare Web App Report";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.2;
// Rough average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;
const BODY_SIZE: f32 = 12.0;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { text: String, size: f32, align: Align },
    /// One blank body line.
    Gap,
}

impl Block {
    fn text(text: impl Into<String>, size: f32) -> Self {
        Block::Text {
            text: text.into(),
            size,
            align: Align::Left,
        }
    }

    fn centered(text: impl Into<String>, size: f32) -> Self {
        Block::Text {
            text: text.into(),
            size,
            align: Align::Center,
        }
    }
}

fn numbered(titles: &[String]) -> impl Iterator<Item = Block> + '_ {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| Block::text(format!("{}. {}", i + 1, title), BODY_SIZE))
}

/// Report content in reading order.
pub fn layout(snapshot: &ReportSnapshot) -> Vec<Block> {
    let stats = &snapshot.stats;
    let mut blocks = vec![
        Block::centered(REPORT_TITLE, 25.0),
        Block::Gap,
        Block::centered("Overview", 20.0),
        Block::Gap,
        Block::text(format!("Date: {}", snapshot.date.format("%-m/%-d/%Y")), 15.0),
        Block::Gap,
        Block::text(format!("Total Users: {}", stats.total_users), BODY_SIZE),
        Block::text(format!("Total Posts: {}", stats.total_posts), BODY_SIZE),
        Block::text(format!("Total Comments: {}", stats.total_comments), BODY_SIZE),
        Block::text(format!("Total Reactions: {}", stats.total_reactions), BODY_SIZE),
        Block::text(
            format!("Total Contact Messages: {}", stats.contact_messages),
            BODY_SIZE,
        ),
        Block::text(
            format!("Total Favorite Posts: {}", stats.favorites_posts),
            BODY_SIZE,
        ),
        Block::Gap,
        Block::Gap,
        Block::text("Top Trending Posts", 15.0),
        Block::Gap,
    ];
    blocks.extend(numbered(&snapshot.trending_titles));
    blocks.push(Block::Gap);
    blocks.push(Block::text("Newest Posts", 15.0));
    blocks.push(Block::Gap);
    blocks.extend(numbered(&snapshot.newest_titles));
    blocks
}

fn glyph_width_mm(size: f32) -> f32 {
    size * AVG_GLYPH_WIDTH * PT_TO_MM
}

fn line_height_mm(size: f32) -> f32 {
    size * LINE_SPACING * PT_TO_MM
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a
/// line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    cursor_mm: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn advance(&mut self, height: f32) {
        if self.cursor_mm - height < MARGIN_MM {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.cursor_mm -= height;
    }

    fn write(&mut self, block: &Block) {
        match block {
            Block::Gap => self.advance(line_height_mm(BODY_SIZE)),
            Block::Text { text, size, align } => {
                let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
                let max_chars = (usable / glyph_width_mm(*size)).floor() as usize;
                for line in wrap(text, max_chars) {
                    self.advance(line_height_mm(*size));
                    let x = match align {
                        Align::Left => MARGIN_MM,
                        Align::Center => {
                            let width = line.chars().count() as f32 * glyph_width_mm(*size);
                            ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
                        }
                    };
                    self.layer
                        .use_text(line, *size, Mm(x), Mm(self.cursor_mm), &self.font);
                }
            }
        }
    }
}

fn render_error<E: std::fmt::Debug>(err: E) -> ReportError {
    ReportError::Render(format!("{:?}", err))
}

/// Render the report to PDF bytes.
pub fn render(snapshot: &ReportSnapshot) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        font,
        cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        pages: 1,
    };
    for block in layout(snapshot) {
        writer.write(&block);
    }
    let pages = writer.pages;
    drop(writer);

    tracing::debug!("Rendered report with {} page(s)", pages);
    doc.save_to_bytes().map_err(render_error)
}
