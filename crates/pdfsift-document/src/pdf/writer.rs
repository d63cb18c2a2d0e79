// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — lay out a flow of blocks (headings, paragraphs, ruled tables,
// images) on A4 pages using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The writer keeps a vertical cursor and starts a new
// page whenever the next line or block does not fit above the bottom margin.

use std::path::Path;

use pdfsift_core::error::SiftError;
use printpdf::{
    BuiltinFont, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg,
    Point, Pt, RawImage, RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// A4 in millimetres.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// One inch on every side.
const MARGIN_PT: f32 = 72.0;

const BODY_SIZE_PT: f32 = 11.0;
const BODY_LEADING_PT: f32 = 14.0;
const TABLE_ROW_PT: f32 = 18.0;
const CELL_PADDING_PT: f32 = 4.0;

/// A unit of content in the document flow.
#[derive(Debug, Clone)]
pub enum Block {
    /// Large bold heading, centred.
    Title(String),
    /// Section heading.
    Heading(String),
    /// Body text. Runs of whitespace (including newlines) collapse to one
    /// space before wrapping.
    Paragraph(String),
    /// Vertical gap in points.
    Spacer(f32),
    /// Grid-ruled table.
    Table(TableBlock),
    /// RGB image drawn at the given size in points, left-aligned.
    Image {
        image: image::RgbImage,
        width_pt: f32,
        height_pt: f32,
    },
}

/// A table laid out with fixed column widths.
#[derive(Debug, Clone)]
pub struct TableBlock {
    /// Column widths in points.
    pub columns: Vec<f32>,
    pub rows: Vec<Vec<String>>,
    /// Render the first row in bold (header).
    pub bold_header: bool,
    /// Render the last row in bold (totals).
    pub bold_footer: bool,
}

/// Builds a PDF from a sequence of [`Block`]s.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
    blocks: Vec<Block>,
}

impl PdfWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Append a block to the flow.
    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Lay out every block and serialise the document.
    #[instrument(skip(self), fields(title = %self.title, blocks = self.blocks.len()))]
    pub fn render(&self) -> Result<Vec<u8>, SiftError> {
        let mut doc = PdfDocument::new(&self.title);
        let mut layout = Layout::new();

        for block in &self.blocks {
            match block {
                Block::Title(text) => layout.title(text),
                Block::Heading(text) => layout.heading(text),
                Block::Paragraph(text) => layout.paragraph(text),
                Block::Spacer(height) => layout.y -= height,
                Block::Table(table) => layout.table(table)?,
                Block::Image {
                    image,
                    width_pt,
                    height_pt,
                } => layout.image(&mut doc, image, *width_pt, *height_pt)?,
            }
        }

        let pages = layout.finish();
        debug!(pages = pages.len(), "Layout complete");
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        Ok(output)
    }

    /// Render and write the document to `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SiftError> {
        let bytes = self.render()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

// -- Layout -------------------------------------------------------------------

/// Vertical flow state: finished pages, the ops of the current page, and the
/// cursor measured in points from the bottom edge.
struct Layout {
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    y: f32,
    page_w_pt: f32,
    page_h_pt: f32,
}

impl Layout {
    fn new() -> Self {
        let page_h_pt = Mm(PAGE_HEIGHT_MM).into_pt().0;
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: page_h_pt - MARGIN_PT,
            page_w_pt: Mm(PAGE_WIDTH_MM).into_pt().0,
            page_h_pt,
        }
    }

    fn usable_width(&self) -> f32 {
        self.page_w_pt - 2.0 * MARGIN_PT
    }

    /// Start a new page unless `height` still fits. An empty page always
    /// accepts the block so oversized content cannot loop forever.
    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN_PT && !self.ops.is_empty() {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages
            .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
        self.y = self.page_h_pt - MARGIN_PT;
    }

    fn finish(mut self) -> Vec<PdfPage> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }

    /// Write one line of text with its baseline at `y`.
    fn text_at(&mut self, x: f32, y: f32, size: f32, font: BuiltinFont, text: &str) {
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point { x: Pt(x), y: Pt(y) },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(size),
            font,
        });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font,
        });
        self.ops.push(Op::EndTextSection);
    }

    fn title(&mut self, text: &str) {
        let size = 24.0;
        self.ensure(size * 1.5);
        self.y -= size;
        let width = estimate_width(text, size);
        let x = MARGIN_PT + ((self.usable_width() - width) / 2.0).max(0.0);
        let y = self.y;
        self.text_at(x, y, size, BuiltinFont::HelveticaBold, text);
        self.y -= size * 0.5;
    }

    fn heading(&mut self, text: &str) {
        let size = 14.0;
        self.ensure(size * 1.4);
        self.y -= size;
        let y = self.y;
        self.text_at(MARGIN_PT, y, size, BuiltinFont::HelveticaBold, text);
        self.y -= size * 0.4;
    }

    fn paragraph(&mut self, text: &str) {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let max_chars = (self.usable_width() / (0.5 * BODY_SIZE_PT)) as usize;
        for line in wrap_text(&normalized, max_chars.max(1)) {
            self.ensure(BODY_LEADING_PT);
            self.y -= BODY_LEADING_PT;
            let y = self.y;
            self.text_at(MARGIN_PT, y, BODY_SIZE_PT, BuiltinFont::Helvetica, &line);
        }
    }

    fn table(&mut self, table: &TableBlock) -> Result<(), SiftError> {
        if table.rows.is_empty() {
            return Ok(());
        }
        if table.rows.iter().any(|row| row.len() != table.columns.len()) {
            return Err(SiftError::PdfError(format!(
                "table rows must have {} cells",
                table.columns.len()
            )));
        }

        let height = TABLE_ROW_PT * table.rows.len() as f32;
        self.ensure(height);

        let width: f32 = table.columns.iter().sum();
        let left = MARGIN_PT + ((self.usable_width() - width) / 2.0).max(0.0);
        let top = self.y;
        let last = table.rows.len() - 1;

        for (row_index, row) in table.rows.iter().enumerate() {
            let bold =
                (table.bold_header && row_index == 0) || (table.bold_footer && row_index == last);
            let font = if bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            let baseline = top - TABLE_ROW_PT * (row_index as f32 + 1.0)
                + (TABLE_ROW_PT - BODY_SIZE_PT) / 2.0
                + 1.0;
            let mut x = left;
            for (cell, column_width) in row.iter().zip(&table.columns) {
                let text_width = estimate_width(cell, BODY_SIZE_PT);
                let offset = ((column_width - text_width) / 2.0).max(CELL_PADDING_PT);
                self.text_at(x + offset, baseline, BODY_SIZE_PT, font, cell);
                x += column_width;
            }
        }

        // Grid: one rule per row boundary, one per column boundary.
        let bottom = top - height;
        self.ops.push(Op::SetOutlineThickness { pt: Pt(1.0) });
        for boundary in 0..=table.rows.len() {
            let y = top - TABLE_ROW_PT * boundary as f32;
            self.ops.push(rule((left, y), (left + width, y)));
        }
        let mut x = left;
        self.ops.push(rule((x, top), (x, bottom)));
        for column_width in &table.columns {
            x += column_width;
            self.ops.push(rule((x, top), (x, bottom)));
        }

        self.y = bottom;
        Ok(())
    }

    fn image(
        &mut self,
        doc: &mut PdfDocument,
        image: &image::RgbImage,
        width_pt: f32,
        height_pt: f32,
    ) -> Result<(), SiftError> {
        let (px_w, px_h) = image.dimensions();
        if px_w == 0 || px_h == 0 {
            return Err(SiftError::ImageError("cannot place an empty image".into()));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(image.as_raw().clone()),
            width: px_w as usize,
            height: px_h as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        self.ensure(height_pt);
        self.y -= height_pt;

        // At 72 dpi one pixel is one point, so the scale is the target size
        // over the pixel size.
        self.ops.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(MARGIN_PT)),
                translate_y: Some(Pt(self.y)),
                scale_x: Some(width_pt / px_w as f32),
                scale_y: Some(height_pt / px_h as f32),
                dpi: Some(72.0),
                rotate: None,
            },
        });
        Ok(())
    }
}

fn rule(from: (f32, f32), to: (f32, f32)) -> Op {
    let point = |(x, y): (f32, f32)| LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    };
    Op::DrawLine {
        line: Line {
            points: vec![point(from), point(to)],
            is_closed: false,
        },
    }
}

/// Approximate Helvetica advance width: glyphs average half the font size.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * 0.5 * size
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::with_capacity(max_width);

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                // Flush any accumulated line.
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                // Force-break the oversized word on character boundaries.
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line.extend(chunk);
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
            } else if current_line.chars().count() + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
