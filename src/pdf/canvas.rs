//! A `Canvas` that lays cells out onto PDF pages.
//!
//! Cells are recorded per page with their text already broken into lines;
//! `PdfCanvas::finish` hands the pages to the writer.

use crate::canvas::{Align, Canvas, CellOptions, Float, Margins};
use crate::font::FontContext;
use crate::model::Metadata;

use super::PdfWriter;

/// Default stroke width for cell borders, in points.
pub const DEFAULT_LINE_WIDTH: f64 = 0.5;

/// Preferred line pitch as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.2;

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

/// A cell placed on a page.
#[derive(Debug, Clone)]
pub struct PlacedCell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub lines: Vec<String>,
    pub align: Align,
    pub border: bool,
}

impl PlacedCell {
    /// Font size and line pitch for the text. Both shrink when the wrapped
    /// lines would not fit the cell height at the nominal size.
    pub fn text_metrics(&self) -> (f64, f64) {
        let lines = self.lines.len().max(1) as f64;
        let pitch = (self.font_size * LINE_SPACING).min(self.height / lines);
        (self.font_size.min(pitch), pitch)
    }

    /// Height of the text block; never more than `height`.
    pub fn text_block_height(&self) -> f64 {
        self.text_metrics().1 * self.lines.len() as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct CanvasPage {
    pub cells: Vec<PlacedCell>,
}

#[derive(Debug)]
pub struct PdfCanvas {
    geometry: PageGeometry,
    font: FontContext,
    font_size: f64,
    line_width: f64,
    x: f64,
    y: f64,
    pages: Vec<CanvasPage>,
}

impl PdfCanvas {
    /// A canvas with one empty page and the cursor at its top-left margin.
    pub fn new(geometry: PageGeometry, font: FontContext) -> Self {
        Self {
            geometry,
            font,
            font_size: 12.0,
            line_width: DEFAULT_LINE_WIDTH,
            x: geometry.margins.left,
            y: geometry.margins.top,
            pages: vec![CanvasPage::default()],
        }
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn font(&self) -> &FontContext {
        &self.font
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn pages(&self) -> &[CanvasPage] {
        &self.pages
    }

    /// Serialize everything drawn so far.
    pub fn finish(&self, metadata: &Metadata) -> Vec<u8> {
        PdfWriter::new().write(self, metadata)
    }

    fn current_page(&mut self) -> &mut CanvasPage {
        if self.pages.is_empty() {
            self.pages.push(CanvasPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl Canvas for PdfCanvas {
    fn measure_text_width(&self, text: &str) -> f64 {
        self.font.measure_string(text, self.font_size)
    }

    fn draw_cell(&mut self, width: f64, height: f64, text: &str, options: CellOptions) {
        let lines = wrap_text(&self.font, text, self.font_size, width);
        let cell = PlacedCell {
            x: self.x,
            y: self.y,
            width,
            height,
            font_size: self.font_size,
            lines,
            align: options.align,
            border: options.border,
        };
        self.current_page().cells.push(cell);
        match options.float {
            Float::Right => self.x += width,
            Float::Bottom => self.line_break(height),
        }
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    fn line_break(&mut self, height: f64) {
        self.x = self.geometry.margins.left;
        self.y += height;
    }

    fn page_width(&self) -> f64 {
        self.geometry.width
    }

    fn page_height(&self) -> f64 {
        self.geometry.height
    }

    fn margins(&self) -> Margins {
        self.geometry.margins
    }

    fn add_page(&mut self) {
        self.pages.push(CanvasPage::default());
        self.x = self.geometry.margins.left;
        self.y = self.geometry.margins.top;
    }

    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }
}

/// Greedy line breaking: words move to the next line when they overflow,
/// words wider than the cell are broken between characters.
pub fn wrap_text(font: &FontContext, text: &str, font_size: f64, width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0;
        for word in paragraph.split_inclusive(' ') {
            let word_width = font.measure_string(word.trim_end(), font_size);
            if !line.is_empty() && line_width + word_width > width {
                lines.push(line.trim_end().to_string());
                line.clear();
                line_width = 0.0;
            }
            if word_width > width {
                for ch in word.chars() {
                    let ch_width = font.char_width(ch, font_size);
                    if !line.is_empty() && line_width + ch_width > width {
                        lines.push(line.trim_end().to_string());
                        line.clear();
                        line_width = 0.0;
                    }
                    line.push(ch);
                    line_width += ch_width;
                }
            } else {
                line.push_str(word);
                line_width += font.measure_string(word, font_size);
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}
