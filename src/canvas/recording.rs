//! An in-memory canvas that records every cell it is asked to draw.
//!
//! Text is measured with a fixed advance per character, which makes layout
//! results predictable. Useful for dry runs (how many pages will this take?)
//! and for tests.

use super::{Canvas, CellOptions, Float, Margins};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCell {
    /// Zero-based page index.
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Font size in effect when the cell was drawn.
    pub font_size: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    page_width: f64,
    page_height: f64,
    margins: Margins,
    char_width: f64,
    font_size: f64,
    x: f64,
    y: f64,
    page: usize,
    cells: Vec<RecordedCell>,
}

impl RecordingCanvas {
    /// A canvas already positioned at the top of its first page.
    pub fn new(page_width: f64, page_height: f64, margins: Margins) -> Self {
        Self {
            page_width,
            page_height,
            margins,
            char_width: 5.0,
            font_size: 10.0,
            x: margins.left,
            y: margins.top,
            page: 0,
            cells: Vec::new(),
        }
    }

    /// Advance used for every character when measuring.
    pub fn with_char_width(mut self, width: f64) -> Self {
        self.char_width = width;
        self
    }

    pub fn cells(&self) -> &[RecordedCell] {
        &self.cells
    }

    pub fn cells_on_page(&self, page: usize) -> impl Iterator<Item = &RecordedCell> {
        self.cells.iter().filter(move |c| c.page == page)
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }
}

impl Canvas for RecordingCanvas {
    fn measure_text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn draw_cell(&mut self, width: f64, height: f64, text: &str, options: CellOptions) {
        self.cells.push(RecordedCell {
            page: self.page,
            x: self.x,
            y: self.y,
            width,
            height,
            font_size: self.font_size,
            text: text.to_string(),
        });
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
        self.x = self.margins.left;
        self.y += height;
    }

    fn page_width(&self) -> f64 {
        self.page_width
    }

    fn page_height(&self) -> f64 {
        self.page_height
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn add_page(&mut self) {
        self.page += 1;
        self.x = self.margins.left;
        self.y = self.margins.top;
    }

    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }
}
