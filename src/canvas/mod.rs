//! # Canvas
//!
//! The drawing surface the table engine talks to. The engine never produces
//! pixels or PDF operators itself: it measures text, asks for page geometry,
//! and places bordered cells at the cursor, strictly top-to-bottom and
//! left-to-right.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page, y growing downwards.

mod recording;

pub use recording::{RecordedCell, RecordingCanvas};

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Align {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Align {
    pub const CENTER: Align = Align {
        horizontal: HAlign::Center,
        vertical: VAlign::Middle,
    };
}

/// Where the cursor goes after a cell is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Float {
    /// Advance x by the cell width.
    #[default]
    Right,
    /// Return x to the left margin and advance y by the cell height.
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOptions {
    pub align: Align,
    /// Stroke all four borders.
    pub border: bool,
    pub float: Float,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            align: Align::CENTER,
            border: true,
            float: Float::Right,
        }
    }
}

/// A paginated drawing surface with a cursor.
pub trait Canvas {
    /// Width of `text` at the current font size.
    fn measure_text_width(&self, text: &str) -> f64;

    /// Draw a cell with its top-left corner at the cursor, then move the
    /// cursor according to `options.float`.
    fn draw_cell(&mut self, width: f64, height: f64, text: &str, options: CellOptions);

    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn set_xy(&mut self, x: f64, y: f64);

    /// Move to the left margin and down by `height`.
    fn line_break(&mut self, height: f64);

    fn page_width(&self) -> f64;
    fn page_height(&self) -> f64;
    fn margins(&self) -> Margins;

    /// Start a fresh page; the cursor moves to the top-left margin corner.
    fn add_page(&mut self);

    fn set_font_size(&mut self, size: f64);

    /// Vertical space left between `y` and the bottom margin.
    fn remaining_height(&self, y: f64) -> f64 {
        self.page_height() - self.margins().bottom - y
    }

    /// Width available between the left and right margins.
    fn content_width(&self) -> f64 {
        self.page_width() - self.margins().horizontal()
    }
}
