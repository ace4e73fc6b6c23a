//! # Document Model
//!
//! The JSON input for rendering a table: page setup, head labels or column
//! widths, and the nested rows. Everything except the rows has a default, so
//! the smallest useful document is
//!
//! ```json
//! { "heads": ["name", "qty"], "rows": [{ "values": ["apple", "3"] }] }
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::canvas::Margins;
use crate::config::{TableConfig, DEFAULT_MAX_DEPTH};
use crate::error::{Result, TableError};
use crate::font::{FontContext, StandardFont};
use crate::layout::Row;
use crate::pdf::DEFAULT_LINE_WIDTH;

/// A complete table document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDocument {
    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub page: PageConfig,

    /// Text drawn in a full-width cell above the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Font size of table content, in points.
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Vertical space added to each line of text in a cell.
    #[serde(default)]
    pub cell_margin_h: f64,

    /// Extra width added to each measured head label. When absent the
    /// leftover page width is shared equally between the columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_margin_w: Option<f64>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Head labels. Their measured widths become the column widths.
    #[serde(default)]
    pub heads: Vec<String>,

    /// Explicit column widths, used when there are no head labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<f64>>,

    pub rows: Vec<RowSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontEntry>,

    /// Stroke width of cell borders.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

fn default_font_size() -> f64 {
    10.0
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// A row and its sub-rows as they appear in the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpec {
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RowSpec>,

    /// Font size for this row and its descendants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_margin_h: Option<f64>,
}

/// The font used for every cell: a standard family name, or a TrueType
/// font given inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Helvetica", "Noto Sans SC").
    pub family: String,
    /// Base64-encoded font data, or a data URI
    /// (e.g. "data:font/ttf;base64,..."). Standard families need none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// Page size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "PageSize::default")]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> Edges {
    Edges::uniform(30.0)
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A4Landscape,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A4Landscape => (841.89, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

impl From<Edges> for Margins {
    fn from(e: Edges) -> Self {
        Margins {
            top: e.top,
            right: e.right,
            bottom: e.bottom,
            left: e.left,
        }
    }
}

impl TableDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The table-wide layout configuration. Column widths are left unset.
    pub fn table_config(&self) -> TableConfig {
        let mut config = TableConfig::new(self.font_size)
            .with_cell_margin_h(self.cell_margin_h)
            .with_max_depth(self.max_depth);
        if let Some(margin) = self.cell_margin_w {
            config = config.with_cell_margin_w(margin);
        }
        config
    }

    /// Build the row tree. Rows with their own font size or margin get a
    /// configuration derived from `base`, sharing its column widths.
    pub fn build_rows(&self, base: &TableConfig) -> Vec<Row> {
        self.rows.iter().map(|spec| spec.to_row(base)).collect()
    }

    /// Load the configured font, decoding inline data when present.
    pub fn font_context(&self) -> Result<FontContext> {
        let Some(entry) = &self.font else {
            return Ok(FontContext::new());
        };
        match &entry.src {
            Some(src) => FontContext::custom(&entry.family, decode_font_source(src)?),
            None => StandardFont::from_family(&entry.family)
                .map(FontContext::standard)
                .ok_or_else(|| {
                    TableError::Font(format!(
                        "'{}' is not a standard font and no font data was given",
                        entry.family
                    ))
                }),
        }
    }
}

impl RowSpec {
    fn to_row(&self, base: &TableConfig) -> Row {
        let mut row = Row::new(self.values.iter().cloned());
        if self.font_size.is_some() || self.cell_margin_h.is_some() {
            let mut config = base.clone();
            if let Some(size) = self.font_size {
                config.font_size = size;
            }
            if let Some(margin) = self.cell_margin_h {
                config.cell_margin_h = margin;
            }
            row = row.with_config(Rc::new(config));
        }
        let inherited = row.config().map(|c| c.as_ref().clone());
        let parent = inherited.as_ref().unwrap_or(base);
        for child in &self.children {
            row.add_child(child.to_row(parent), None);
        }
        row
    }
}

/// Decode a base64 string or a `data:` URI into raw font bytes.
pub fn decode_font_source(src: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    let b64 = if src.starts_with("data:") {
        let comma = src
            .find(',')
            .ok_or_else(|| TableError::Font("invalid data URI: missing comma".to_string()))?;
        &src[comma + 1..]
    } else {
        src
    };
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| TableError::Font(format!("base64 decode error: {}", e)))
}
