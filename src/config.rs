//! Shared layout configuration.
//!
//! A `TableConfig` is shared by reference between a table and any number of
//! rows. The only mutation it ever sees is the one-time write of the column
//! widths during head setup; after that it is read-only.

use std::cell::OnceCell;

use crate::error::{Result, TableError};

/// Default bound on row nesting. Drawing recurses once per level.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Font size for table content, in points.
    pub font_size: f64,
    /// Vertical space added to every text line of a cell.
    pub cell_margin_h: f64,
    /// Extra width added to each measured head label. Derived from the page
    /// width when `None`.
    pub cell_margin_w: Option<f64>,
    pub max_depth: usize,
    column_widths: OnceCell<Vec<f64>>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl TableConfig {
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            cell_margin_h: 0.0,
            cell_margin_w: None,
            max_depth: DEFAULT_MAX_DEPTH,
            column_widths: OnceCell::new(),
        }
    }

    pub fn with_cell_margin_h(mut self, margin: f64) -> Self {
        self.cell_margin_h = margin;
        self
    }

    pub fn with_cell_margin_w(mut self, margin: f64) -> Self {
        self.cell_margin_w = Some(margin);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Height of one text line inside a cell.
    pub fn line_height(&self) -> f64 {
        self.cell_margin_h + self.font_size
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(TableError::Config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.cell_margin_h.is_finite() && self.cell_margin_h >= 0.0) {
            return Err(TableError::Config(format!(
                "cell height margin must not be negative, got {}",
                self.cell_margin_h
            )));
        }
        Ok(())
    }

    /// The finalized column widths, if head setup has happened.
    pub fn column_widths(&self) -> Option<&[f64]> {
        self.column_widths.get().map(Vec::as_slice)
    }

    /// Store the column widths. Fails if they were already set.
    pub fn set_column_widths(&self, widths: Vec<f64>) -> Result<()> {
        if let Some(bad) = widths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(TableError::Config(format!(
                "column widths must be positive, got {}",
                bad
            )));
        }
        self.column_widths
            .set(widths)
            .map_err(|_| TableError::Config("column widths are already specified".to_string()))
    }

    /// Widths for the columns `[offset, offset + count)`.
    pub(crate) fn columns(&self, offset: usize, count: usize) -> Result<&[f64]> {
        let widths = self
            .column_widths()
            .ok_or_else(|| TableError::Config("unspecified column width".to_string()))?;
        widths
            .get(offset..offset + count)
            .ok_or(TableError::ColumnOverflow {
                offset,
                needed: count,
                available: widths.len(),
            })
    }
}
