//! # Row Layout
//!
//! Rows form a tree: a row's values occupy a run of columns, and its
//! children stack vertically in the columns immediately to its right.
//!
//! Drawing is depth-first. A row first works out how tall it must be to
//! hold its own text, checks that this fits above the bottom margin, draws
//! its children (each at least as tall as the row itself), and only then
//! draws its own cells, stretched to cover whatever its children consumed.
//! That order is what keeps parent and child borders aligned.
//!
//! When a child runs out of page, the row stops, draws what it has, and
//! hands back a [`Continuation`]: blank cells in its own columns plus the
//! undrawn part of its children. The caller starts a new page and draws the
//! continuation there. Nothing already on the page is drawn twice.

pub mod columns;
pub mod page_break;

use std::rc::Rc;

use log::{debug, trace};

use crate::canvas::{Canvas, CellOptions};
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use columns::span_width;
use page_break::{cell_height, decide_break, lines_needed, BreakDecision};

/// A node in the row tree, built by the caller before drawing.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<String>,
    children: Vec<Row>,
    /// `None` inherits the configuration of whatever draws this row.
    config: Option<Rc<TableConfig>>,
}

impl Row {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            children: Vec::new(),
            config: None,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn children(&self) -> &[Row] {
        &self.children
    }

    pub fn config(&self) -> Option<&Rc<TableConfig>> {
        self.config.as_ref()
    }

    pub(crate) fn set_config(&mut self, config: Option<Rc<TableConfig>>) {
        if config.is_some() {
            self.config = config;
        }
    }

    /// Attach a sub-row. Without an explicit configuration the child uses
    /// this row's.
    pub fn add_child(&mut self, mut child: Row, config: Option<Rc<TableConfig>>) {
        child.set_config(config);
        self.children.push(child);
    }

    pub fn with_child(mut self, child: Row) -> Self {
        self.add_child(child, None);
        self
    }

    pub fn with_config(mut self, config: Rc<TableConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Number of rows on the longest path from this row to a leaf.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Row::depth).max().unwrap_or(0)
    }

    /// Check column coverage and nesting for the whole subtree without
    /// touching a canvas.
    pub(crate) fn validate(
        &self,
        inherited: &TableConfig,
        offset: usize,
        depth: usize,
    ) -> Result<()> {
        let config = self.config.as_deref().unwrap_or(inherited);
        config.validate()?;
        if depth > config.max_depth {
            return Err(TableError::NestingTooDeep {
                depth,
                limit: config.max_depth,
            });
        }
        config.columns(offset, self.values.len())?;
        let child_offset = offset + self.values.len();
        for child in &self.children {
            child.validate(config, child_offset, depth + 1)?;
        }
        Ok(())
    }
}

/// A row waiting to be drawn.
#[derive(Debug, Clone)]
pub enum PendingRow<'a> {
    /// A caller-built row, drawn in full.
    Source(&'a Row),
    /// The undrawn remainder of a row split by a page break.
    Continuation(Continuation<'a>),
}

/// What is left of a row after a page break: its columns, left blank, and
/// the children that did not make it onto the page.
#[derive(Debug, Clone)]
pub struct Continuation<'a> {
    origin: &'a Row,
    /// The child that broke, either untouched or as its own continuation.
    head: Option<Box<PendingRow<'a>>>,
    /// Siblings after the broken child, not yet drawn.
    tail: &'a [Row],
}

impl<'a> Continuation<'a> {
    fn new(origin: &'a Row, head: PendingRow<'a>, tail: &'a [Row]) -> Self {
        Self {
            origin,
            head: Some(Box::new(head)),
            tail,
        }
    }

    /// The caller-built row this continues.
    pub fn origin(&self) -> &'a Row {
        self.origin
    }

    pub fn head(&self) -> Option<&PendingRow<'a>> {
        self.head.as_deref()
    }

    pub fn tail(&self) -> &'a [Row] {
        self.tail
    }
}

impl<'a> PendingRow<'a> {
    pub fn origin(&self) -> &'a Row {
        match self {
            PendingRow::Source(row) => *row,
            PendingRow::Continuation(cont) => cont.origin,
        }
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self, PendingRow::Continuation(_))
    }

    /// Text for cell `i`. Continuations leave the row header blank.
    fn value(&self, i: usize) -> &'a str {
        match self {
            PendingRow::Source(row) => {
                let row: &'a Row = *row;
                row.values[i].as_str()
            }
            PendingRow::Continuation(_) => "",
        }
    }

    fn column_count(&self) -> usize {
        self.origin().values.len()
    }

    fn config(&self, inherited: &'a TableConfig) -> &'a TableConfig {
        self.origin().config.as_deref().unwrap_or(inherited)
    }

    /// Split into the pending head child and the untouched source children.
    fn into_children(self) -> (Option<PendingRow<'a>>, &'a [Row]) {
        match self {
            PendingRow::Source(row) => (None, &row.children),
            PendingRow::Continuation(cont) => (cont.head.map(|h| *h), cont.tail),
        }
    }
}

/// Result of drawing one row.
#[derive(Debug)]
pub struct RowOutcome<'a> {
    /// Height actually drawn; zero if the row did not fit at all.
    pub height: f64,
    /// What still has to go on the next page. `Some` signals a page break.
    pub remainder: Option<PendingRow<'a>>,
}

impl RowOutcome<'_> {
    pub fn page_break(&self) -> bool {
        self.remainder.is_some()
    }
}

/// Draws row trees onto a canvas.
pub struct RowPainter<'c, C: Canvas + ?Sized> {
    canvas: &'c mut C,
    emitted: usize,
}

impl<'c, C: Canvas + ?Sized> RowPainter<'c, C> {
    pub fn new(canvas: &'c mut C) -> Self {
        Self { canvas, emitted: 0 }
    }

    /// Number of caller-built rows whose cells have been drawn so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn canvas(&mut self) -> &mut C {
        &mut *self.canvas
    }

    /// Draw `row` with its top-left corner at `(x, y)`.
    ///
    /// `min_height` comes from the parent so siblings share its height;
    /// `offset` is the index of the first column this row's values occupy.
    pub fn draw<'a>(
        &mut self,
        row: PendingRow<'a>,
        x: f64,
        y: f64,
        min_height: f64,
        offset: usize,
        inherited: &'a TableConfig,
    ) -> Result<RowOutcome<'a>> {
        let config = row.config(inherited);
        let count = row.column_count();
        let widths = config.columns(offset, count)?;
        self.canvas.set_font_size(config.font_size);

        let min_height = self.own_min_height(&row, widths, config).max(min_height);

        let remaining = self.canvas.remaining_height(y);
        if decide_break(remaining, min_height) == BreakDecision::MoveToNextPage {
            trace!(
                "row at column {} needs {:.2}pt, {:.2}pt left; deferring",
                offset,
                min_height,
                remaining
            );
            self.canvas.set_font_size(inherited.font_size);
            return Ok(RowOutcome {
                height: 0.0,
                remainder: Some(row),
            });
        }

        let origin = row.origin();
        let values: Option<&'a [String]> = match &row {
            PendingRow::Source(source) => {
                let source: &'a Row = *source;
                Some(source.values.as_slice())
            }
            PendingRow::Continuation(_) => None,
        };
        let (head, tail) = row.into_children();

        let child_x = x + span_width(widths);
        let child_offset = offset + count;
        let mut child_y = y;
        let mut remainder = None;

        if let Some(head) = head {
            let outcome = self.draw(head, child_x, child_y, min_height, child_offset, config)?;
            child_y += outcome.height;
            if let Some(rest) = outcome.remainder {
                remainder = Some(Continuation::new(origin, rest, tail));
            }
        }
        if remainder.is_none() {
            for (i, child) in tail.iter().enumerate() {
                let outcome = self.draw(
                    PendingRow::Source(child),
                    child_x,
                    child_y,
                    min_height,
                    child_offset,
                    config,
                )?;
                child_y += outcome.height;
                if let Some(rest) = outcome.remainder {
                    remainder = Some(Continuation::new(origin, rest, &tail[i + 1..]));
                    break;
                }
            }
        }
        if let Some(cont) = &remainder {
            debug!(
                "split row at column {}: {} sibling(s) deferred behind the broken child",
                offset,
                cont.tail.len()
            );
        }

        let height = min_height.max(child_y - y);

        // Children may have switched to their own font size.
        self.canvas.set_font_size(config.font_size);
        self.canvas.set_xy(x, y);
        for (i, width) in widths.iter().enumerate() {
            let text = values.map_or("", |v| v[i].as_str());
            self.canvas.draw_cell(*width, height, text, CellOptions::default());
        }
        self.canvas.line_break(height);
        self.canvas.set_font_size(inherited.font_size);
        if values.is_some() {
            self.emitted += 1;
        }

        Ok(RowOutcome {
            height,
            remainder: remainder.map(PendingRow::Continuation),
        })
    }

    /// Tallest cell among this row's own values.
    fn own_min_height(&self, row: &PendingRow<'_>, widths: &[f64], config: &TableConfig) -> f64 {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let text_width = self.canvas.measure_text_width(row.value(i));
                cell_height(lines_needed(text_width, *width), config.line_height())
            })
            .fold(0.0, f64::max)
    }
}
