//! # Table Driver
//!
//! Owns the top-level rows and the default configuration, sets up the head,
//! and walks the rows page by page. Each top-level row is drawn at the
//! canvas cursor; when it reports a page break the driver starts a new page
//! and draws whatever remains there, for as many pages as it takes.

use std::rc::Rc;

use log::{debug, info};

use crate::canvas::Canvas;
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::layout::columns::resolve_head_widths;
use crate::layout::{PendingRow, Row, RowPainter};

#[derive(Debug)]
pub struct Table {
    config: Rc<TableConfig>,
    rows: Vec<Row>,
}

/// Summary of a completed `Table::draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawReport {
    /// Pages started by the table itself.
    pub pages_added: usize,
    /// Caller-built rows whose cells were drawn.
    pub rows_emitted: usize,
}

impl Table {
    pub fn new(config: TableConfig) -> Result<Self> {
        Self::with_shared(Rc::new(config))
    }

    /// Build a table around a configuration that rows may also hold.
    pub fn with_shared(config: Rc<TableConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rows: Vec::new(),
        })
    }

    pub fn config(&self) -> &Rc<TableConfig> {
        &self.config
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Measure the head labels, derive the column widths from them and the
    /// page width, and append the labels as the first row.
    pub fn define_head<C, S>(&mut self, canvas: &mut C, labels: &[S]) -> Result<()>
    where
        C: Canvas + ?Sized,
        S: AsRef<str>,
    {
        if self.config.column_widths().is_some() {
            return Err(TableError::Config(
                "column widths are already specified".to_string(),
            ));
        }
        if labels.is_empty() {
            return Err(TableError::Config("table head has no columns".to_string()));
        }

        canvas.set_font_size(self.config.font_size);
        let measured: Vec<f64> = labels
            .iter()
            .map(|label| canvas.measure_text_width(label.as_ref()))
            .collect();
        let widths =
            resolve_head_widths(&measured, canvas.content_width(), self.config.cell_margin_w);
        debug!("head widths: {:?}", widths);
        self.config.set_column_widths(widths)?;

        self.rows
            .push(Row::new(labels.iter().map(|label| label.as_ref().to_string())));
        Ok(())
    }

    /// Let `render` draw a custom head and return the column widths it used.
    pub fn draw_head_with<C, F>(&mut self, canvas: &mut C, render: F) -> Result<()>
    where
        C: Canvas + ?Sized,
        F: FnOnce(&mut C) -> Vec<f64>,
    {
        if self.config.column_widths().is_some() {
            return Err(TableError::Config(
                "column widths are already specified".to_string(),
            ));
        }
        let widths = render(canvas);
        self.config.set_column_widths(widths)
    }

    /// Use explicit column widths instead of a measured head.
    pub fn set_column_widths(&mut self, widths: Vec<f64>) -> Result<()> {
        self.config.set_column_widths(widths)
    }

    /// Append a top-level row. Without an override it uses the table's
    /// configuration.
    pub fn add_row(&mut self, mut row: Row, config: Option<Rc<TableConfig>>) {
        row.set_config(config);
        self.rows.push(row);
    }

    /// Draw every row, starting at the canvas cursor.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> Result<DrawReport> {
        if self.config.column_widths().is_none() {
            return Err(TableError::Config("unspecified column width".to_string()));
        }
        for row in &self.rows {
            row.validate(&self.config, 0, 1)?;
        }

        canvas.set_font_size(self.config.font_size);
        let mut painter = RowPainter::new(canvas);
        let mut report = DrawReport::default();

        for (index, row) in self.rows.iter().enumerate() {
            let mut pending = PendingRow::Source(row);
            let mut fresh_page = false;
            loop {
                let emitted = painter.emitted();
                let (x, y) = {
                    let canvas = painter.canvas();
                    (canvas.x(), canvas.y())
                };
                let outcome = painter.draw(pending, x, y, 0.0, 0, &self.config)?;
                let Some(rest) = outcome.remainder else {
                    break;
                };

                if fresh_page && painter.emitted() == emitted {
                    let available = painter.canvas().remaining_height(y);
                    return Err(TableError::LayoutOverflow {
                        row: index,
                        available,
                    });
                }

                painter.canvas().add_page();
                report.pages_added += 1;
                fresh_page = true;
                debug!(
                    "row {} continues on a new page ({})",
                    index,
                    if rest.is_continuation() { "split" } else { "whole" }
                );
                pending = rest;
            }
        }

        report.rows_emitted = painter.emitted();
        info!(
            "drew {} row(s), {} page break(s)",
            report.rows_emitted, report.pages_added
        );
        Ok(report)
    }
}
