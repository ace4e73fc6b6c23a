//! # pdftable
//!
//! Page-aware PDF tables with nested rows.
//!
//! A table is a list of rows. Each row holds a few cell values and may own
//! sub-rows that are drawn to its right, stacked vertically, so a parent cell
//! spans the full height of all its descendants. When a row does not fit on
//! the current page, the part that was not drawn continues on the next page
//! and the parent's columns are repeated there as blank cells.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    - TableDocument: page setup, head, nested rows
//!       ↓
//!   [table]    - Column widths, top-level row loop, page starts
//!       ↓
//!   [layout]   - Recursive row drawing and continuation splitting
//!       ↓
//!   [canvas]   - Cursor-based drawing surface
//!       ↓
//!   [pdf]      - PdfCanvas pages serialized to PDF bytes
//! ```
//!
//! The layout code only talks to the [`canvas::Canvas`] trait, so tables can
//! be drawn onto anything that can measure text and place bordered cells.

pub mod canvas;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod table;

pub use canvas::{Canvas, CellOptions, Margins};
pub use config::TableConfig;
pub use error::{Result, TableError};
pub use layout::Row;
pub use model::TableDocument;
pub use pdf::PdfCanvas;
pub use table::{DrawReport, Table};

use canvas::{Align, Float};
use pdf::PageGeometry;

/// Vertical space around the title text.
const TITLE_PADDING: f64 = 8.0;

/// Render a document to PDF bytes.
///
/// This is the primary entry point. Takes a table document and returns
/// the raw bytes of a valid PDF file.
pub fn render(document: &TableDocument) -> Result<Vec<u8>> {
    let (canvas, _) = draw_document(document)?;
    Ok(canvas.finish(&document.metadata))
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let document = TableDocument::from_json(json)?;
    render(&document)
}

/// Lay a document out onto a fresh [`PdfCanvas`] without serializing it.
pub fn draw_document(document: &TableDocument) -> Result<(PdfCanvas, DrawReport)> {
    let (width, height) = document.page.size.dimensions();
    let geometry = PageGeometry {
        width,
        height,
        margins: document.page.margin.into(),
    };
    if !(width - geometry.margins.horizontal() > 0.0 && height - geometry.margins.vertical() > 0.0)
    {
        return Err(TableError::Config(format!(
            "page {}x{} leaves no room inside its margins",
            width, height
        )));
    }
    if !(document.line_width.is_finite() && document.line_width >= 0.0) {
        return Err(TableError::Config(format!(
            "line width must not be negative, got {}",
            document.line_width
        )));
    }

    let mut canvas = PdfCanvas::new(geometry, document.font_context()?);
    canvas.set_line_width(document.line_width);

    let mut table = Table::new(document.table_config())?;

    if let Some(title) = &document.title {
        canvas.set_font_size(document.font_size);
        let width = canvas.content_width();
        canvas.draw_cell(
            width,
            document.font_size + TITLE_PADDING,
            title,
            CellOptions {
                align: Align::CENTER,
                border: false,
                float: Float::Bottom,
            },
        );
    }

    // Widths must be final before rows are built: rows with their own
    // configuration copy them.
    match (&document.column_widths, document.heads.is_empty()) {
        (Some(widths), heads_empty) => {
            table.set_column_widths(widths.clone())?;
            if !heads_empty {
                table.add_row(Row::new(document.heads.iter().cloned()), None);
            }
        }
        (None, false) => table.define_head(&mut canvas, &document.heads)?,
        (None, true) => {
            return Err(TableError::Config(
                "document needs heads or columnWidths".to_string(),
            ))
        }
    }

    for row in document.build_rows(table.config()) {
        table.add_row(row, None);
    }

    let report = table.draw(&mut canvas)?;
    log::info!(
        "drew {} row(s) on {} page(s)",
        report.rows_emitted,
        canvas.pages().len()
    );
    Ok((canvas, report))
}
