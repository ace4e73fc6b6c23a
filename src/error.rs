//! Structured error types for table layout and rendering.
//!
//! Configuration problems are reported before anything touches the canvas.
//! Layout overflow can only be detected mid-draw, so pages emitted before it
//! stay valid.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table was configured inconsistently (widths missing, set twice, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// A row needs more columns than the configured widths provide.
    #[error(
        "configuration error: row at column {offset} needs {needed} column(s) but only {available} width(s) are defined"
    )]
    ColumnOverflow {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Rows are nested deeper than the configured bound.
    #[error("configuration error: rows nested {depth} levels deep, limit is {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    /// A top-level row cannot make progress even on a freshly started page.
    #[error("layout error: row {row} does not fit on an empty page ({available:.2}pt available)")]
    LayoutOverflow { row: usize, available: f64 },

    /// JSON input failed to parse as a table document.
    #[error("failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A font could not be decoded or parsed.
    #[error("font error: {0}")]
    Font(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    /// True for every error raised before drawing starts.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            TableError::Config(_)
                | TableError::ColumnOverflow { .. }
                | TableError::NestingTooDeep { .. }
        )
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the table document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        TableError::Parse { source: e, hint }
    }
}
