//! Integration tests for the pdftable rendering pipeline.
//!
//! These tests exercise the full path from JSON input to PDF output.
//! They verify:
//! - JSON deserialization works correctly
//! - Nested rows split across pages without losing or repeating cells
//! - Column widths come from the head or from explicit widths
//! - Configuration and layout errors surface as the right variants
//! - PDF output is structurally valid

use std::collections::HashMap;
use std::rc::Rc;

use pdftable::canvas::Canvas;
use pdftable::model::TableDocument;
use pdftable::pdf::{PageGeometry, PdfCanvas};
use pdftable::font::FontContext;
use pdftable::{draw_document, render, render_json, Margins, Row, Table, TableConfig, TableError};

// ─── Helpers ────────────────────────────────────────────────────

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "Missing trailer"
    );
}

fn count_occurrences(bytes: &[u8], needle: &[u8]) -> usize {
    bytes.windows(needle.len()).filter(|w| *w == needle).count()
}

/// How often each non-empty cell text was drawn, over all pages.
fn text_counts(canvas: &PdfCanvas) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for page in canvas.pages() {
        for cell in &page.cells {
            let text = cell.lines.join(" ");
            if !text.is_empty() {
                *counts.entry(text).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// The nested layout of the bundled example: `groups` top-level rows, each
/// with three sub-rows of four leaves, on short A4-landscape-wide pages.
fn nested_document_json(groups: usize, page_height: f64) -> String {
    let rows: Vec<serde_json::Value> = (0..groups)
        .map(|i| {
            let subs: Vec<serde_json::Value> = (0..3)
                .map(|j| {
                    let leaves: Vec<serde_json::Value> = (0..4)
                        .map(|k| serde_json::json!({ "values": [format!("data4-{}", k), format!("data5-{}", k)] }))
                        .collect();
                    serde_json::json!({
                        "values": [format!("data2-{}", j), format!("data3-{}", j)],
                        "children": leaves
                    })
                })
                .collect();
            serde_json::json!({ "values": [format!("data1-{}", i)], "children": subs })
        })
        .collect();

    serde_json::json!({
        "metadata": { "title": "Nested", "author": "Tests" },
        "page": {
            "size": { "Custom": { "width": 841.89, "height": page_height } },
            "margin": { "top": 30, "right": 30, "bottom": 30, "left": 30 }
        },
        "title": "Nested table",
        "heads": ["head1", "head2", "head3", "head4", "head5"],
        "rows": rows
    })
    .to_string()
}

// ─── JSON to PDF ────────────────────────────────────────────────

#[test]
fn test_minimal_json_renders() {
    let bytes = render_json(r#"{"heads": ["name", "qty"], "rows": [{"values": ["apple", "3"]}]}"#)
        .expect("render failed");
    assert_valid_pdf(&bytes);
    assert_eq!(count_occurrences(&bytes, b"/Type /Page "), 1);
}

#[test]
fn test_content_streams_are_compressed() {
    let bytes = render_json(&nested_document_json(2, 200.0)).unwrap();
    assert_valid_pdf(&bytes);
    assert!(count_occurrences(&bytes, b"/FlateDecode") >= 2);
}

#[test]
fn test_metadata_reaches_info_dictionary() {
    let bytes = render_json(&nested_document_json(1, 400.0)).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Title (Nested)"));
    assert!(text.contains("/Author (Tests)"));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = render_json(r#"{"heads": ["a"], "rows": [}"#).unwrap_err();
    assert!(matches!(err, TableError::Parse { .. }));
    assert!(err.to_string().contains("Hint"));
}

// ─── Page breaking ──────────────────────────────────────────────

#[test_log::test]
fn test_nested_groups_span_pages_without_loss() {
    let doc = TableDocument::from_json(&nested_document_json(10, 200.0)).unwrap();
    let (canvas, report) = draw_document(&doc).unwrap();

    assert!(canvas.pages().len() > 1);
    assert_eq!(report.pages_added, canvas.pages().len() - 1);
    // Head, then per group: 1 + 3 sub-rows + 12 leaves.
    assert_eq!(report.rows_emitted, 1 + 10 * 16);

    let counts = text_counts(&canvas);
    for i in 0..10 {
        assert_eq!(counts[&format!("data1-{}", i)], 1, "data1-{}", i);
    }
    for j in 0..3 {
        assert_eq!(counts[&format!("data2-{}", j)], 10);
        assert_eq!(counts[&format!("data3-{}", j)], 10);
    }
    for k in 0..4 {
        assert_eq!(counts[&format!("data4-{}", k)], 30);
        assert_eq!(counts[&format!("data5-{}", k)], 30);
    }
    assert_eq!(counts["head1"], 1);
    assert_eq!(counts["Nested table"], 1);
}

#[test]
fn test_cells_stay_inside_the_bottom_margin() {
    let doc = TableDocument::from_json(&nested_document_json(6, 200.0)).unwrap();
    let (canvas, _) = draw_document(&doc).unwrap();

    for (p, page) in canvas.pages().iter().enumerate() {
        for cell in &page.cells {
            assert!(
                cell.y + cell.height <= 170.0 + 1e-9,
                "page {} cell {:?} ends at {}",
                p,
                cell.lines,
                cell.y + cell.height
            );
        }
    }
}

#[test]
fn test_continuation_pages_start_with_blank_parent_cells() {
    let doc = TableDocument::from_json(&nested_document_json(10, 200.0)).unwrap();
    let (canvas, _) = draw_document(&doc).unwrap();

    let mut saw_blank = false;
    for page in &canvas.pages()[1..] {
        // Sub-rows are drawn before their parent, so look the corner cell up.
        let corner = page
            .cells
            .iter()
            .find(|c| c.x == 30.0 && c.y == 30.0)
            .expect("nothing drawn at the top-left corner");
        if corner.lines.iter().all(|l| l.is_empty()) {
            saw_blank = true;
        }
    }
    assert!(saw_blank, "no group was split across a page boundary");
}

#[test]
fn test_taller_pages_need_fewer_breaks() {
    let short = TableDocument::from_json(&nested_document_json(10, 200.0)).unwrap();
    let tall = TableDocument::from_json(&nested_document_json(10, 595.28)).unwrap();
    let (short_canvas, _) = draw_document(&short).unwrap();
    let (tall_canvas, _) = draw_document(&tall).unwrap();
    assert!(tall_canvas.pages().len() < short_canvas.pages().len());
}

#[test]
fn test_wrapped_text_grows_the_row() {
    let doc = TableDocument::from_json(
        r#"{"columnWidths": [40], "rows": [{"values": ["aaaa bbbb cccc dddd"]}]}"#,
    )
    .unwrap();
    let (canvas, _) = draw_document(&doc).unwrap();
    let cell = &canvas.pages()[0].cells[0];
    // About 95pt of text in a 40pt column: three lines of 10pt.
    assert_eq!(cell.height, 30.0);
}

#[test]
fn test_row_font_size_reaches_the_pdf_cells() {
    let doc = TableDocument::from_json(
        r#"{"columnWidths": [300], "rows": [{"values": ["big"], "fontSize": 20}, {"values": ["small"]}]}"#,
    )
    .unwrap();
    let (canvas, _) = draw_document(&doc).unwrap();
    let cells: Vec<(String, f64, f64)> = canvas.pages()[0]
        .cells
        .iter()
        .map(|c| (c.lines.join(" "), c.font_size, c.height))
        .collect();
    assert_eq!(
        cells,
        vec![("big".to_string(), 20.0, 20.0), ("small".to_string(), 10.0, 10.0)]
    );
}

#[test]
fn test_text_blocks_fit_their_cells() {
    let docs = [
        r#"{"columnWidths": [60], "rows": [{"values": ["aaaaaaa bbbbbbb ccccccc"]}]}"#.to_string(),
        r#"{"columnWidths": [40], "rows": [{"values": ["aaaa bbbb cccc dddd"]}]}"#.to_string(),
        nested_document_json(4, 200.0),
    ];
    for json in &docs {
        let doc = TableDocument::from_json(json).unwrap();
        let (canvas, _) = draw_document(&doc).unwrap();
        for page in canvas.pages() {
            for cell in &page.cells {
                let (size, pitch) = cell.text_metrics();
                assert!(size <= pitch + 1e-9, "{:?}", cell.lines);
                assert!(
                    cell.text_block_height() <= cell.height + 1e-9,
                    "{:?} needs {} in a {}pt cell",
                    cell.lines,
                    cell.text_block_height(),
                    cell.height
                );
            }
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────

#[test]
fn test_row_wider_than_head_is_rejected_before_drawing() {
    let err = render_json(
        r#"{"heads": ["a", "b"], "rows": [{"values": ["1"], "children": [{"values": ["2", "3"]}]}]}"#,
    )
    .unwrap_err();
    assert!(err.is_config());
    assert!(matches!(
        err,
        TableError::ColumnOverflow {
            offset: 1,
            needed: 2,
            available: 2
        }
    ));
}

#[test]
fn test_nesting_limit() {
    let err = render_json(
        r#"{"maxDepth": 2, "columnWidths": [10, 10, 10],
            "rows": [{"values": ["a"], "children": [{"values": ["b"], "children": [{"values": ["c"]}]}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, TableError::NestingTooDeep { depth: 3, limit: 2 }));
}

#[test]
fn test_row_taller_than_a_page_is_a_layout_error() {
    let err = render_json(
        r#"{"page": {"size": {"Custom": {"width": 300, "height": 100}}},
            "heads": ["a"],
            "rows": [{"values": ["x"], "cellMarginH": 50}]}"#,
    )
    .unwrap_err();
    match err {
        TableError::LayoutOverflow { row, available } => {
            assert_eq!(row, 1);
            assert!((available - 40.0).abs() < 1e-9);
        }
        other => panic!("expected LayoutOverflow, got {:?}", other),
    }
}

#[test]
fn test_invalid_font_data() {
    let err = render_json(
        r#"{"heads": ["a"], "rows": [], "font": {"family": "Broken", "src": "AAECAw=="}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, TableError::Font(_)));
}

// ─── Library API ────────────────────────────────────────────────

#[test]
fn test_table_api_on_pdf_canvas() {
    let mut canvas = PdfCanvas::new(
        PageGeometry {
            width: 400.0,
            height: 300.0,
            margins: Margins::uniform(20.0),
        },
        FontContext::new(),
    );
    let mut table = Table::new(TableConfig::new(10.0).with_cell_margin_h(6.0)).unwrap();
    table.define_head(&mut canvas, &["group", "item", "count"]).unwrap();

    let widths = table.config().column_widths().unwrap().to_vec();
    assert!((widths.iter().sum::<f64>() - canvas.content_width()).abs() < 1e-9);

    let roomy = Rc::new({
        let config = TableConfig::new(10.0).with_cell_margin_h(20.0);
        config.set_column_widths(widths).unwrap();
        config
    });
    let mut group = Row::new(["fruit"]);
    group.add_child(Row::new(["apple", "3"]), None);
    group.add_child(Row::new(["pear", "5"]), Some(roomy));
    table.add_row(group, None);

    let report = table.draw(&mut canvas).unwrap();
    assert_eq!(report.rows_emitted, 4);
    assert_eq!(report.pages_added, 0);

    let cells = &canvas.pages()[0].cells;
    // head (3), apple, 3, pear, 5, then the parent
    assert_eq!(cells.len(), 8);
    let fruit = &cells[7];
    assert_eq!(fruit.lines, vec!["fruit"]);
    // 16pt for apple plus 30pt for pear.
    assert_eq!(fruit.height, 46.0);

    let bytes = canvas.finish(&Default::default());
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_document_struct() {
    let doc = TableDocument::from_json(&nested_document_json(3, 300.0)).unwrap();
    let bytes = render(&doc).unwrap();
    assert_valid_pdf(&bytes);
    assert!(count_occurrences(&bytes, b"/Type /Page ") >= 2);
}
