//! # pdftable CLI
//!
//! Usage:
//!   pdftable input.json -o output.pdf
//!   echo '{ ... }' | pdftable -o output.pdf
//!   pdftable input.json --font NotoSansSC.ttf -o output.pdf
//!   pdftable --example > table.json
//!
//! Set `RUST_LOG=debug` to trace page breaks.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use base64::Engine;
use pdftable::model::{FontEntry, Metadata, PageConfig, PageSize, RowSpec, TableDocument};
use pdftable::Result;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        match serde_json::to_string_pretty(&example_document()) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("failed to build example: {}", e)),
        }
        return;
    }

    if let Err(e) = run(&args) {
        fail(&e.to_string());
    }
}

fn run(args: &[String]) -> Result<()> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let output_path = flag_value(args, "-o").unwrap_or_else(|| "output.pdf".to_string());

    let mut document = TableDocument::from_json(&input)?;
    if let Some(font_path) = flag_value(args, "--font") {
        document.font = Some(load_font_file(&font_path)?);
    }

    let pdf_bytes = pdftable::render(&document)?;
    fs::write(&output_path, &pdf_bytes)?;
    log::info!("wrote {} bytes to {}", pdf_bytes.len(), output_path);
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

/// The argument following `flag`, if any.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

/// Read a TrueType file; the family name is taken from the file stem.
fn load_font_file(path: &str) -> Result<FontEntry> {
    let data = fs::read(path)?;
    let family = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("CustomFont")
        .to_string();
    Ok(FontEntry {
        family,
        src: Some(base64::engine::general_purpose::STANDARD.encode(data)),
    })
}

/// Ten groups, each with three sub-rows of four leaves, on short landscape
/// pages so the groups split across pages.
fn example_document() -> TableDocument {
    let rows = (0..10)
        .map(|i| RowSpec {
            values: vec![format!("data1-{}", i)],
            children: (0..3)
                .map(|j| RowSpec {
                    values: vec![format!("data2-{}", j), format!("data3-{}", j)],
                    children: (0..4)
                        .map(|k| RowSpec {
                            values: vec![format!("data4-{}", k), format!("data5-{}", k)],
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
        .collect();

    let (width, _) = PageSize::A4Landscape.dimensions();
    TableDocument {
        metadata: Metadata {
            title: Some("Nested table example".to_string()),
            author: Some("pdftable".to_string()),
            subject: None,
            creator: None,
        },
        page: PageConfig {
            size: PageSize::Custom {
                width,
                height: 200.0,
            },
            ..Default::default()
        },
        title: Some("Nested table example".to_string()),
        font_size: 10.0,
        cell_margin_h: 0.0,
        cell_margin_w: None,
        max_depth: pdftable::config::DEFAULT_MAX_DEPTH,
        heads: ["head1", "head2", "head3", "head4", "head5"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        column_widths: None,
        rows,
        font: None,
        line_width: 0.5,
    }
}
