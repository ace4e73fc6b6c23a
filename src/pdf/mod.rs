//! # PDF Serializer
//!
//! Takes the pages recorded by a [`PdfCanvas`] and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer covering just what tables need:
//! stroked rectangles, single-font text, and an optional embedded TrueType
//! font.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

mod canvas;

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{HAlign, VAlign};
use crate::font::{CustomFontMetrics, FontContext, FontData};
use crate::model::Metadata;
pub use canvas::{
    wrap_text, CanvasPage, PageGeometry, PdfCanvas, PlacedCell, DEFAULT_LINE_WIDTH, LINE_SPACING,
};
/// Gap between a cell border and left/right aligned text.
const TEXT_INSET: f64 = 2.0;

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    /// Reserve an object slot and return its id.
    fn reserve(&mut self) -> usize {
        self.objects.push(PdfObject { data: Vec::new() });
        self.objects.len() - 1
    }

    fn set(&mut self, id: usize, data: Vec<u8>) {
        self.objects[id].data = data;
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.reserve();
        self.set(id, data);
        id
    }

    /// Add a Flate-compressed stream object.
    fn push_stream(&mut self, raw: &[u8], extra_dict: &str) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {} /Filter /FlateDecode{} >>\nstream\n",
            compressed.len(),
            extra_dict
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the canvas pages to a PDF byte vector.
    pub fn write(&self, canvas: &PdfCanvas, metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = font objects, then page objects and content streams
        builder.reserve();
        builder.reserve();
        builder.reserve();

        let font = canvas.font();
        let font_obj_id = self.register_font(&mut builder, canvas.pages(), font);

        let geometry = canvas.geometry();
        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in canvas.pages() {
            let content = self.build_content_stream(page, geometry.height, font, canvas.line_width());
            let content_obj_id = builder.push_stream(content.as_bytes(), "");

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << /F0 {} 0 R >> >> >>",
                geometry.width, geometry.height, content_obj_id, font_obj_id
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.set(1, b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.set(
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids,
                page_obj_ids.len()
            )
            .into_bytes(),
        );

        let info_obj_id = self.write_info(&mut builder, metadata);

        log::debug!(
            "serializing {} page(s), {} object(s)",
            page_obj_ids.len(),
            builder.objects.len() - 1
        );
        self.serialize(&builder, info_obj_id)
    }

    /// Info dictionary, when there is any metadata to record.
    fn write_info(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        if metadata.title.is_none() && metadata.author.is_none() && metadata.subject.is_none() {
            return None;
        }
        let mut info = String::from("<< ");
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", key, Self::escape_pdf_string(value));
            }
        }
        let creator = metadata.creator.as_deref().unwrap_or("pdftable");
        let _ = write!(
            info,
            "/Producer (pdftable {}) /Creator ({}) >>",
            env!("CARGO_PKG_VERSION"),
            Self::escape_pdf_string(creator)
        );
        Some(builder.push(info.into_bytes()))
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &CanvasPage,
        page_height: f64,
        font: &FontContext,
        line_width: f64,
    ) -> String {
        let mut stream = String::new();
        let _ = writeln!(stream, "{:.2} w\n0 0 0 RG\n0 0 0 rg", line_width);
        for cell in &page.cells {
            self.write_cell(&mut stream, cell, page_height, font);
        }
        stream
    }

    /// Write one cell: its border, then each text line.
    fn write_cell(&self, stream: &mut String, cell: &PlacedCell, page_height: f64, font: &FontContext) {
        if cell.border {
            let y = page_height - cell.y - cell.height;
            let _ = writeln!(
                stream,
                "{:.2} {:.2} {:.2} {:.2} re\nS",
                cell.x, y, cell.width, cell.height
            );
        }

        if cell.lines.iter().all(|l| l.is_empty()) {
            return;
        }

        let (size, line_height) = cell.text_metrics();
        let block_height = cell.text_block_height();
        let top = match cell.align.vertical {
            VAlign::Top => cell.y,
            VAlign::Middle => cell.y + (cell.height - block_height) / 2.0,
            VAlign::Bottom => cell.y + cell.height - block_height,
        };
        let baseline_offset = (line_height + font.cap_height_ratio() * size) / 2.0;

        let _ = writeln!(stream, "BT\n/F0 {:.1} Tf", size);
        let mut prev = (0.0, 0.0);
        for (i, line) in cell.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let text_width = font.measure_string(line, size);
            let x = match cell.align.horizontal {
                HAlign::Left => cell.x + TEXT_INSET,
                HAlign::Center => cell.x + (cell.width - text_width) / 2.0,
                HAlign::Right => cell.x + cell.width - text_width - TEXT_INSET,
            };
            let y = page_height - (top + i as f64 * line_height + baseline_offset);
            // Td is relative to the previous line start.
            let _ = writeln!(stream, "{:.2} {:.2} Td", x - prev.0, y - prev.1);
            prev = (x, y);
            let _ = writeln!(stream, "{} Tj", Self::encode_text(line, font));
        }
        let _ = writeln!(stream, "ET");
    }

    /// Encode a text run for the content stream.
    fn encode_text(text: &str, font: &FontContext) -> String {
        match font.font() {
            FontData::Standard(_) => format!("({})", Self::escape_pdf_string(text)),
            FontData::Custom { metrics, .. } => {
                let mut hex = String::with_capacity(text.len() * 4 + 2);
                hex.push('<');
                for ch in text.chars() {
                    let _ = write!(hex, "{:04X}", metrics.glyph_id(ch));
                }
                hex.push('>');
                hex
            }
        }
    }

    /// Register the canvas font and return the id of the object pages refer to.
    fn register_font(&self, builder: &mut PdfBuilder, pages: &[CanvasPage], font: &FontContext) -> usize {
        match font.font() {
            FontData::Standard(std_font) => builder.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                     /Encoding /WinAnsiEncoding >>",
                    std_font.pdf_name()
                )
                .into_bytes(),
            ),
            FontData::Custom {
                family,
                data,
                metrics,
            } => {
                let used = Self::collect_glyphs(pages, metrics);
                self.embed_truetype(builder, family, data, metrics, &used)
            }
        }
    }

    /// Glyph ids used anywhere in the document, with `.notdef` always present.
    fn collect_glyphs(pages: &[CanvasPage], metrics: &CustomFontMetrics) -> BTreeSet<(u16, char)> {
        let mut used = BTreeSet::new();
        for page in pages {
            for cell in &page.cells {
                for line in &cell.lines {
                    for ch in line.chars() {
                        used.insert((metrics.glyph_id(ch), ch));
                    }
                }
            }
        }
        used
    }

    /// Embed a TrueType font as a Type0 font with Identity-H encoding, so
    /// content streams address glyphs directly by id.
    fn embed_truetype(
        &self,
        builder: &mut PdfBuilder,
        family: &str,
        data: &[u8],
        metrics: &CustomFontMetrics,
        used: &BTreeSet<(u16, char)>,
    ) -> usize {
        let base_font = Self::pdf_name(family);

        let font_file_id = builder.push_stream(data, &format!(" /Length1 {}", data.len()));

        let (x_min, y_min, x_max, y_max) = metrics.bbox;
        let descriptor_id = builder.push(
            format!(
                "<< /Type /FontDescriptor /FontName /{} /Flags 32 \
                 /FontBBox [{:.0} {:.0} {:.0} {:.0}] /ItalicAngle 0 \
                 /Ascent {:.0} /Descent {:.0} /CapHeight {:.0} /StemV 80 \
                 /FontFile2 {} 0 R >>",
                base_font,
                metrics.to_pdf_units(x_min as f64),
                metrics.to_pdf_units(y_min as f64),
                metrics.to_pdf_units(x_max as f64),
                metrics.to_pdf_units(y_max as f64),
                metrics.to_pdf_units(metrics.ascender as f64),
                metrics.to_pdf_units(metrics.descender as f64),
                metrics.to_pdf_units(metrics.cap_height as f64),
                font_file_id
            )
            .into_bytes(),
        );

        let mut widths = String::new();
        let mut last_gid = None;
        for (gid, ch) in used {
            if last_gid == Some(*gid) {
                continue;
            }
            last_gid = Some(*gid);
            let advance = metrics.to_pdf_units(metrics.advance(*ch) as f64);
            let _ = write!(widths, "{} [{:.0}] ", gid, advance);
        }

        let cid_font_id = builder.push(
            format!(
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor {} 0 R /DW {:.0} /W [{}] /CIDToGIDMap /Identity >>",
                base_font,
                descriptor_id,
                metrics.to_pdf_units(metrics.default_advance as f64),
                widths.trim_end(),
            )
            .into_bytes(),
        );

        let to_unicode_id = builder.push_stream(Self::to_unicode_cmap(used).as_bytes(), "");

        builder.push(
            format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
                 /DescendantFonts [{} 0 R] /ToUnicode {} 0 R >>",
                base_font, cid_font_id, to_unicode_id
            )
            .into_bytes(),
        )
    }

    /// CMap mapping glyph ids back to text, so viewers can copy and search.
    fn to_unicode_cmap(used: &BTreeSet<(u16, char)>) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let mapped: Vec<&(u16, char)> = used.iter().filter(|(gid, _)| *gid != 0).collect();
        for chunk in mapped.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for (gid, ch) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, hex);
            }
            let _ = writeln!(cmap, "endbfchar");
        }
        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }

    /// A PDF name token built from a font family.
    fn pdf_name(family: &str) -> String {
        let name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            "CustomFont".to_string()
        } else {
            name
        }
    }

    /// Escape a string for a PDF literal. Characters outside Latin-1 become
    /// `?` since standard fonts use WinAnsi encoding.
    fn escape_pdf_string(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '(' => out.push_str("\\("),
                ')' => out.push_str("\\)"),
                c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
                c => match win_ansi_byte(c) {
                    Some(byte) => {
                        let _ = write!(out, "\\{:03o}", byte);
                    }
                    None => out.push('?'),
                },
            }
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

/// WinAnsiEncoding byte for a non-ASCII character.
///
/// 0xA0-0xFF match Latin-1. 0x80-0x9F hold typographic characters, so the
/// C1 control code points have no encoding.
fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, CellOptions, Margins};
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn canvas() -> PdfCanvas {
        PdfCanvas::new(
            PageGeometry {
                width: 595.28,
                height: 841.89,
                margins: Margins::uniform(30.0),
            },
            FontContext::new(),
        )
    }

    /// Inflate every content stream in the file.
    fn content_streams(bytes: &[u8]) -> Vec<String> {
        let mut streams = Vec::new();
        let mut rest = bytes;
        while let Some(start) = find(rest, b"stream\n") {
            let body = &rest[start + 7..];
            let end = find(body, b"\nendstream").expect("unterminated stream");
            if let Ok(raw) = decompress_to_vec_zlib(&body[..end]) {
                streams.push(String::from_utf8_lossy(&raw).into_owned());
            }
            rest = &body[end + b"\nendstream".len()..];
        }
        streams
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(
            PdfWriter::escape_pdf_string("Hello (World)"),
            "Hello \\(World\\)"
        );
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
        assert_eq!(PdfWriter::escape_pdf_string("caf\u{e9}"), "caf\\351");
        assert_eq!(PdfWriter::escape_pdf_string("\u{4e2d}"), "?");
    }

    #[test]
    fn test_escape_uses_win_ansi_for_typographic_chars() {
        assert_eq!(PdfWriter::escape_pdf_string("5\u{20ac}"), "5\\200");
        assert_eq!(PdfWriter::escape_pdf_string("a\u{2013}b"), "a\\226b");
        assert_eq!(PdfWriter::escape_pdf_string("\u{201c}q\u{201d}"), "\\223q\\224");
        // C1 controls would be read as typographic glyphs.
        assert_eq!(PdfWriter::escape_pdf_string("\u{80}\u{96}"), "??");
        assert_eq!(PdfWriter::escape_pdf_string("\u{a0}"), "\\240");
    }

    #[test]
    fn test_empty_canvas_produces_valid_pdf() {
        let bytes = canvas().finish(&Metadata::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        assert!(!bytes.windows(5).any(|w| w == b"/Info"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Quarterly (draft)".to_string()),
            author: Some("Accounts".to_string()),
            subject: None,
            creator: None,
        };
        let bytes = canvas().finish(&metadata);
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Quarterly \\(draft\\))"));
        assert!(text.contains("/Author (Accounts)"));
        assert!(text.contains("/Info"));
    }

    #[test]
    fn test_one_page_object_per_canvas_page() {
        let mut canvas = canvas();
        canvas.add_page();
        canvas.add_page();
        let bytes = canvas.finish(&Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
        assert_eq!(text.matches("/Type /Page ").count(), 3);
    }

    #[test]
    fn test_cells_become_rectangles_and_text() {
        let mut canvas = canvas();
        canvas.set_font_size(10.0);
        canvas.draw_cell(100.0, 20.0, "cell", CellOptions::default());
        let bytes = canvas.finish(&Metadata::default());

        let streams = content_streams(&bytes);
        assert_eq!(streams.len(), 1);
        let content = &streams[0];
        // Top-left (30, 30) on an 841.89pt page becomes y = 791.89 at the bottom edge.
        assert!(content.contains("30.00 791.89 100.00 20.00 re"), "{}", content);
        assert!(content.contains("/F0 10.0 Tf"));
        assert!(content.contains("(cell) Tj"));
    }

    #[test]
    fn test_borderless_empty_cell_draws_nothing() {
        let mut canvas = canvas();
        canvas.draw_cell(
            100.0,
            20.0,
            "",
            CellOptions {
                border: false,
                ..Default::default()
            },
        );
        let bytes = canvas.finish(&Metadata::default());
        let content = &content_streams(&bytes)[0];
        assert!(!content.contains(" re"));
        assert!(!content.contains("BT"));
    }

    #[test]
    fn test_standard_font_registered() {
        let bytes = canvas().finish(&Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/F0 3 0 R"));
    }

    #[test]
    fn test_to_unicode_skips_notdef() {
        let mut used = BTreeSet::new();
        used.insert((0u16, '\u{fffd}'));
        used.insert((36u16, 'A'));
        let cmap = PdfWriter::to_unicode_cmap(&used);
        assert!(cmap.contains("1 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
    }

    #[test]
    fn test_pdf_name_strips_spaces() {
        assert_eq!(PdfWriter::pdf_name("Noto Sans CJK"), "NotoSansCJK");
        assert_eq!(PdfWriter::pdf_name("  "), "CustomFont");
    }
}
