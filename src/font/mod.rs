//! # Font Management
//!
//! Text measurement for the PDF canvas. Tables use a single font: one of the
//! standard PDF fonts (no embedding needed) or a TrueType font parsed with
//! ttf-parser and embedded into the output.

pub mod metrics;

use std::collections::BTreeMap;

use crate::error::{Result, TableError};
pub use metrics::StandardFontMetrics;

/// Standard PDF fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica => StandardFontMetrics::HELVETICA,
            Self::Courier => StandardFontMetrics::COURIER,
        }
    }

    /// Look up a standard font by family name, case-insensitively.
    pub fn from_family(family: &str) -> Option<Self> {
        match family.to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans-serif" => Some(Self::Helvetica),
            "courier" | "monospace" => Some(Self::Courier),
            _ => None,
        }
    }
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    /// Font bounding box in font units: (x_min, y_min, x_max, y_max).
    pub bbox: (i16, i16, i16, i16),
    pub default_advance: u16,
    /// Character to (glyph id, advance width).
    glyphs: BTreeMap<char, (u16, u16)>,
}

impl CustomFontMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| TableError::Font(format!("cannot parse font: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut glyphs = BTreeMap::new();
        let mut default_advance = 0u16;

        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(glyph_id) = subtable.glyph_index(code) {
                        let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                        glyphs.entry(ch).or_insert((glyph_id.0, advance));
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(TableError::Font("font has no unicode character map".to_string()));
        }
        if let Some((_, advance)) = glyphs.get(&' ') {
            default_advance = *advance;
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        let bbox = face.global_bounding_box();
        Ok(CustomFontMetrics {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
            bbox: (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max),
            default_advance,
            glyphs,
        })
    }

    /// Glyph id for `ch`; 0 (`.notdef`) when the font lacks it.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.glyphs.get(&ch).map_or(0, |(gid, _)| *gid)
    }

    /// Advance in font units.
    pub fn advance(&self, ch: char) -> u16 {
        self.glyphs
            .get(&ch)
            .map_or(self.default_advance, |(_, adv)| *adv)
    }

    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        (self.advance(ch) as f64 / self.units_per_em as f64) * font_size
    }

    /// Scale a font-unit value to the 1/1000 em PDF glyph space.
    pub fn to_pdf_units(&self, value: f64) -> f64 {
        value * 1000.0 / self.units_per_em as f64
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType font embedded into the output.
    Custom {
        family: String,
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// The font used by a canvas: measurement plus what the PDF writer needs
/// to reference or embed it.
#[derive(Debug, Clone)]
pub struct FontContext {
    font: FontData,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Helvetica.
    pub fn new() -> Self {
        Self::standard(StandardFont::Helvetica)
    }

    pub fn standard(font: StandardFont) -> Self {
        Self {
            font: FontData::Standard(font),
        }
    }

    /// Use a TrueType font.
    pub fn custom(family: &str, data: Vec<u8>) -> Result<Self> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        log::debug!(
            "loaded font {} ({} glyphs mapped, {} units/em)",
            family,
            metrics.glyphs.len(),
            metrics.units_per_em
        );
        Ok(Self {
            font: FontData::Custom {
                family: family.to_string(),
                data,
                metrics,
            },
        })
    }

    pub fn font(&self) -> &FontData {
        &self.font
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match &self.font {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        match &self.font {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom { metrics, .. } => text
                .chars()
                .map(|ch| metrics.char_width(ch, font_size))
                .sum(),
        }
    }

    /// Height of capital letters as a fraction of the font size.
    pub fn cap_height_ratio(&self) -> f64 {
        match &self.font {
            FontData::Standard(_) => 0.718,
            FontData::Custom { metrics, .. } => {
                metrics.cap_height as f64 / metrics.units_per_em as f64
            }
        }
    }
}
