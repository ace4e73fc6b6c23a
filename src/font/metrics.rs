//! Advance widths for the standard PDF fonts the canvas can use without
//! embedding, in 1/1000 em.

/// Helvetica widths for the printable ASCII range, starting at U+0020.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];

const HELVETICA_DEFAULT: u16 = 556;
const COURIER_ADVANCE: u16 = 600;

#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    ascii: Option<&'static [u16; 95]>,
    fixed: u16,
}

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&HELVETICA_ASCII),
        fixed: HELVETICA_DEFAULT,
    };

    pub const COURIER: StandardFontMetrics = StandardFontMetrics {
        ascii: None,
        fixed: COURIER_ADVANCE,
    };

    /// Advance of `ch` in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let code = ch as u32;
        match self.ascii {
            Some(table) if (0x20..0x7F).contains(&code) => table[(code - 0x20) as usize],
            _ => self.fixed,
        }
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
