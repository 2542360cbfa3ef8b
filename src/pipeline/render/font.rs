use owned_ttf_parser::{AsFaceRef, OwnedFace};

use super::layout::*;
use super::RenderError;

/// What the session's font can draw, and how wide it draws it.
///
/// printpdf drops characters it cannot encode instead of failing, so every
/// paragraph is checked here before it reaches a layer.
pub(crate) enum FontCoverage {
    /// Built-in Helvetica, limited to the WinAnsi character set.
    Builtin,
    External(OwnedFace),
}

impl FontCoverage {
    pub(crate) fn external(bytes: &[u8]) -> Result<Self, RenderError> {
        let face = OwnedFace::from_vec(bytes.to_vec(), 0)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self::External(face))
    }

    pub(crate) fn supports(&self, c: char) -> bool {
        match self {
            FontCoverage::Builtin => is_win_ansi(c),
            FontCoverage::External(face) => face
                .as_face_ref()
                .glyph_index(c)
                .is_some_and(|id| id.0 > 0),
        }
    }

    /// First printable character the font cannot draw. Whitespace never
    /// reaches the page, so it is not checked.
    pub(crate) fn first_missing(&self, text: &str) -> Option<char> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .find(|&c| !self.supports(c))
    }

    /// Wrap a paragraph to the text width using the font's advance widths.
    pub(crate) fn wrap(&self, paragraph: &str) -> Vec<String> {
        match self {
            FontCoverage::Builtin => wrap_measured(paragraph, TEXT_WIDTH_MM, |c| {
                glyph_width_mm(helvetica_advance(c), 1000.0)
            }),
            FontCoverage::External(face) => {
                let face = face.as_face_ref();
                let units_per_em = f32::from(face.units_per_em().max(1));
                wrap_measured(paragraph, TEXT_WIDTH_MM, |c| {
                    let units = face
                        .glyph_index(c)
                        .and_then(|id| face.glyph_hor_advance(id))
                        .map(f32::from)
                        .unwrap_or(units_per_em);
                    glyph_width_mm(units, units_per_em)
                })
            }
        }
    }
}

/// Helvetica advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Glyphs outside printable ASCII are measured as a full em.
fn helvetica_advance(c: char) -> f32 {
    let index = (c as usize).wrapping_sub(0x20);
    HELVETICA_ASCII
        .get(index)
        .map_or(1000.0, |&units| f32::from(units))
}

/// Characters Windows-1252 can encode, as printable text.
fn is_win_ansi(c: char) -> bool {
    matches!(
        c,
        ' '..='~'
            | '\u{A0}'..='\u{FF}'
            | '\u{152}'
            | '\u{153}'
            | '\u{160}'
            | '\u{161}'
            | '\u{178}'
            | '\u{17D}'
            | '\u{17E}'
            | '\u{192}'
            | '\u{2C6}'
            | '\u{2DC}'
            | '\u{2013}'
            | '\u{2014}'
            | '\u{2018}'..='\u{201A}'
            | '\u{201C}'..='\u{201E}'
            | '\u{2020}'..='\u{2022}'
            | '\u{2026}'
            | '\u{2030}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{20AC}'
            | '\u{2122}'
    )
}
