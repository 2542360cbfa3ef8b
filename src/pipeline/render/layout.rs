/// A4 portrait.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const MARGIN_LEFT_MM: f32 = 20.0;
pub const MARGIN_RIGHT_MM: f32 = 20.0;
pub const MARGIN_TOP_MM: f32 = 20.0;
pub const MARGIN_BOTTOM_MM: f32 = 20.0;

pub const FONT_SIZE_PT: f32 = 10.0;
pub const LINE_HEIGHT_MM: f32 = 5.0;

pub const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Width in millimetres of a glyph `units` wide in a face of `units_per_em`.
pub fn glyph_width_mm(units: f32, units_per_em: f32) -> f32 {
    units / units_per_em * FONT_SIZE_PT / POINTS_PER_MM
}

/// Word-wrap one paragraph so no line's summed `advance` exceeds `limit`.
/// Always returns at least one (possibly empty) line so blank paragraphs keep
/// their vertical space. Words wider than a full line are hard-split on
/// character boundaries.
pub fn wrap_measured(text: &str, limit: f32, advance: impl Fn(char) -> f32) -> Vec<String> {
    let space = advance(' ');
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0f32;

    for word in text.split_whitespace() {
        for piece in split_long_word(word, limit, &advance) {
            let piece_width: f32 = piece.chars().map(&advance).sum();
            if !current.is_empty() && current_width + space + piece_width > limit {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(piece);
            current_width += piece_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_long_word<'a>(word: &'a str, limit: f32, advance: &impl Fn(char) -> f32) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut width = 0.0f32;
    for (idx, c) in word.char_indices() {
        let w = advance(c);
        if idx > start && width + w > limit {
            pieces.push(&word[start..idx]);
            start = idx;
            width = 0.0;
        }
        width += w;
    }
    pieces.push(&word[start..]);
    pieces
}
