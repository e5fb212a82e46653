//! Text measurement and greedy word-wrapping for the built-in Helvetica
//! faces.
//!
//! printpdf's built-in fonts ship no metrics API, so widths are estimated
//! from a coarse per-character advance model. The model only has to be
//! *consistent*, not typographically exact: the same text at the same size
//! always measures the same, which is what the pagination arithmetic needs.
//! Estimates err slightly wide, so wrapped lines fit the real glyphs with a
//! little slack rather than overflowing the margin.

const PT_TO_MM: f32 = 0.352_778;

/// Approximate advance width of one character, in em units.
fn char_width_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '!' | '|' | '\'' | '.' | ',' | ':' | ';' => 0.30,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | ' ' => 0.38,
        'm' | 'w' | 'M' | 'W' | '@' => 0.88,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.56,
        _ => 0.54,
    }
}

/// Estimated rendered width of `text` at `size_pt`, in millimetres.
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    let em: f32 = text.chars().map(char_width_em).sum();
    em * size_pt * PT_TO_MM
}

/// Greedy word-wrap of `text` into lines no wider than `max_width_mm`.
///
/// A single word wider than the line is hard-split character by character
/// rather than overflowing the margin. Whitespace-only input produces no
/// lines.
pub fn wrap(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width_mm(&candidate, size_pt) <= max_width_mm {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width_mm(word, size_pt) <= max_width_mm {
            current = word.to_string();
        } else {
            // Word alone exceeds the line: hard-split it.
            let mut piece = String::new();
            for c in word.chars() {
                piece.push(c);
                if text_width_mm(&piece, size_pt) > max_width_mm && piece.chars().count() > 1 {
                    piece.pop();
                    lines.push(std::mem::take(&mut piece));
                    piece.push(c);
                }
            }
            current = piece;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
