use crate::primitives::TextStyle;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Advance width of `ch` in em units for a Helvetica-like face.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | 'I' | ' ' | '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.85,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.56,
        _ => 0.52,
    }
}

/// Estimate text extent in points; no font files are needed.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let em: f64 = text.chars().map(advance_em).sum();
    let bold = if style.bold { 1.06 } else { 1.0 };
    TextMetrics { width: em * style.size * bold, height: style.size * 1.2, ascent: style.size * 0.93 }
}
