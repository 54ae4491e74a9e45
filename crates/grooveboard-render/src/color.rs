//! Stroke color parsing.

use peniko::Color;

/// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` color specifier.
pub fn try_parse_color(color: &str) -> Option<Color> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => {
            // #rgb: each digit is doubled
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            Some(Color::from_rgba8(r * 17, g * 17, b * 17, 255))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
            Some(Color::from_rgba8(r, g, b, a))
        }
        _ => None,
    }
}

/// Parse a stroke color, falling back to black.
pub fn parse_color(color: &str) -> Color {
    try_parse_color(color).unwrap_or_else(|| {
        log::debug!("Unrecognized color {:?}, using black", color);
        Color::BLACK
    })
}
