//! CSS color strings.

use peniko::Color;

/// Parse a CSS hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`) or `transparent`.
/// Anything else falls back to black.
pub fn parse_hex_color(color: &str) -> Color {
    let color = color.trim();
    if color.eq_ignore_ascii_case("transparent") {
        return Color::from_rgba8(0, 0, 0, 0);
    }

    match color.strip_prefix('#').and_then(parse_hex) {
        Some(parsed) => parsed,
        None => {
            log::debug!("Unparseable color {color:?}, using black");
            Color::from_rgba8(0, 0, 0, 255)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |from: usize, to: usize| u8::from_str_radix(&hex[from..to], 16).ok();
    match hex.len() {
        // #rgb -> #rrggbb
        3 => Some(Color::from_rgba8(
            channel(0, 1)? * 17,
            channel(1, 2)? * 17,
            channel(2, 3)? * 17,
            255,
        )),
        6 => Some(Color::from_rgba8(channel(0, 2)?, channel(2, 4)?, channel(4, 6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0, 2)?,
            channel(2, 4)?,
            channel(4, 6)?,
            channel(6, 8)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!(rgba(parse_hex_color("#ffffff")), [255, 255, 255, 255]);
        assert_eq!(rgba(parse_hex_color("#fff")), [255, 255, 255, 255]);
        assert_eq!(rgba(parse_hex_color("#ff000080")), [255, 0, 0, 128]);
    }

    #[test]
    fn test_invalid_falls_back_to_black() {
        assert_eq!(rgba(parse_hex_color("red")), [0, 0, 0, 255]);
        assert_eq!(rgba(parse_hex_color("#zzzzzz")), [0, 0, 0, 255]);
        assert_eq!(rgba(parse_hex_color("transparent")), [0, 0, 0, 0]);
    }
}
