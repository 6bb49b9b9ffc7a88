use ratatui::{
    prelude::Span,
    style::{Color, Modifier, Style},
};

/// Parses `#rrggbb`; anything else renders grey.
pub(super) fn hex_to_color(hex: &str) -> Color {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Gray;
    }
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

pub(super) fn text_color_for_bg(bg_color: Color) -> Color {
    if let Color::Rgb(r, g, b) = bg_color {
        let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if brightness > 128 {
            Color::Black
        } else {
            Color::White
        }
    } else {
        Color::White
    }
}

pub(super) fn key_hint_span(key: &str, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}  ", label), Style::default().fg(Color::Gray)),
    ]
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::{hex_to_color, text_color_for_bg};

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("#1f77b4"), Color::Rgb(0x1f, 0x77, 0xb4));
        assert_eq!(hex_to_color("#zzzzzz"), Color::Gray);
        assert_eq!(hex_to_color("#fff"), Color::Gray);
    }

    #[test]
    fn test_text_color_contrasts_with_background() {
        assert_eq!(text_color_for_bg(Color::Rgb(255, 255, 255)), Color::Black);
        assert_eq!(text_color_for_bg(Color::Rgb(20, 20, 20)), Color::White);
    }
}
