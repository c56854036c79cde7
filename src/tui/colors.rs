use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(250, 204, 21);
pub const STATUS_BG: Color = Color::Rgb(0, 95, 135);
pub const ERROR_BG: Color = Color::Rgb(150, 30, 30);
pub const TAG_BG: Color = Color::Rgb(60, 60, 70);
pub const MUTED: Color = Color::Gray;

pub fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Card border: hover emphasis only
pub fn card_border(hovered: bool) -> Style {
    if hovered {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn button(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).bg(TAG_BG)
    }
}

pub fn tag() -> Style {
    Style::default().fg(Color::White).bg(TAG_BG)
}

/// Color of the recruiting dot for a registry status label
pub fn recruiting(label: &str) -> Color {
    match label {
        "Accepting participants" | "Available" => Color::Green,
        "Not yet recruiting" | "Enrolling by invitation" => Color::Yellow,
        _ => Color::DarkGray,
    }
}
