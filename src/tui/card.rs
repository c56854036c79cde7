//! Card rendering: turns `CardContent` into terminal lines of a given width

use crate::card::CardContent;
use crate::tui::colors;
use ratatui::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        let sep = usize::from(!current.is_empty());
        if current_width + sep + word_width <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += sep + word_width;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if current_width + w > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn labeled(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<9}", label), Style::default().fg(colors::MUTED)),
        Span::raw(value.to_string()),
    ])
}

/// Lines for one card body (inside its border)
pub fn card_lines(content: &CardContent, width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut lines = Vec::new();

    let enrollment = content
        .enrollment
        .map(|n| format!("{} participants", n))
        .unwrap_or_default();
    let title_width = width.saturating_sub(enrollment.width() + 1).max(1);
    let mut title_rows = wrap(&content.title, title_width).into_iter();
    let first = title_rows.next().unwrap_or_default();
    let pad = width.saturating_sub(first.width() + enrollment.width());
    lines.push(Line::from(vec![
        Span::styled(first, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(pad)),
        Span::styled(enrollment, Style::default().fg(colors::ACCENT)),
    ]));
    for row in title_rows {
        lines.push(Line::styled(row, Style::default().add_modifier(Modifier::BOLD)));
    }

    if let Some(official) = &content.official_title {
        for row in wrap(official, width) {
            lines.push(Line::styled(row, Style::default().fg(colors::MUTED)));
        }
    }

    if let Some(label) = &content.recruiting {
        lines.push(Line::from(vec![
            Span::styled("\u{25CF} ", Style::default().fg(colors::recruiting(label))),
            Span::raw(label.clone()),
        ]));
    }
    if let Some(sponsor) = &content.sponsor {
        lines.push(labeled("Sponsor", sponsor));
    }
    for location in &content.locations {
        let text = match (&location.place, &location.facility) {
            (Some(place), Some(facility)) => format!("{} ({})", place, facility),
            (Some(place), None) => place.clone(),
            (None, Some(facility)) => facility.clone(),
            (None, None) => continue,
        };
        lines.push(labeled("Site", &text));
    }
    if let Some(start) = &content.start_date {
        lines.push(labeled("Starts", start));
    }

    if !content.conditions.is_empty() {
        let mut spans = Vec::new();
        let mut used = 0;
        for condition in &content.conditions {
            let chip = format!(" {} ", condition);
            let chip_width = chip.width() + 1;
            if used + chip_width > width && !spans.is_empty() {
                lines.push(Line::from(std::mem::take(&mut spans)));
                used = 0;
            }
            spans.push(Span::styled(chip, colors::tag()));
            spans.push(Span::raw(" "));
            used += chip_width;
        }
        lines.push(Line::from(spans));
    }

    if let Some(details) = &content.details {
        lines.push(Line::default());
        lines.push(Line::styled("Summary", Style::default().add_modifier(Modifier::BOLD)));
        if let Some(summary) = &details.summary {
            lines.extend(wrap(summary, width).into_iter().map(Line::from));
        }
        lines.push(Line::default());
        lines.push(Line::styled("Contact", Style::default().add_modifier(Modifier::BOLD)));
        for contact in &details.contacts {
            if let Some(name) = &contact.name {
                lines.push(Line::styled(
                    name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
            for value in [&contact.phone, &contact.email].into_iter().flatten() {
                lines.push(Line::from(format!("  {}", value)));
            }
        }
    }

    lines
}
