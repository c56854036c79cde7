use crate::card::{CardContent, CardKey};
use crate::tui::app::App;
use crate::tui::card::card_lines;
use crate::tui::colors;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

const SEARCH_PREFIX: &str = " > ";
const BUTTON_LABEL: &str = " Search ";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(3), // Search bar
            Constraint::Min(4),    // Cards
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);
    draw_cards(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let lines = if state.is_searching() {
        vec![
            Line::styled(
                state.query.trim().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "Finding the best treatment for you...",
                Style::default().fg(colors::ACCENT),
            ),
        ]
    } else {
        vec![
            Line::styled("Mango", Style::default().add_modifier(Modifier::BOLD)),
            Line::styled(
                "Get your rare disease treated now, for free.",
                Style::default().fg(colors::MUTED),
            ),
        ]
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_search_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(BUTTON_LABEL.len() as u16 + 2),
        ])
        .split(area);
    app.layout.input = parts[0];
    app.layout.button = parts[1];

    let state = app.controller.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors::focus_border(app.input.focused));

    let text = if state.query.is_empty() && !app.input.focused {
        Line::styled(
            format!("{}Describe your condition...", SEARCH_PREFIX),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Line::from(format!("{}{}", SEARCH_PREFIX, state.query))
    };
    frame.render_widget(Paragraph::new(text).block(block), parts[0]);

    // Disabled is a pure function of the query
    let enabled = state.can_submit();
    let button = Paragraph::new(BUTTON_LABEL)
        .style(colors::button(enabled))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(colors::focus_border(false)),
        );
    frame.render_widget(button, parts[1]);

    if app.input.focused {
        let column = app.input.cursor_column(&state.query) as u16;
        let max_x = parts[0].right().saturating_sub(2);
        let cursor_x = (parts[0].x + 1 + SEARCH_PREFIX.len() as u16 + column).min(max_x);
        frame.set_cursor_position(Position::new(cursor_x, parts[0].y + 1));
    }
}

fn draw_cards(frame: &mut Frame, app: &mut App, area: Rect) {
    app.layout.cards.clear();
    let state = app.controller.state();

    if state.results.is_empty() {
        let hint = if state.is_searching() {
            ""
        } else if state.results_version > 0 {
            "No matching trials found."
        } else {
            "Describe your condition and press Enter."
        };
        frame.render_widget(
            Paragraph::new(hint)
                .alignment(Alignment::Center)
                .style(Style::default().fg(colors::MUTED)),
            area,
        );
        return;
    }

    let inner_width = area.width.saturating_sub(2);
    let cards: Vec<(CardKey, Vec<Line<'static>>)> = state
        .results
        .iter()
        .enumerate()
        .map(|(index, trial)| {
            let key = CardKey::for_trial(index, trial);
            let content = CardContent::build(trial, app.deck.view(&key));
            (key, card_lines(&content, inner_width))
        })
        .collect();
    let heights: Vec<u16> = cards
        .iter()
        .map(|(_, lines)| lines.len() as u16 + 2)
        .collect();

    // Scroll until the selected card fits entirely
    let mut offset = app.list.scroll_offset.min(cards.len() - 1);
    if let Some(selected) = app.list.selected {
        offset = offset.min(selected);
        while offset < selected && fits(&heights[offset..=selected], area.height) < selected - offset + 1 {
            offset += 1;
        }
    }
    app.list.scroll_offset = offset;

    let mut y = area.y;
    let mut shown = 0;
    for (index, (key, lines)) in cards.into_iter().enumerate().skip(offset) {
        let remaining = area.bottom().saturating_sub(y);
        if remaining < 3 {
            break;
        }
        let height = heights[index].min(remaining);
        let card_area = Rect::new(area.x, y, area.width, height);
        let view = app.deck.view(&key);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors::card_border(view.hovered))
            .title(if view.expanded { " \u{25BE} " } else { " \u{25B8} " });
        frame.render_widget(Paragraph::new(lines).block(block), card_area);

        app.layout.cards.push((index, card_area));
        if height == heights[index] {
            shown += 1;
        }
        y += height;
    }
    app.list.visible_cards = shown.max(1);
}

/// How many of `heights`, from the front, fit in `available` rows
fn fits(heights: &[u16], available: u16) -> usize {
    let mut used = 0u16;
    heights
        .iter()
        .take_while(|h| {
            used = used.saturating_add(**h);
            used <= available
        })
        .count()
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let (left_text, bg) = if state.is_searching() {
        (format!(" Searching for \"{}\"...", state.query.trim()), colors::STATUS_BG)
    } else if let Some(err) = &state.last_error {
        (format!(" \u{26A0} {}", err.summary()), colors::ERROR_BG)
    } else if !app.status_message.is_empty() {
        (format!(" {}", app.status_message), colors::STATUS_BG)
    } else {
        (format!(" {} trials", state.results.len()), colors::STATUS_BG)
    };

    let right_text = if app.input.focused {
        " Enter:Search  Tab:Results  Esc:Clear  Ctrl+C:Quit "
    } else {
        " \u{2191}\u{2193}:Select  Enter:Expand  o:Open  /:Search  q:Quit "
    };

    // Build the status line: left-aligned text + padding + right-aligned text
    let available_width = area.width as usize;
    let left_len = left_text.chars().count();
    let right_len = right_text.chars().count();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        // Not enough space, just show left text
        format!("{:width$}", left_text, width = available_width)
    };

    let status = Paragraph::new(status_str).style(Style::default().fg(Color::White).bg(bg));
    frame.render_widget(status, area);
}
