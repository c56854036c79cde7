use crate::card::{CardDeck, CardKey};
use crate::controller::SearchController;
use crate::tui::list::ListState;
use crate::tui::search::{InputAction, SearchInput};
use crate::tui::ui;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect};
use ratatui::Terminal;
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Screen regions recorded at the last draw, for mouse hit testing
#[derive(Debug, Default)]
pub struct ScreenLayout {
    pub input: Rect,
    pub button: Rect,
    /// (result index, area) for every card on screen
    pub cards: Vec<(usize, Rect)>,
}

impl ScreenLayout {
    pub fn card_at(&self, column: u16, row: u16) -> Option<usize> {
        let point = Position::new(column, row);
        self.cards
            .iter()
            .find(|(_, area)| area.contains(point))
            .map(|(index, _)| *index)
    }
}

pub struct App {
    pub controller: SearchController,
    pub input: SearchInput,
    pub deck: CardDeck,
    pub list: ListState,
    pub layout: ScreenLayout,
    pub status_message: String,
    /// Results version the list selection belongs to
    seen_version: u64,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: SearchController) -> Self {
        Self {
            controller,
            input: SearchInput::default(),
            deck: CardDeck::default(),
            list: ListState::default(),
            layout: ScreenLayout::default(),
            status_message: String::new(),
            seen_version: 0,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> crate::Result<()> {
        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(Event::Mouse(mouse)) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.process_completions();
                last_tick = Instant::now();
            }

            if self.should_quit {
                self.controller.cancel();
                return Ok(());
            }
        }
    }

    /// Apply finished searches and drop card state tied to a replaced list
    pub fn process_completions(&mut self) {
        if self.controller.poll() == 0 {
            return;
        }
        let state = self.controller.state();
        self.deck.sync(state);
        if state.results_version != self.seen_version {
            self.seen_version = state.results_version;
            self.list.reset();
            if !state.results.is_empty() {
                self.list.focused = !self.input.focused;
                self.select(0);
            }
        }
    }

    fn results_len(&self) -> usize {
        self.controller.state().results.len()
    }

    fn key_at(&self, index: usize) -> Option<CardKey> {
        self.controller
            .state()
            .results
            .get(index)
            .map(|trial| CardKey::for_trial(index, trial))
    }

    /// Select a card; selection doubles as hover in the terminal
    fn select(&mut self, index: usize) {
        self.list.select(index, self.results_len());
        self.sync_hover();
    }

    fn sync_hover(&mut self) {
        let key = if self.list.focused {
            self.list.selected.and_then(|i| self.key_at(i))
        } else {
            None
        };
        self.deck.hover(key.as_ref());
    }

    fn toggle_selected(&mut self) {
        if let Some(key) = self.list.selected.and_then(|i| self.key_at(i)) {
            self.deck.toggle(&key);
        }
    }

    fn focus_input(&mut self) {
        self.input.focused = true;
        self.list.focused = false;
        self.sync_hover();
    }

    fn focus_list(&mut self) {
        self.input.focused = false;
        self.list.focused = true;
        if self.list.selected.is_none() && self.results_len() > 0 {
            self.list.select_first();
        }
        self.sync_hover();
    }

    fn submit(&mut self) {
        if let Some(ticket) = self.input.submit(&mut self.controller) {
            info!(generation = ticket.generation, "search submitted from button");
            self.after_submit();
        }
    }

    /// Focus moves to the results once a search is on its way
    fn after_submit(&mut self) {
        self.status_message.clear();
        self.list.focused = true;
        self.sync_hover();
    }

    fn open_selected(&mut self) {
        let url = self
            .list
            .selected
            .and_then(|i| self.controller.state().results.get(i))
            .and_then(|trial| trial.page_url());
        match url {
            Some(url) => match open::that(&url) {
                Ok(()) => self.status_message = format!("Opened {}", url),
                Err(e) => {
                    warn!(%url, error = %e, "failed to open browser");
                    self.status_message = format!("Could not open {}", url);
                }
            },
            None => self.status_message = "This trial has no registry page".to_string(),
        }
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                if self.input.focused && !self.controller.state().query.is_empty() {
                    self.input.clear(&mut self.controller);
                } else if self.input.focused && self.results_len() > 0 {
                    self.focus_list();
                } else {
                    self.should_quit = true;
                }
                return;
            }
            _ => {}
        }

        if self.input.focused {
            self.handle_input_key(key);
        } else {
            self.handle_list_key(key);
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match self.input.handle_key(key, &mut self.controller) {
            InputAction::Submitted(_) => self.after_submit(),
            InputAction::Blurred => self.focus_list(),
            InputAction::Edited | InputAction::Moved | InputAction::Ignored => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let total = self.results_len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_next(total),
            KeyCode::PageUp => self.list.page_up(),
            KeyCode::PageDown => self.list.page_down(total),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(total),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('o') => self.open_selected(),
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Tab | KeyCode::Char('/') => self.focus_input(),

            // Any other printable char focuses search and types it
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focus_input();
                self.input.cursor_pos = self.controller.state().query.len();
                self.input.insert(&mut self.controller, c);
            }

            _ => {}
        }
        if total == 0 {
            self.list.selected = None;
        }
        self.sync_hover();
    }

    // --- Mouse handling ---

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                let key = self
                    .layout
                    .card_at(mouse.column, mouse.row)
                    .and_then(|i| self.key_at(i));
                self.deck.hover(key.as_ref());
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.layout.button.contains(point) {
                    self.submit();
                } else if self.layout.input.contains(point) {
                    self.focus_input();
                } else if let Some(index) = self.layout.card_at(mouse.column, mouse.row) {
                    self.input.focused = false;
                    self.list.focused = true;
                    self.select(index);
                    if let Some(key) = self.key_at(index) {
                        self.deck.toggle(&key);
                    }
                }
            }
            MouseEventKind::ScrollDown => {
                self.list.select_next(self.results_len());
                self.sync_hover();
            }
            MouseEventKind::ScrollUp => {
                self.list.select_prev();
                self.sync_hover();
            }
            _ => {}
        }
    }
}
