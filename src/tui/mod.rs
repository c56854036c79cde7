//! Terminal front end
//!
//! `run` takes over the terminal, drives an [`app::App`] until the user
//! quits, and restores the terminal even when the app fails.

pub mod app;
pub mod card;
pub mod colors;
pub mod list;
pub mod search;
pub mod ui;

use crate::config::AppConfig;
use crate::controller::SearchController;
use crate::source::HttpTrialSource;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::sync::Arc;

pub fn run(config: &AppConfig) -> crate::Result<()> {
    let source = HttpTrialSource::new(config)?;
    tracing::info!(endpoint = ?source.kind(), url = config.endpoint_url(), "starting terminal UI");
    let mut app = app::App::new(SearchController::new(Arc::new(source)));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}
