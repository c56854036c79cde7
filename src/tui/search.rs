use crate::controller::{SearchController, Ticket};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Search input state for the TUI. The query itself lives in the controller.
pub struct SearchInput {
    /// Byte offset into the query
    pub cursor_pos: usize,
    pub focused: bool,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self {
            cursor_pos: 0,
            focused: true,
        }
    }
}

/// Result of feeding a key to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Edited,
    Moved,
    Submitted(Ticket),
    /// Focus leaves the input without submitting
    Blurred,
    Ignored,
}

impl SearchInput {
    /// Display columns between the start of the query and the cursor
    pub fn cursor_column(&self, query: &str) -> usize {
        query
            .get(..self.cursor_pos.min(query.len()))
            .map(UnicodeWidthStr::width)
            .unwrap_or(0)
    }

    /// Submit the current query. Dispatches at most once and only when the
    /// query is submittable; a dispatch takes focus away from the input.
    pub fn submit(&mut self, controller: &mut SearchController) -> Option<Ticket> {
        if !controller.state().can_submit() {
            return None;
        }
        let ticket = controller.submit_search()?;
        self.focused = false;
        Some(ticket)
    }

    /// Type `c` at the cursor
    pub fn insert(&mut self, controller: &mut SearchController, c: char) {
        let mut query = controller.state().query.clone();
        let pos = self.cursor_pos.min(query.len());
        query.insert(pos, c);
        self.cursor_pos = pos + c.len_utf8();
        controller.set_query(query);
    }

    pub fn clear(&mut self, controller: &mut SearchController) {
        controller.set_query(String::new());
        self.cursor_pos = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent, controller: &mut SearchController) -> InputAction {
        let query = controller.state().query.as_str();
        self.cursor_pos = self.cursor_pos.min(query.len());

        match key.code {
            KeyCode::Enter => match self.submit(controller) {
                Some(ticket) => InputAction::Submitted(ticket),
                None => InputAction::Ignored,
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(controller, c);
                InputAction::Edited
            }
            KeyCode::Backspace => {
                if self.cursor_pos == 0 {
                    return InputAction::Ignored;
                }
                // Find the previous character boundary
                let prev = prev_boundary(query, self.cursor_pos);
                let mut edited = query.to_string();
                edited.remove(prev);
                self.cursor_pos = prev;
                controller.set_query(edited);
                InputAction::Edited
            }
            KeyCode::Delete => {
                if self.cursor_pos >= query.len() {
                    return InputAction::Ignored;
                }
                let mut edited = query.to_string();
                edited.remove(self.cursor_pos);
                controller.set_query(edited);
                InputAction::Edited
            }
            KeyCode::Left => {
                self.cursor_pos = prev_boundary(query, self.cursor_pos);
                InputAction::Moved
            }
            KeyCode::Right => {
                self.cursor_pos = next_boundary(query, self.cursor_pos);
                InputAction::Moved
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                InputAction::Moved
            }
            KeyCode::End => {
                self.cursor_pos = query.len();
                InputAction::Moved
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focused = false;
                InputAction::Blurred
            }
            _ => InputAction::Ignored,
        }
    }
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SearchStatus;
    use crate::error::SearchError;
    use crate::source::TrialSource;
    use crate::trial::Trial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl TrialSource for Counting {
        fn search(&self, _query: &str) -> Result<Vec<Trial>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (SearchInput, SearchController, Arc<Counting>) {
        let source = Arc::new(Counting::default());
        (SearchInput::default(), SearchController::new(source.clone()), source)
    }

    fn type_str(input: &mut SearchInput, controller: &mut SearchController, text: &str) {
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c)), controller);
        }
    }

    #[test]
    fn typing_writes_through_to_controller() {
        let (mut input, mut controller, _) = setup();
        type_str(&mut input, &mut controller, "asthma");
        assert_eq!(controller.state().query, "asthma");
        assert_eq!(input.cursor_pos, 6);
        assert_eq!(controller.state().status, SearchStatus::Idle);
    }

    #[test]
    fn editing_respects_multibyte_characters() {
        let (mut input, mut controller, _) = setup();
        type_str(&mut input, &mut controller, "café");
        input.handle_key(key(KeyCode::Left), &mut controller);
        input.handle_key(key(KeyCode::Backspace), &mut controller);
        assert_eq!(controller.state().query, "caé");
        input.handle_key(key(KeyCode::Delete), &mut controller);
        assert_eq!(controller.state().query, "ca");
        assert_eq!(input.cursor_column("ca"), 2);
    }

    #[test]
    fn enter_on_empty_query_does_nothing() {
        let (mut input, mut controller, source) = setup();
        assert_eq!(
            input.handle_key(key(KeyCode::Enter), &mut controller),
            InputAction::Ignored
        );
        type_str(&mut input, &mut controller, "  ");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter), &mut controller),
            InputAction::Ignored
        );
        assert!(input.focused);
        assert_eq!(controller.state().status, SearchStatus::Idle);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn enter_submits_once_and_blurs() {
        let (mut input, mut controller, source) = setup();
        type_str(&mut input, &mut controller, "diabetes");

        let action = input.handle_key(key(KeyCode::Enter), &mut controller);

        assert!(matches!(action, InputAction::Submitted(_)));
        assert!(!input.focused);
        assert_eq!(controller.state().status, SearchStatus::Searching);
        assert!(controller.wait_idle(std::time::Duration::from_secs(5)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tab_blurs_without_submitting() {
        let (mut input, mut controller, source) = setup();
        type_str(&mut input, &mut controller, "gout");
        assert_eq!(
            input.handle_key(key(KeyCode::Tab), &mut controller),
            InputAction::Blurred
        );
        assert_eq!(controller.state().status, SearchStatus::Idle);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cursor_stays_in_bounds_after_clear() {
        let (mut input, mut controller, _) = setup();
        type_str(&mut input, &mut controller, "lupus");
        input.clear(&mut controller);
        assert_eq!(input.cursor_pos, 0);
        input.handle_key(key(KeyCode::End), &mut controller);
        assert_eq!(input.cursor_pos, 0);
    }
}
