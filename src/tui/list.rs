/// Card list display state
pub struct ListState {
    pub selected: Option<usize>,
    pub scroll_offset: usize,
    /// Cards that fit on screen at the last draw
    pub visible_cards: usize,
    pub focused: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            visible_cards: 3,
            focused: false,
        }
    }
}

impl ListState {
    /// Forget selection and scroll, e.g. when the result list is replaced
    pub fn reset(&mut self) {
        self.selected = None;
        self.scroll_offset = 0;
    }

    pub fn select(&mut self, index: usize, total: usize) {
        if total == 0 {
            self.selected = None;
            return;
        }
        let i = index.min(total - 1);
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_next(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => (i + 1).min(total - 1),
            None => 0,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_prev(&mut self) {
        let i = match self.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn page_down(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let jump = self.visible_cards.max(1);
        let i = match self.selected {
            Some(i) => (i + jump).min(total - 1),
            None => (jump - 1).min(total - 1),
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_cards.max(1);
        let i = match self.selected {
            Some(i) => i.saturating_sub(jump),
            None => 0,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_first(&mut self) {
        self.selected = Some(0);
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(total - 1);
        self.ensure_visible(total - 1);
    }

    fn ensure_visible(&mut self, index: usize) {
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if self.visible_cards > 0 && index >= self.scroll_offset + self.visible_cards {
            self.scroll_offset = index + 1 - self.visible_cards;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_clamps_to_list() {
        let mut list = ListState::default();
        list.select_prev();
        assert_eq!(list.selected, Some(0));
        list.select_last(4);
        assert_eq!(list.selected, Some(3));
        list.select_next(4);
        assert_eq!(list.selected, Some(3));
        list.select(10, 4);
        assert_eq!(list.selected, Some(3));
    }

    #[test]
    fn scrolling_follows_selection() {
        let mut list = ListState {
            visible_cards: 2,
            ..Default::default()
        };
        list.select_next(5);
        list.select_next(5);
        list.select_next(5);
        assert_eq!(list.selected, Some(2));
        assert_eq!(list.scroll_offset, 1);
        list.select_first();
        assert_eq!(list.scroll_offset, 0);
    }
}
