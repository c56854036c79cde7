//! Result cards
//!
//! Each card has its own `CardViewState` (hover emphasis and expansion).
//! The list renderer owns every card's state in a `CardDeck`; the search
//! controller never sees it. `CardContent` is the presentation-neutral
//! description of what a card shows.

use crate::controller::SearchState;
use crate::trial::{format_start_date, Trial};
use std::collections::HashMap;

/// Per-card view state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardViewState {
    pub hovered: bool,
    pub expanded: bool,
}

impl CardViewState {
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }
}

/// Identity of a card within the current result list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardKey {
    /// Registry NCT id
    Trial(String),
    /// List position, for records without an id
    Position(usize),
}

impl CardKey {
    pub fn for_trial(position: usize, trial: &Trial) -> Self {
        match trial.nct_id() {
            Some(id) if !id.is_empty() => CardKey::Trial(id.to_string()),
            _ => CardKey::Position(position),
        }
    }
}

/// View state of every card in the current result list
#[derive(Debug, Default)]
pub struct CardDeck {
    cards: HashMap<CardKey, CardViewState>,
    results_version: u64,
    hovered: Option<CardKey>,
}

impl CardDeck {
    /// Discard all card state when the controller has replaced its results
    pub fn sync(&mut self, state: &SearchState) {
        if state.results_version != self.results_version {
            self.cards.clear();
            self.hovered = None;
            self.results_version = state.results_version;
        }
    }

    pub fn view(&self, key: &CardKey) -> CardViewState {
        self.cards.get(key).copied().unwrap_or_default()
    }

    pub fn toggle(&mut self, key: &CardKey) {
        self.cards.entry(key.clone()).or_default().toggle_expanded();
    }

    /// Move the pointer onto `key` (or off every card with `None`)
    pub fn hover(&mut self, key: Option<&CardKey>) {
        if self.hovered.as_ref() == key {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            if let Some(card) = self.cards.get_mut(&previous) {
                card.pointer_leave();
            }
        }
        if let Some(key) = key {
            self.cards.entry(key.clone()).or_default().pointer_enter();
            self.hovered = Some(key.clone());
        }
    }

    pub fn hovered(&self) -> Option<&CardKey> {
        self.hovered.as_ref()
    }

    /// Number of cards holding non-default state
    pub fn len(&self) -> usize {
        self.cards.values().filter(|c| **c != CardViewState::default()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trial site row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRow {
    pub place: Option<String>,
    pub facility: Option<String>,
}

/// A central contact row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Only present while the card is expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub summary: Option<String>,
    pub contacts: Vec<ContactRow>,
}

/// What a card shows for one trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    /// Brief title; empty when the record has none
    pub title: String,
    pub official_title: Option<String>,
    pub enrollment: Option<u64>,
    pub sponsor: Option<String>,
    pub recruiting: Option<String>,
    pub locations: Vec<LocationRow>,
    pub start_date: Option<String>,
    pub conditions: Vec<String>,
    pub details: Option<CardDetails>,
}

impl CardContent {
    pub fn build(trial: &Trial, view: CardViewState) -> Self {
        let locations = trial
            .locations()
            .iter()
            .map(|loc| LocationRow {
                place: loc.place(),
                facility: loc.facility.clone().filter(|f| !f.trim().is_empty()),
            })
            .filter(|row| row.place.is_some() || row.facility.is_some())
            .collect();

        let details = view.expanded.then(|| CardDetails {
            summary: trial.brief_summary().map(str::to_string),
            contacts: trial
                .central_contacts()
                .iter()
                .map(|c| ContactRow {
                    name: c.name.clone(),
                    phone: c.phone.clone(),
                    email: c.email.clone(),
                })
                .collect(),
        });

        Self {
            title: trial.brief_title().unwrap_or_default().to_string(),
            official_title: trial.official_title().map(str::to_string),
            enrollment: trial.enrollment(),
            sponsor: trial.lead_sponsor().map(str::to_string),
            recruiting: trial.overall_status().map(status_label),
            locations,
            start_date: trial.start_date().map(format_start_date),
            conditions: trial.conditions().to_vec(),
            details,
        }
    }
}

/// Human label for a registry recruitment status
pub fn status_label(status: &str) -> String {
    match status {
        "RECRUITING" => "Accepting participants".to_string(),
        "AVAILABLE" => "Available".to_string(),
        "NOT_YET_RECRUITING" => "Not yet recruiting".to_string(),
        "ENROLLING_BY_INVITATION" => "Enrolling by invitation".to_string(),
        other => {
            let lower = other.replace('_', " ").to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
