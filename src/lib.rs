//! Mango - clinical trial finder
//!
//! Describe a condition in plain words, search a clinical-trials service, and
//! browse the matching studies as expandable cards.
//!
//! # Example
//!
//! ```no_run
//! use mango::{AppConfig, HttpTrialSource, SearchController};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> mango::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let source = HttpTrialSource::new(&config)?;
//!     let mut controller = SearchController::new(Arc::new(source));
//!
//!     controller.set_query("friedreich's ataxia");
//!     controller.submit_search();
//!     controller.wait_idle(Duration::from_secs(30));
//!
//!     for trial in &controller.state().results {
//!         println!("{}", trial.brief_title().unwrap_or("(untitled)"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod card;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod source;
pub mod trial;
pub mod tui;

pub use card::{CardContent, CardDeck, CardKey, CardViewState};
pub use config::{AppConfig, EndpointKind};
pub use controller::{SearchController, SearchState, SearchStatus, Ticket};
pub use error::{MangoError, Result, SearchError, SearchErrorKind};
pub use source::{HttpTrialSource, TrialSource};
pub use trial::Trial;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
