//! Search orchestration
//!
//! `SearchController` owns the query, the Idle/Searching status and the
//! result list. It is the only writer; everything else reads through
//! [`SearchController::state`].
//!
//! Requests run on a worker thread and report back over a channel. The
//! owning thread applies completions in [`SearchController::poll`] or
//! [`SearchController::wait_idle`], so state is only ever mutated from one
//! place. Each dispatch carries a generation number and only the latest
//! generation is applied: when two searches overlap, the one dispatched
//! last wins regardless of which response arrives first.

use crate::error::SearchError;
use crate::source::TrialSource;
use crate::trial::Trial;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
}

/// Everything the UI renders from
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<Trial>,
    /// Outcome of the last settled search when it failed
    pub last_error: Option<SearchError>,
    /// Bumped whenever `results` is replaced
    pub results_version: u64,
}

impl SearchState {
    pub fn is_searching(&self) -> bool {
        self.status == SearchStatus::Searching
    }

    /// Whether the current query may be submitted
    pub fn can_submit(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Handle for one dispatched search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
}

/// What happened to a completion when it was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Results(usize),
    Failed,
    Stale,
}

/// Message from a search worker
struct Completion {
    generation: u64,
    query: String,
    outcome: Result<Vec<Trial>, SearchError>,
}

pub struct SearchController {
    state: SearchState,
    source: Arc<dyn TrialSource>,
    /// Generation of the most recent dispatch (or cancellation)
    generation: u64,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl SearchController {
    pub fn new(source: Arc<dyn TrialSource>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            state: SearchState::default(),
            source,
            generation: 0,
            sender,
            receiver,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
    }

    pub fn set_status(&mut self, status: SearchStatus) {
        self.state.status = status;
    }

    /// Replace the result list wholesale
    pub fn set_results(&mut self, results: Vec<Trial>) {
        self.state.results = results;
        self.state.results_version += 1;
    }

    /// Dispatch a search for the current query.
    ///
    /// Returns `None` without touching state when the query is blank. Status
    /// is Searching by the time this returns.
    pub fn submit_search(&mut self) -> Option<Ticket> {
        if !self.state.can_submit() {
            return None;
        }

        self.generation += 1;
        let generation = self.generation;
        self.state.status = SearchStatus::Searching;
        self.state.last_error = None;

        let query = self.state.query.trim().to_string();
        info!(generation, query = %query, "dispatching search");

        let source = Arc::clone(&self.source);
        let tx = self.sender.clone();
        thread::spawn(move || {
            let outcome = source.search(&query);
            // Receiver is gone once the controller is dropped
            let _ = tx.send(Completion {
                generation,
                query,
                outcome,
            });
        });

        Some(Ticket { generation })
    }

    /// Discard whatever is in flight and return to Idle
    pub fn cancel(&mut self) {
        if self.state.is_searching() {
            debug!(generation = self.generation, "cancelling search");
        }
        self.generation += 1;
        self.state.status = SearchStatus::Idle;
    }

    /// Apply every completion that has already arrived.
    /// Returns how many of them changed state; stale ones don't count.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            if self.apply(completion) != Settled::Stale {
                applied += 1;
            }
        }
        applied
    }

    /// Block, applying completions, until Idle or `timeout` passes.
    /// Returns whether the controller is Idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.is_searching() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => {
                    self.apply(completion);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                // Unreachable while we hold a sender
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    fn apply(&mut self, completion: Completion) -> Settled {
        let Completion {
            generation,
            query,
            outcome,
        } = completion;

        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                query = %query,
                "discarding stale search result"
            );
            return Settled::Stale;
        }

        self.state.status = SearchStatus::Idle;
        match outcome {
            Ok(trials) => {
                let count = trials.len();
                info!(generation, count, query = %query, "search settled");
                self.set_results(trials);
                self.state.last_error = None;
                Settled::Results(count)
            }
            Err(err) => {
                warn!(generation, query = %query, error = %err, "search failed");
                self.state.last_error = Some(err);
                Settled::Failed
            }
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchErrorKind;
    use crossbeam_channel::bounded;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(5);

    fn trial(title: &str) -> Trial {
        serde_json::from_value(json!({
            "protocolSection": { "identificationModule": { "briefTitle": title } }
        }))
        .unwrap()
    }

    fn titles(state: &SearchState) -> Vec<String> {
        state
            .results
            .iter()
            .map(|t| t.brief_title().unwrap_or_default().to_string())
            .collect()
    }

    /// Answers immediately and records every query it was asked
    #[derive(Default)]
    struct Canned {
        response: Mutex<Option<Result<Vec<Trial>, SearchError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl Canned {
        fn answering(response: Result<Vec<Trial>, SearchError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    impl TrialSource for Canned {
        fn search(&self, query: &str) -> Result<Vec<Trial>, SearchError> {
            self.queries.lock().push(query.to_string());
            self.response.lock().clone().unwrap_or(Ok(Vec::new()))
        }
    }

    /// Holds each request until the test releases it with the response
    struct Gated {
        gates: Mutex<Vec<Receiver<Result<Vec<Trial>, SearchError>>>>,
        started: Sender<String>,
    }

    impl TrialSource for Gated {
        fn search(&self, query: &str) -> Result<Vec<Trial>, SearchError> {
            let gate = self.gates.lock().remove(0);
            let _ = self.started.send(query.to_string());
            gate.recv()
                .unwrap_or_else(|_| Err(SearchError::Transport("gate dropped".into())))
        }
    }

    /// A source with `n` gates, the senders that release them, and a
    /// receiver announcing each request as it starts
    fn gated(
        n: usize,
    ) -> (
        Arc<Gated>,
        Vec<Sender<Result<Vec<Trial>, SearchError>>>,
        Receiver<String>,
    ) {
        let (releases, gates): (Vec<_>, Vec<_>) = (0..n).map(|_| bounded(1)).unzip();
        let (started_tx, started_rx) = unbounded();
        let source = Arc::new(Gated {
            gates: Mutex::new(gates),
            started: started_tx,
        });
        (source, releases, started_rx)
    }

    /// Block for the next completion and apply it
    fn settle_next(controller: &mut SearchController) -> Settled {
        match controller.receiver.recv_timeout(WAIT) {
            Ok(completion) => controller.apply(completion),
            Err(e) => panic!("completion never arrived: {:?}", e),
        }
    }

    #[test]
    fn starts_idle_and_empty() {
        let controller = SearchController::new(Canned::answering(Ok(vec![])));
        let state = controller.state();
        assert_eq!(state.status, SearchStatus::Idle);
        assert!(state.results.is_empty());
        assert_eq!(state.query, "");
        assert!(state.last_error.is_none());
    }

    #[test]
    fn set_query_leaves_status_and_results_alone() {
        let mut controller = SearchController::new(Canned::answering(Ok(vec![])));
        controller.set_results(vec![trial("kept")]);
        controller.set_status(SearchStatus::Searching);

        controller.set_query("asthma");

        assert_eq!(controller.state().query, "asthma");
        assert_eq!(controller.state().status, SearchStatus::Searching);
        assert_eq!(titles(controller.state()), vec!["kept"]);
        assert_eq!(controller.state().results_version, 1);
    }

    #[test]
    fn blank_query_never_dispatches() {
        let source = Canned::answering(Ok(vec![trial("x")]));
        let mut controller = SearchController::new(source.clone());
        controller.set_results(vec![trial("a"), trial("b")]);

        for query in ["", "   ", "\t\n"] {
            controller.set_query(query);
            assert!(!controller.state().can_submit());
            assert_eq!(controller.submit_search(), None);
            assert_eq!(controller.state().status, SearchStatus::Idle);
        }

        thread::sleep(Duration::from_millis(50));
        assert_eq!(controller.poll(), 0);
        assert!(source.queries.lock().is_empty());
        assert_eq!(controller.state().results.len(), 2);
    }

    #[test]
    fn submit_is_searching_before_the_request_resolves() {
        let (source, releases, started) = gated(1);
        let mut controller = SearchController::new(source);
        controller.set_query("diabetes");

        let ticket = controller.submit_search();

        assert_eq!(ticket, Some(Ticket { generation: 1 }));
        assert_eq!(controller.state().status, SearchStatus::Searching);
        assert_eq!(started.recv_timeout(WAIT).unwrap(), "diabetes");
        assert_eq!(controller.poll(), 0);
        assert_eq!(controller.state().status, SearchStatus::Searching);

        releases[0].send(Ok(vec![])).unwrap();
        assert!(controller.wait_idle(WAIT));
    }

    #[test]
    fn diabetes_search_yields_two_trials() {
        let source = Canned::answering(Ok(vec![trial("first"), trial("second")]));
        let mut controller = SearchController::new(source.clone());
        controller.set_query("diabetes");

        controller.submit_search();
        assert!(controller.wait_idle(WAIT));

        let state = controller.state();
        assert_eq!(state.status, SearchStatus::Idle);
        assert_eq!(titles(state), vec!["first", "second"]);
        assert!(state.last_error.is_none());
        assert_eq!(*source.queries.lock(), vec!["diabetes".to_string()]);

        // Clearing the query afterwards is not a search
        controller.set_query("");
        assert!(!controller.state().can_submit());
        assert_eq!(controller.submit_search(), None);
        assert_eq!(controller.state().results.len(), 2);
    }

    #[test]
    fn query_is_trimmed_before_dispatch() {
        let source = Canned::answering(Ok(vec![]));
        let mut controller = SearchController::new(source.clone());
        controller.set_query("  lupus ");

        controller.submit_search();
        assert!(controller.wait_idle(WAIT));

        assert_eq!(*source.queries.lock(), vec!["lupus".to_string()]);
        assert_eq!(controller.state().query, "  lupus ");
    }

    #[test]
    fn every_failure_kind_keeps_previous_results() {
        let failures = [
            SearchError::Transport("connection refused".into()),
            SearchError::Status {
                code: 500,
                body: "oops".into(),
            },
            SearchError::Payload("expected an array".into()),
        ];

        for failure in failures {
            let kind = failure.kind();
            let mut controller = SearchController::new(Canned::answering(Err(failure.clone())));
            controller.set_results(vec![trial("a"), trial("b")]);
            controller.set_query("diabetes");

            controller.submit_search();
            assert!(controller.wait_idle(WAIT));

            let state = controller.state();
            assert_eq!(state.status, SearchStatus::Idle);
            assert_eq!(titles(state), vec!["a", "b"]);
            assert_eq!(state.results_version, 1);
            assert_eq!(state.last_error.as_ref().map(SearchError::kind), Some(kind));
        }
    }

    #[test]
    fn success_clears_previous_error() {
        let source = Canned::answering(Err(SearchError::Transport("down".into())));
        let mut controller = SearchController::new(source.clone());
        controller.set_query("copd");
        controller.submit_search();
        assert!(controller.wait_idle(WAIT));
        assert_eq!(
            controller.state().last_error.as_ref().map(SearchError::kind),
            Some(SearchErrorKind::Transport)
        );

        *source.response.lock() = Some(Ok(vec![trial("ok")]));
        controller.submit_search();
        assert!(controller.state().last_error.is_none());
        assert!(controller.wait_idle(WAIT));
        assert!(controller.state().last_error.is_none());
        assert_eq!(titles(controller.state()), vec!["ok"]);
    }

    #[test]
    fn last_dispatched_search_wins_when_responses_cross() {
        let (source, releases, started) = gated(2);
        let mut controller = SearchController::new(source);

        controller.set_query("first");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();
        controller.set_query("second");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();

        // Second response arrives first
        releases[1].send(Ok(vec![trial("new")])).unwrap();
        assert_eq!(settle_next(&mut controller), Settled::Results(1));
        assert_eq!(controller.state().status, SearchStatus::Idle);
        assert_eq!(titles(controller.state()), vec!["new"]);

        // Then the stale one
        releases[0].send(Ok(vec![trial("old"), trial("older")])).unwrap();
        assert_eq!(settle_next(&mut controller), Settled::Stale);
        assert_eq!(titles(controller.state()), vec!["new"]);
        assert_eq!(controller.state().results_version, 1);
    }

    #[test]
    fn stays_searching_until_latest_dispatch_settles() {
        let (source, releases, started) = gated(2);
        let mut controller = SearchController::new(source);

        controller.set_query("first");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();
        controller.set_query("second");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();

        releases[0].send(Ok(vec![trial("old")])).unwrap();
        settle_next(&mut controller);
        assert_eq!(controller.state().status, SearchStatus::Searching);
        assert!(controller.state().results.is_empty());

        releases[1].send(Err(SearchError::Payload("bad".into()))).unwrap();
        assert!(controller.wait_idle(WAIT));
        assert!(controller.state().results.is_empty());
        assert!(controller.state().last_error.is_some());
    }

    #[test]
    fn stale_failure_does_not_touch_newer_state() {
        let (source, releases, started) = gated(2);
        let mut controller = SearchController::new(source);

        controller.set_query("first");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();
        controller.set_query("second");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();

        releases[1].send(Ok(vec![trial("new")])).unwrap();
        settle_next(&mut controller);
        releases[0]
            .send(Err(SearchError::Transport("late".into())))
            .unwrap();
        settle_next(&mut controller);

        assert!(controller.state().last_error.is_none());
        assert_eq!(titles(controller.state()), vec!["new"]);
    }

    #[test]
    fn cancel_discards_in_flight_result() {
        let (source, releases, started) = gated(1);
        let mut controller = SearchController::new(source);
        controller.set_results(vec![trial("before")]);
        controller.set_query("gout");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();

        controller.cancel();
        assert_eq!(controller.state().status, SearchStatus::Idle);

        releases[0].send(Ok(vec![trial("after")])).unwrap();
        assert_eq!(settle_next(&mut controller), Settled::Stale);
        assert_eq!(controller.poll(), 0);
        assert_eq!(titles(controller.state()), vec!["before"]);
        assert_eq!(controller.state().status, SearchStatus::Idle);
    }

    #[test]
    fn wait_idle_times_out_while_request_is_held() {
        let (source, releases, started) = gated(1);
        let mut controller = SearchController::new(source);
        controller.set_query("migraine");
        controller.submit_search();
        started.recv_timeout(WAIT).unwrap();

        assert!(!controller.wait_idle(Duration::from_millis(20)));
        assert!(controller.state().is_searching());

        releases[0].send(Ok(vec![])).unwrap();
        assert!(controller.wait_idle(WAIT));
    }

    proptest! {
        #[test]
        fn set_query_round_trips(q in ".*") {
            let mut controller = SearchController::new(Canned::answering(Ok(vec![])));
            controller.set_query(q.clone());
            prop_assert_eq!(&controller.state().query, &q);
            prop_assert_eq!(controller.state().status, SearchStatus::Idle);
            prop_assert!(controller.state().results.is_empty());
        }
    }
}
