//! Debounced, race-safe suggestion search
//!
//! `query` never issues a lookup directly. It arms a deadline `debounce`
//! after the last keystroke; the owner calls [`SuggestionSearch::poll`] once
//! that deadline passes and receives at most one [`SearchRequest`]. Each
//! request carries a [`Seq`] and only the newest one may replace the list.

use std::time::{Duration, Instant};
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use crate::coords::LatLng;
use crate::error::LookupError;
use crate::sequence::{Seq, SequenceCounter};

/// A candidate location returned by forward geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub coords: LatLng,
}

/// A lookup the owner should perform
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub seq: Seq,
    pub text: String,
    pub limit: usize,
}

/// Result of a `query` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Text was empty; the list was cleared synchronously
    Cleared,
    /// A lookup is armed for the given deadline
    Scheduled(Instant),
}

/// Result of feeding a lookup response back in
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The list was replaced with this many entries
    Updated(usize),
    /// The response was superseded and ignored
    Stale,
    /// The lookup failed and the list was cleared
    Failed(LookupError),
}

/// Free-text query state and the current suggestion list
#[derive(Debug)]
pub struct SuggestionSearch {
    debounce: Duration,
    limit: usize,
    text: String,
    deadline: Option<Instant>,
    requests: SequenceCounter,
    suggestions: Vec<Suggestion>,
}

impl SuggestionSearch {
    /// Create an empty search
    pub fn new(debounce: Duration, limit: usize) -> Self {
        Self {
            debounce,
            limit,
            text: String::new(),
            deadline: None,
            requests: SequenceCounter::new(),
            suggestions: Vec::new(),
        }
    }

    /// Record new query text
    ///
    /// Empty (or whitespace-only) text clears the list immediately and
    /// makes in-flight lookups stale. Otherwise the debounce restarts.
    pub fn query(&mut self, text: &str, now: Instant) -> QueryOutcome {
        self.text = text.to_string();

        if text.trim().is_empty() {
            self.clear();
            return QueryOutcome::Cleared;
        }

        let deadline = now + self.debounce;
        self.deadline = Some(deadline);
        QueryOutcome::Scheduled(deadline)
    }

    /// Issue the pending lookup if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let seq = self.requests.issue();
                tracing::debug!("Issuing suggestion lookup {} for '{}'", seq, self.text);
                Some(SearchRequest {
                    seq,
                    text: self.text.trim().to_string(),
                    limit: self.limit,
                })
            }
            _ => None,
        }
    }

    /// Apply a lookup response
    pub fn complete(&mut self, seq: Seq, result: Result<Vec<Suggestion>, LookupError>) -> SearchOutcome {
        if !self.requests.is_current(seq) {
            tracing::trace!("Discarding stale suggestion response {}", seq);
            return SearchOutcome::Stale;
        }

        match result {
            Ok(found) => {
                // Keep server order, first occurrence of each id wins
                let mut unique: IndexMap<String, Suggestion> = IndexMap::new();
                for suggestion in found {
                    unique.entry(suggestion.id.clone()).or_insert(suggestion);
                }
                self.suggestions = unique.into_values().take(self.limit).collect();
                SearchOutcome::Updated(self.suggestions.len())
            }
            Err(e) => {
                self.suggestions.clear();
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Adopt a picked suggestion's label as the query text without searching
    pub fn accept(&mut self, label: &str) {
        self.text = label.to_string();
        self.clear();
    }

    /// Drop the text, the list, any armed lookup and anything in flight
    pub fn reset(&mut self) {
        self.text.clear();
        self.clear();
    }

    fn clear(&mut self) {
        self.suggestions.clear();
        self.deadline = None;
        self.requests.invalidate();
    }

    /// Current query text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current suggestion list
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Find a suggestion in the current list
    pub fn find(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }

    /// When the armed lookup is due, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: &str, label: &str) -> Suggestion {
        Suggestion {
            id: id.to_string(),
            label: label.to_string(),
            coords: LatLng::new(48.85, 2.35),
        }
    }

    fn search() -> SuggestionSearch {
        SuggestionSearch::new(Duration::from_millis(500), 5)
    }

    #[test]
    fn test_rapid_typing_issues_one_lookup() {
        let mut search = search();
        let t0 = Instant::now();

        for (i, text) in ["P", "Pa", "Par", "Paris"].iter().enumerate() {
            search.query(text, t0 + Duration::from_millis(100 * i as u64));
        }

        // Quiet period counts from the last keystroke
        assert!(search.poll(t0 + Duration::from_millis(799)).is_none());

        let request = search.poll(t0 + Duration::from_millis(800)).unwrap();
        assert_eq!(request.text, "Paris");
        assert!(search.poll(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_empty_query_clears_synchronously() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Paris", t0);
        let request = search.poll(t0 + Duration::from_millis(500)).unwrap();
        search.complete(request.seq, Ok(vec![suggestion("1", "Paris")]));
        assert_eq!(search.suggestions().len(), 1);

        assert_eq!(search.query("", t0 + Duration::from_secs(1)), QueryOutcome::Cleared);
        assert!(search.suggestions().is_empty());
        assert!(search.next_deadline().is_none());
    }

    #[test]
    fn test_late_response_after_clear_is_inert() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Paris", t0);
        let request = search.poll(t0 + Duration::from_millis(500)).unwrap();

        search.query("  ", t0 + Duration::from_millis(600));
        let outcome = search.complete(request.seq, Ok(vec![suggestion("1", "Paris")]));

        assert_eq!(outcome, SearchOutcome::Stale);
        assert!(search.suggestions().is_empty());
    }

    #[test]
    fn test_out_of_order_responses() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Lon", t0);
        let first = search.poll(t0 + Duration::from_millis(500)).unwrap();
        search.query("London", t0 + Duration::from_millis(600));
        let second = search.poll(t0 + Duration::from_millis(1100)).unwrap();

        assert_eq!(search.complete(second.seq, Ok(vec![suggestion("2", "London")])), SearchOutcome::Updated(1));
        assert_eq!(search.complete(first.seq, Ok(vec![suggestion("1", "Lons")])), SearchOutcome::Stale);
        assert_eq!(search.suggestions()[0].label, "London");
    }

    #[test]
    fn test_limit_dedupe_and_order() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Spring", t0);
        let request = search.poll(t0 + Duration::from_millis(500)).unwrap();

        let found = vec![
            suggestion("7", "a"),
            suggestion("3", "b"),
            suggestion("7", "dup"),
            suggestion("1", "c"),
            suggestion("9", "d"),
            suggestion("4", "e"),
            suggestion("5", "f"),
        ];
        search.complete(request.seq, Ok(found));

        let labels: Vec<_> = search.suggestions().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_failure_clears_list() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Paris", t0);
        let first = search.poll(t0 + Duration::from_millis(500)).unwrap();
        search.complete(first.seq, Ok(vec![suggestion("1", "Paris")]));

        search.query("Paris, Texas", t0 + Duration::from_secs(1));
        let second = search.poll(t0 + Duration::from_millis(1500)).unwrap();
        let outcome = search.complete(second.seq, Err(LookupError::Network("offline".into())));

        assert!(matches!(outcome, SearchOutcome::Failed(_)));
        assert!(search.suggestions().is_empty());
    }

    #[test]
    fn test_accept_sets_text_without_lookup() {
        let mut search = search();
        let t0 = Instant::now();
        search.query("Par", t0);
        search.accept("Paris, Île-de-France");

        assert_eq!(search.text(), "Paris, Île-de-France");
        assert!(search.poll(t0 + Duration::from_secs(1)).is_none());
    }
}
