//! Walk state definitions for the paginated listing crawl
//!
//! A walk moves `Fetching -> Extracting -> Deciding` for each page, then
//! either back to `Fetching` for the next page or to `Done`.
use crate::SweepError;
use std::fmt;

/// Phase of a pagination walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkPhase {
    /// Fetching the current page
    Fetching,

    /// Reading listing cards from the fetched page
    Extracting,

    /// Checking the stop threshold and looking for a next page
    Deciding,

    /// Walk finished; see [`StopReason`]
    Done,
}

impl WalkPhase {
    /// Returns true if `next` may follow this phase
    pub fn can_transition_to(&self, next: WalkPhase) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Done)
                | (Self::Extracting, Self::Deciding)
                | (Self::Deciding, Self::Fetching)
                | (Self::Deciding, Self::Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Deciding => "deciding",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WalkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pagination walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The unique-seller threshold was reached
    LimitReached { unique_sellers: usize },

    /// The last page had no next-page link
    Exhausted,

    /// The next-page link pointed back at a page already walked
    Cycle { url: String },

    /// A page could not be fetched; earlier pages are kept
    FetchFailed { url: String, error: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitReached { unique_sellers } => {
                write!(f, "limit reached with {} unique sellers", unique_sellers)
            }
            Self::Exhausted => write!(f, "no next page"),
            Self::Cycle { url } => write!(f, "next page {} already visited", url),
            Self::FetchFailed { url, error } => write!(f, "fetch of {} failed: {}", url, error),
        }
    }
}

/// Tracks the phase of one walk and rejects out-of-order transitions
#[derive(Debug, Clone)]
pub struct WalkState {
    phase: WalkPhase,
    pages: usize,
}

impl Default for WalkState {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkState {
    /// A walk starts by fetching its seed page
    pub fn new() -> Self {
        Self {
            phase: WalkPhase::Fetching,
            pages: 0,
        }
    }

    pub fn phase(&self) -> WalkPhase {
        self.phase
    }

    /// Pages whose extraction has started
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Moves to `next`, or fails if the walk cannot go there from here
    pub fn advance(&mut self, next: WalkPhase) -> Result<(), SweepError> {
        if !self.phase.can_transition_to(next) {
            return Err(SweepError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Walk phase {} -> {}", self.phase, next);
        if next == WalkPhase::Extracting {
            self.pages += 1;
        }
        self.phase = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cycle() {
        let mut state = WalkState::new();
        state.advance(WalkPhase::Extracting).unwrap();
        state.advance(WalkPhase::Deciding).unwrap();
        state.advance(WalkPhase::Fetching).unwrap();
        state.advance(WalkPhase::Extracting).unwrap();
        state.advance(WalkPhase::Deciding).unwrap();
        state.advance(WalkPhase::Done).unwrap();

        assert_eq!(state.pages(), 2);
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn test_fetch_failure_ends_walk() {
        let mut state = WalkState::new();
        state.advance(WalkPhase::Done).unwrap();
        assert_eq!(state.pages(), 0);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut state = WalkState::new();
        assert!(matches!(
            state.advance(WalkPhase::Deciding),
            Err(SweepError::InvalidTransition {
                from: WalkPhase::Fetching,
                to: WalkPhase::Deciding
            })
        ));

        state.advance(WalkPhase::Done).unwrap();
        assert!(state.advance(WalkPhase::Fetching).is_err());
        assert!(!WalkPhase::Extracting.can_transition_to(WalkPhase::Done));
    }

    #[test]
    fn test_display() {
        assert_eq!(WalkPhase::Deciding.to_string(), "deciding");
        assert_eq!(
            StopReason::LimitReached { unique_sellers: 3 }.to_string(),
            "limit reached with 3 unique sellers"
        );
        assert_eq!(StopReason::Exhausted.to_string(), "no next page");
    }
}
