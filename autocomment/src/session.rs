use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counters and comment log shared by the cycle and the circuit breaker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub posted_comments: Vec<String>,
    pub comment_count: u64,
    pub consecutive_errors: u32,
    /// Once set, nothing in the process clears it.
    pub paused: bool,
}

/// [SessionState] behind a single lock.
///
/// Every method holds the lock only for its own read-modify-write, so
/// related fields always change together.
#[derive(Debug, Default)]
pub struct Session(Mutex<SessionState>);

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.state().consecutive_errors
    }

    pub fn comment_count(&self) -> u64 {
        self.state().comment_count
    }

    /// Appends the trimmed comment to the log and bumps the comment counter.
    pub fn record_comment(&self, comment: &str) {
        let mut state = self.state();
        state.posted_comments.push(comment.trim().to_owned());
        state.comment_count += 1;
    }

    /// Counts a failed cycle and returns the new number of consecutive errors.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.state();
        state.consecutive_errors = state.consecutive_errors.saturating_add(1);
        state.consecutive_errors
    }

    pub fn record_success(&self) {
        self.state().consecutive_errors = 0;
    }

    /// Pauses the session if it has at least `threshold` consecutive errors.
    ///
    /// Returns `true` only for the call that actually paused it.
    pub fn pause_if_failing(&self, threshold: u32) -> bool {
        let mut state = self.state();
        if state.paused || state.consecutive_errors < threshold {
            return false;
        }
        state.paused = true;
        true
    }

    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }
}
