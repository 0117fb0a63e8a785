use {
    crate::{notifier::Notifier, session::Session},
    std::sync::Arc,
    tracing::error,
};

/// Sent to the operator when the breaker trips.
pub const TRIP_MESSAGE: &str =
    "Due to constant errors, the app has stopped. Please inform developers.";

/// Pauses the session after `threshold` consecutive failed cycles.
///
/// There is no automatic reset: a tripped breaker stays tripped for the
/// lifetime of the session.
pub struct CircuitBreaker<N> {
    session: Arc<Session>,
    notifier: N,
    threshold: u32,
}

impl<N: Notifier> CircuitBreaker<N> {
    pub fn new(session: Arc<Session>, notifier: N, threshold: u32) -> Self {
        Self {
            session,
            notifier,
            threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns `true` if this call tripped the breaker. The notifier is called
    /// exactly once per trip.
    pub fn check_and_trip(&self) -> bool {
        if !self.session.pause_if_failing(self.threshold) {
            return false;
        }
        error!(
            threshold = self.threshold,
            "constant errors encountered, stopping the automation"
        );
        self.notifier.notify(TRIP_MESSAGE);
        true
    }
}
