use {
    crate::{
        actuator::Actuator,
        breaker::CircuitBreaker,
        cycle::{ActionCycle, CycleOutcome},
        locator::Locator,
        notifier::Notifier,
    },
    std::{thread::sleep, time::Duration},
    tracing::{debug, info},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    /// Terminal: the breaker tripped or the session was paused.
    Stopped,
}

/// Runs cycles until the circuit breaker stops them.
pub struct Worker<L, A, N> {
    cycle: ActionCycle<L, A>,
    breaker: CircuitBreaker<N>,
    interval: Duration,
    state: WorkerState,
}

impl<L: Locator, A: Actuator, N: Notifier> Worker<L, A, N> {
    pub fn new(cycle: ActionCycle<L, A>, breaker: CircuitBreaker<N>, interval: Duration) -> Self {
        Self {
            cycle,
            breaker,
            interval,
            state: WorkerState::Running,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs one cycle followed by a breaker check.
    pub fn step(&mut self) -> WorkerState {
        if self.state == WorkerState::Stopped {
            return WorkerState::Stopped;
        }
        let outcome = self.cycle.run();
        debug!(?outcome, "cycle finished");
        let tripped = self.breaker.check_and_trip();
        if tripped || outcome == CycleOutcome::Skipped {
            self.state = WorkerState::Stopped;
        }
        self.state
    }

    /// Loops until [WorkerState::Stopped], sleeping `interval` between cycles.
    pub fn run(mut self) {
        info!(
            interval = ?self.interval,
            threshold = self.breaker.threshold(),
            "automation started"
        );
        while self.step() == WorkerState::Running {
            sleep(self.interval);
        }
        info!(
            comment_count = self.cycle.session().comment_count(),
            "automation stopped"
        );
    }
}
