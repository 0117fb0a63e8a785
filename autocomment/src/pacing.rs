use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

/// Wait after clicking the comment field and after typing the comment.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);
/// Wait after each typed character.
pub const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(100);
/// Wait between submitting a comment and looking for the next button.
pub const POST_SUBMIT_DELAY: Duration = Duration::from_secs(2);
/// Wait between two cycles, whatever the outcome of the first one.
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(5);

/// Timing of simulated user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub settle: Duration,
    pub keystroke: Duration,
    pub post_submit: Duration,
    pub cycle_interval: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            settle: SETTLE_DELAY,
            keystroke: KEYSTROKE_INTERVAL,
            post_submit: POST_SUBMIT_DELAY,
            cycle_interval: CYCLE_INTERVAL,
        }
    }
}

impl Pacing {
    /// No waiting at all. Only useful with simulated input.
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            keystroke: Duration::ZERO,
            post_submit: Duration::ZERO,
            cycle_interval: Duration::ZERO,
        }
    }
}

/// Optional `pacing` section of the configuration file, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keystroke_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_submit_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_interval_ms: Option<u64>,
}

impl PacingOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, base: Pacing) -> Pacing {
        let or = |ms: Option<u64>, default| ms.map_or(default, Duration::from_millis);
        Pacing {
            settle: or(self.settle_ms, base.settle),
            keystroke: or(self.keystroke_ms, base.keystroke),
            post_submit: or(self.post_submit_ms, base.post_submit),
            cycle_interval: or(self.cycle_interval_ms, base.cycle_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_delays() {
        let overrides = PacingOverrides {
            keystroke_ms: Some(20),
            cycle_interval_ms: Some(10_000),
            ..PacingOverrides::default()
        };
        let pacing = overrides.apply(Pacing::default());
        assert_eq!(pacing.settle, SETTLE_DELAY);
        assert_eq!(pacing.keystroke, Duration::from_millis(20));
        assert_eq!(pacing.post_submit, POST_SUBMIT_DELAY);
        assert_eq!(pacing.cycle_interval, Duration::from_secs(10));
    }

    #[test]
    fn empty_overrides() {
        assert!(PacingOverrides::default().is_empty());
        assert_eq!(
            PacingOverrides::default().apply(Pacing::default()),
            Pacing::default()
        );
    }
}
