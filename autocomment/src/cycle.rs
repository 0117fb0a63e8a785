use {
    crate::{
        actuator::Actuator,
        comments::CommentSource,
        locator::{Located, Locator, Target},
        pacing::Pacing,
        session::Session,
        Point,
    },
    rand::{rngs::StdRng, SeedableRng},
    std::{sync::Arc, thread::sleep},
    strum::Display,
    tracing::{debug, error, info, warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    /// The comment file is missing, unreadable or empty.
    NoComments,
    CommentTargetMissing,
    /// Input injection failed while interacting with a found target.
    InteractionFailed,
    NextTargetMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded,
    Failed(FailureReason),
    /// The session is paused; nothing was attempted.
    Skipped,
}

/// One attempt to post a comment and advance to the next video.
pub struct ActionCycle<L, A> {
    session: Arc<Session>,
    comments: CommentSource,
    locator: L,
    actuator: A,
    pacing: Pacing,
    rng: StdRng,
}

impl<L: Locator, A: Actuator> ActionCycle<L, A> {
    pub fn new(
        session: Arc<Session>,
        comments: CommentSource,
        locator: L,
        actuator: A,
        pacing: Pacing,
    ) -> Self {
        Self {
            session,
            comments,
            locator,
            actuator,
            pacing,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn run(&mut self) -> CycleOutcome {
        if self.session.is_paused() {
            debug!("session is paused, skipping cycle");
            return CycleOutcome::Skipped;
        }

        let comment = match self.comments.pick(&mut self.rng) {
            Ok(comment) => comment,
            Err(err) => {
                error!("no comment to post from {:?}: {err}", self.comments.path());
                return self.fail(FailureReason::NoComments);
            }
        };

        let Located::Found(comment_button) = self.locator.locate(Target::CommentButton) else {
            error!("comment button not found");
            return self.fail(FailureReason::CommentTargetMissing);
        };
        if let Err(err) = self.write_comment(comment_button, &comment) {
            error!("failed to write comment: {err:?}");
            return self.fail(FailureReason::InteractionFailed);
        }
        self.session.record_comment(&comment);
        debug!(comment = comment.trim(), "comment submitted");

        sleep(self.pacing.post_submit);
        let Located::Found(next_button) = self.locator.locate(Target::NextButton) else {
            error!("next video button not found");
            return self.fail(FailureReason::NextTargetMissing);
        };
        if let Err(err) = self.actuator.click(next_button) {
            error!("failed to click next video button: {err:?}");
            return self.fail(FailureReason::InteractionFailed);
        }
        self.session.record_success();
        info!("comment posted successfully");
        CycleOutcome::Succeeded
    }

    fn write_comment(&self, at: Point, comment: &str) -> anyhow::Result<()> {
        self.actuator.click(at)?;
        sleep(self.pacing.settle);
        self.actuator.type_text(comment, self.pacing.keystroke)?;
        sleep(self.pacing.settle);
        self.actuator.submit()
    }

    fn fail(&self, reason: FailureReason) -> CycleOutcome {
        let consecutive_errors = self.session.record_failure();
        warn!(%reason, consecutive_errors, "cycle failed");
        CycleOutcome::Failed(reason)
    }
}
