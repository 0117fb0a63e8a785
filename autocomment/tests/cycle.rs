mod common;

use {
    autocomment::{
        cycle::{CycleOutcome, FailureReason},
        locator::Target,
    },
    common::{Event, Harness, COMMENT_BUTTON, NEXT_BUTTON},
};

#[test]
fn successful_cycle_posts_and_advances() {
    let harness = Harness::new(&["gg", "nice"]);
    harness.session.record_failure();
    harness.session.record_failure();

    let outcome = harness.cycle().run();

    assert_eq!(outcome, CycleOutcome::Succeeded);
    let state = harness.session.snapshot();
    assert_eq!(state.comment_count, 1);
    assert_eq!(state.consecutive_errors, 0);
    assert!(["gg", "nice"].contains(&state.posted_comments[0].as_str()));

    let typed = state.posted_comments[0].clone();
    assert_eq!(
        harness.screen.take_events(),
        [
            Event::Locate(Target::CommentButton),
            Event::Click(COMMENT_BUTTON),
            Event::Type(typed),
            Event::Submit,
            Event::Locate(Target::NextButton),
            Event::Click(NEXT_BUTTON),
        ]
    );
}

#[test]
fn missing_comment_button_fails_without_posting() {
    let harness = Harness::new(&["gg", "nice"]);
    harness.screen.hide(Target::CommentButton);

    let outcome = harness.cycle().run();

    assert_eq!(
        outcome,
        CycleOutcome::Failed(FailureReason::CommentTargetMissing)
    );
    let state = harness.session.snapshot();
    assert_eq!(state.comment_count, 0);
    assert!(state.posted_comments.is_empty());
    assert_eq!(state.consecutive_errors, 1);
    assert_eq!(
        harness.screen.take_events(),
        [Event::Locate(Target::CommentButton)]
    );
}

#[test]
fn missing_next_button_keeps_posted_comment() {
    let harness = Harness::new(&["gg", "nice"]);
    harness.screen.hide(Target::NextButton);

    let outcome = harness.cycle().run();

    assert_eq!(outcome, CycleOutcome::Failed(FailureReason::NextTargetMissing));
    let state = harness.session.snapshot();
    assert_eq!(state.comment_count, 1);
    assert_eq!(state.posted_comments.len(), 1);
    assert_eq!(state.consecutive_errors, 1);
}

#[test]
fn comment_is_typed_as_is_and_recorded_trimmed() {
    let harness = Harness::new(&["  so good  "]);

    assert_eq!(harness.cycle().run(), CycleOutcome::Succeeded);

    assert!(harness
        .screen
        .take_events()
        .contains(&Event::Type("  so good  ".into())));
    assert_eq!(harness.session.snapshot().posted_comments, ["so good"]);
}

#[test]
fn empty_comment_pool_counts_as_failure() {
    let harness = Harness::new(&[]);

    let outcome = harness.cycle().run();

    assert_eq!(outcome, CycleOutcome::Failed(FailureReason::NoComments));
    assert_eq!(harness.session.consecutive_errors(), 1);
    assert_eq!(harness.session.comment_count(), 0);
    assert!(harness.screen.take_events().is_empty());
}

#[test]
fn comment_file_is_reread_every_cycle() {
    let harness = Harness::new(&["old"]);
    let mut cycle = harness.cycle();
    assert_eq!(cycle.run(), CycleOutcome::Succeeded);

    fs_err::write(harness.comments.path(), "new\n").unwrap();
    assert_eq!(cycle.run(), CycleOutcome::Succeeded);

    assert_eq!(harness.session.snapshot().posted_comments, ["old", "new"]);
}

#[test]
fn input_failure_is_a_failed_cycle() {
    let harness = Harness::new(&["gg"]);
    harness.screen.set_failing_input(true);

    let outcome = harness.cycle().run();

    assert_eq!(outcome, CycleOutcome::Failed(FailureReason::InteractionFailed));
    assert_eq!(harness.session.comment_count(), 0);
    assert_eq!(harness.session.consecutive_errors(), 1);
}

#[test]
fn paused_session_skips_without_side_effects() {
    let harness = Harness::new(&["gg"]);
    for _ in 0..5 {
        harness.session.record_failure();
    }
    assert!(harness.session.pause_if_failing(5));
    let before = harness.session.snapshot();

    let mut cycle = harness.cycle();
    for _ in 0..3 {
        assert_eq!(cycle.run(), CycleOutcome::Skipped);
    }

    assert_eq!(harness.session.snapshot(), before);
    assert!(harness.screen.take_events().is_empty());
}

#[test]
fn count_matches_log_over_mixed_cycles() {
    let harness = Harness::new(&["gg", "nice", "wow"]);
    let mut cycle = harness.cycle();
    for i in 0..12 {
        match i % 3 {
            0 => harness.screen.hide(Target::CommentButton),
            1 => harness.screen.hide(Target::NextButton),
            _ => {
                harness.screen.show(Target::CommentButton, COMMENT_BUTTON);
                harness.screen.show(Target::NextButton, NEXT_BUTTON);
            }
        }
        let outcome = cycle.run();
        let state = harness.session.snapshot();
        assert_eq!(state.comment_count, state.posted_comments.len() as u64);
        if outcome == CycleOutcome::Succeeded {
            assert_eq!(state.consecutive_errors, 0);
        }
    }
}
