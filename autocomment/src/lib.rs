//! Posts comments on a video feed by finding the feed's buttons on screen.
//!
//! One [worker::Worker] repeatedly runs an [cycle::ActionCycle]: pick a
//! comment, click the comment field, type, submit and advance to the next
//! video. A [breaker::CircuitBreaker] stops the worker after too many
//! consecutive failures and alerts the operator through a [notifier::Notifier].

pub mod actuator;
pub mod breaker;
pub mod comments;
pub mod config;
pub mod cycle;
pub mod locator;
pub mod notifier;
pub mod pacing;
pub mod session;
pub mod setup;
pub mod worker;

pub use autocomment_driver::Point;
