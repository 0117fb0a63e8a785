#![allow(dead_code)]

use {
    anyhow::bail,
    autocomment::{
        actuator::Actuator,
        breaker::CircuitBreaker,
        comments::CommentSource,
        cycle::ActionCycle,
        locator::{Located, Locator, Target},
        notifier::Notifier,
        pacing::Pacing,
        session::Session,
        Point,
    },
    rand::{rngs::StdRng, SeedableRng},
    std::{
        collections::HashMap,
        io::Write,
        sync::{Arc, Mutex},
        time::Duration,
    },
    tempfile::NamedTempFile,
};

pub const COMMENT_BUTTON: Point = Point { x: 100, y: 200 };
pub const NEXT_BUTTON: Point = Point { x: 300, y: 400 };

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Locate(Target),
    Click(Point),
    Type(String),
    Submit,
}

#[derive(Default)]
struct FakeScreenState {
    visible: HashMap<Target, Point>,
    failing_input: bool,
    events: Vec<Event>,
}

/// Simulated screen: buttons can be shown or hidden, input is recorded.
#[derive(Clone, Default)]
pub struct FakeScreen(Arc<Mutex<FakeScreenState>>);

impl FakeScreen {
    /// Both buttons visible.
    pub fn new() -> Self {
        let screen = Self::default();
        screen.show(Target::CommentButton, COMMENT_BUTTON);
        screen.show(Target::NextButton, NEXT_BUTTON);
        screen
    }

    pub fn show(&self, target: Target, point: Point) {
        self.0.lock().unwrap().visible.insert(target, point);
    }

    pub fn hide(&self, target: Target) {
        self.0.lock().unwrap().visible.remove(&target);
    }

    pub fn set_failing_input(&self, value: bool) {
        self.0.lock().unwrap().failing_input = value;
    }

    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut self.0.lock().unwrap().events)
    }

    fn record(&self, event: Event) -> anyhow::Result<()> {
        let mut state = self.0.lock().unwrap();
        if state.failing_input {
            bail!("input device unavailable");
        }
        state.events.push(event);
        Ok(())
    }
}

impl Locator for FakeScreen {
    fn locate(&self, target: Target) -> Located {
        let mut state = self.0.lock().unwrap();
        state.events.push(Event::Locate(target));
        match state.visible.get(&target) {
            Some(point) => Located::Found(*point),
            None => Located::NotFound,
        }
    }
}

impl Actuator for FakeScreen {
    fn click(&self, point: Point) -> anyhow::Result<()> {
        self.record(Event::Click(point))
    }

    fn type_text(&self, text: &str, _interval: Duration) -> anyhow::Result<()> {
        self.record(Event::Type(text.into()))
    }

    fn submit(&self) -> anyhow::Result<()> {
        self.record(Event::Submit)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.into());
    }
}

pub fn comment_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub struct Harness {
    pub session: Arc<Session>,
    pub screen: FakeScreen,
    pub notifier: RecordingNotifier,
    pub comments: NamedTempFile,
}

impl Harness {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            session: Arc::new(Session::new()),
            screen: FakeScreen::new(),
            notifier: RecordingNotifier::default(),
            comments: comment_file(lines),
        }
    }

    pub fn cycle(&self) -> ActionCycle<FakeScreen, FakeScreen> {
        ActionCycle::new(
            self.session.clone(),
            CommentSource::new(self.comments.path()),
            self.screen.clone(),
            self.screen.clone(),
            Pacing::immediate(),
        )
        .with_rng(StdRng::seed_from_u64(7))
    }

    pub fn breaker(&self) -> CircuitBreaker<RecordingNotifier> {
        CircuitBreaker::new(self.session.clone(), self.notifier.clone(), 5)
    }
}
