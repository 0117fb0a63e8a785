use {
    autocomment_driver::{Key, Point},
    std::{sync::Arc, time::Duration},
};

/// Simulated user input.
pub trait Actuator {
    fn click(&self, point: Point) -> anyhow::Result<()>;
    /// Types `text` character by character, waiting `interval` after each one.
    fn type_text(&self, text: &str, interval: Duration) -> anyhow::Result<()>;
    /// Presses the key that sends the typed comment.
    fn submit(&self) -> anyhow::Result<()>;
}

impl<T: Actuator + ?Sized> Actuator for Arc<T> {
    fn click(&self, point: Point) -> anyhow::Result<()> {
        (**self).click(point)
    }

    fn type_text(&self, text: &str, interval: Duration) -> anyhow::Result<()> {
        (**self).type_text(text, interval)
    }

    fn submit(&self) -> anyhow::Result<()> {
        (**self).submit()
    }
}

impl Actuator for autocomment_driver::Context {
    fn click(&self, point: Point) -> anyhow::Result<()> {
        self.mouse_left_click_at(point)
    }

    fn type_text(&self, text: &str, interval: Duration) -> anyhow::Result<()> {
        self.type_text_paced(text, interval)
    }

    fn submit(&self) -> anyhow::Result<()> {
        self.key(Key::Return)
    }
}
