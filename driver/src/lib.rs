mod matcher;

pub use {
    crate::matcher::{find_template, Match},
    enigo::{Button, Key},
    image::RgbaImage,
};

use {
    anyhow::Context as _,
    derive_more::Display,
    enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse},
    image::ImageReader,
    std::{
        path::Path,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
        thread::sleep,
        time::Duration,
    },
    thiserror::Error,
    tracing::debug,
};

/// Pause after every injected input event so the target application can process it.
const EVENT_DELAY: Duration = Duration::from_millis(50);

/// Pointer position that aborts any automated action.
///
/// Moving the mouse into the top-left corner is the operator's emergency brake.
pub const FAIL_SAFE_POINT: Point = Point { x: 0, y: 0 };

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("fail-safe triggered: pointer is in the top-left screen corner")]
    FailSafe,
    #[error("no monitors found")]
    NoMonitors,
}

/// A position in global pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("({x}, {y})")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A captured frame of the primary monitor.
pub struct Screenshot {
    pub image: RgbaImage,
    /// Global position of the monitor's top-left corner.
    pub origin: Point,
    /// Physical pixels per pointer unit (2.0 on a typical HiDPI display).
    pub scale_factor: f32,
}

impl Screenshot {
    /// Converts a pixel position in [Screenshot::image] to global pointer coordinates.
    pub fn to_global(&self, x: u32, y: u32) -> Point {
        let scale = if self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        Point {
            x: self.origin.x + (x as f32 / scale).round() as i32,
            y: self.origin.y + (y as f32 / scale).round() as i32,
        }
    }
}

struct ContextData {
    enigo: Mutex<Enigo>,
    event_delay: Duration,
}

#[derive(Clone)]
pub struct Context(Arc<ContextData>);

impl Context {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self(Arc::new(ContextData {
            enigo: Mutex::new(Enigo::new(&enigo::Settings::default())?),
            event_delay: EVENT_DELAY,
        })))
    }

    fn enigo(&self) -> MutexGuard<'_, Enigo> {
        self.0.enigo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pointer_location(&self) -> anyhow::Result<Point> {
        let (x, y) = self.enigo().location()?;
        Ok(Point { x, y })
    }

    /// Returns [DriverError::FailSafe] if the operator parked the pointer at [FAIL_SAFE_POINT].
    ///
    /// Backends that can't report the pointer location (e.g. some Wayland
    /// compositors) never trigger the fail-safe.
    pub fn check_fail_safe(&self) -> anyhow::Result<()> {
        match self.pointer_location() {
            Ok(point) if point == FAIL_SAFE_POINT => Err(DriverError::FailSafe.into()),
            Ok(_) => Ok(()),
            Err(err) => {
                debug!("failed to query pointer location: {err:?}");
                Ok(())
            }
        }
    }

    pub fn mouse_move_global(&self, point: Point) -> anyhow::Result<()> {
        self.check_fail_safe()?;
        self.enigo().move_mouse(point.x, point.y, Coordinate::Abs)?;
        sleep(self.0.event_delay);
        Ok(())
    }

    pub fn mouse_click(&self, button: Button) -> anyhow::Result<()> {
        self.check_fail_safe()?;
        self.enigo().button(button, Direction::Click)?;
        sleep(self.0.event_delay);
        Ok(())
    }

    pub fn mouse_left_click_at(&self, point: Point) -> anyhow::Result<()> {
        debug!("clicking at {point}");
        self.mouse_move_global(point)?;
        self.mouse_click(Button::Left)
    }

    // https://wiki.linuxquestions.org/wiki/List_of_keysyms
    pub fn key(&self, key: Key) -> anyhow::Result<()> {
        self.check_fail_safe()?;
        self.enigo().key(key, Direction::Click)?;
        sleep(self.0.event_delay);
        Ok(())
    }

    /// Types `text` one character at a time, waiting `interval` after each character.
    ///
    /// The fail-safe is checked before every character, so typing can be
    /// interrupted halfway through.
    pub fn type_text_paced(&self, text: &str, interval: Duration) -> anyhow::Result<()> {
        let mut buf = [0; 4];
        for c in text.chars() {
            self.check_fail_safe()?;
            self.enigo().text(c.encode_utf8(&mut buf))?;
            sleep(interval);
        }
        Ok(())
    }

    /// Finds `template` on the primary monitor.
    ///
    /// Returns the center of the best match scoring at least `confidence`,
    /// in global pointer coordinates.
    pub fn locate_on_screen(
        &self,
        template: &RgbaImage,
        confidence: f32,
    ) -> anyhow::Result<Option<Point>> {
        self.check_fail_safe()?;
        let screenshot = self.capture_full_screen()?;
        let Some(found) = find_template(&screenshot.image, template, confidence) else {
            return Ok(None);
        };
        debug!(score = found.score, "template matched at {:?}", (found.x, found.y));
        let (x, y) = found.center();
        Ok(Some(screenshot.to_global(x, y)))
    }

    /// Captures the primary monitor, or the first one if none is marked as primary.
    pub fn capture_full_screen(&self) -> anyhow::Result<Screenshot> {
        let monitors = xcap::Monitor::all()?;
        let primary = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors.get(primary).ok_or(DriverError::NoMonitors)?;
        let image = monitor
            .capture_image()
            .context("failed to capture monitor image")?;
        Ok(Screenshot {
            image,
            origin: Point {
                x: monitor.x()?,
                y: monitor.y()?,
            },
            scale_factor: monitor.scale_factor()?,
        })
    }
}

pub fn load_image(path: &Path) -> anyhow::Result<RgbaImage> {
    let reader =
        ImageReader::open(path).with_context(|| format!("failed to open image {:?}", path))?;
    let image = reader
        .decode()
        .with_context(|| format!("failed to decode image {:?}", path))?;
    Ok(image.into_rgba8())
}
