use {
    autocomment_driver::{load_image, DriverError, Point, RgbaImage},
    std::{
        path::{Path, PathBuf},
        sync::Arc,
    },
    strum::{Display, EnumIter},
    tracing::{debug, error},
};

/// On-screen elements the automation interacts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Target {
    /// The field that opens the comment input.
    CommentButton,
    /// The control that advances the feed to the next video.
    NextButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Found(Point),
    NotFound,
}

pub trait Locator {
    /// Looks for `target` on the current screen. Never fails: any problem is
    /// logged and reported as [Located::NotFound].
    fn locate(&self, target: Target) -> Located;
}

impl<T: Locator + ?Sized> Locator for Arc<T> {
    fn locate(&self, target: Target) -> Located {
        (**self).locate(target)
    }
}

/// Template image paths for each [Target].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub comment_button: PathBuf,
    pub next_button: PathBuf,
}

impl Templates {
    pub fn path(&self, target: Target) -> &Path {
        match target {
            Target::CommentButton => &self.comment_button,
            Target::NextButton => &self.next_button,
        }
    }
}

/// A screen that templates can be searched on.
pub trait Screen {
    /// Center of the best match scoring at least `confidence`, if any.
    fn locate_on_screen(
        &self,
        template: &RgbaImage,
        confidence: f32,
    ) -> anyhow::Result<Option<Point>>;
}

impl Screen for autocomment_driver::Context {
    fn locate_on_screen(
        &self,
        template: &RgbaImage,
        confidence: f32,
    ) -> anyhow::Result<Option<Point>> {
        autocomment_driver::Context::locate_on_screen(self, template, confidence)
    }
}

/// Finds targets by matching their template images against a screenshot.
pub struct ScreenLocator<S = autocomment_driver::Context> {
    screen: S,
    templates: Templates,
    confidence: f32,
}

impl<S: Screen> ScreenLocator<S> {
    pub fn new(screen: S, templates: Templates, confidence: f32) -> Self {
        Self {
            screen,
            templates,
            confidence,
        }
    }

    fn try_locate(&self, target: Target) -> anyhow::Result<Option<Point>> {
        // Loaded on every call so templates can be replaced without a restart.
        let template = load_image(self.templates.path(target))?;
        self.screen.locate_on_screen(&template, self.confidence)
    }
}

impl<S: Screen> Locator for ScreenLocator<S> {
    fn locate(&self, target: Target) -> Located {
        match self.try_locate(target) {
            Ok(Some(point)) => {
                debug!("found {target} at {point}");
                Located::Found(point)
            }
            Ok(None) => {
                debug!("{target} is not on screen");
                Located::NotFound
            }
            Err(err) => {
                if let Some(DriverError::FailSafe) = err.downcast_ref::<DriverError>() {
                    error!("failed to locate {target}: {err}");
                } else {
                    error!(
                        "error locating {target} using {:?}: {err:?}",
                        self.templates.path(target)
                    );
                }
                Located::NotFound
            }
        }
    }
}
