use {
    crate::{
        locator::Templates,
        pacing::{Pacing, PacingOverrides},
    },
    anyhow::Context as _,
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
    thiserror::Error,
};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_COMMENT_FILE: &str = "comment.txt";
pub const DEFAULT_COMMENT_BUTTON_IMAGE: &str = "comment.png";
pub const DEFAULT_NEXT_BUTTON_IMAGE: &str = "click.png";
/// Minimum template match score, from 0.0 to 1.0.
pub const DEFAULT_CONFIDENCE: f32 = 0.8;
/// Consecutive failed cycles that stop the automation.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("webhook URL not set")]
    MissingWebhookUrl,
    #[error("confidence must be between 0.0 and 1.0, got {0}")]
    InvalidConfidence(f32),
    #[error("error threshold must be at least 1")]
    ZeroErrorThreshold,
}

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub webhook_url: String,
    /// Enables webhook notifications.
    #[serde(default)]
    pub debugging: bool,
    #[serde(default = "default_comment_file")]
    pub comment_file: PathBuf,
    #[serde(default = "default_comment_button_image")]
    pub comment_button_image: PathBuf,
    #[serde(
        rename = "next_video_button_image",
        default = "default_next_button_image"
    )]
    pub next_button_image: PathBuf,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    #[serde(default, skip_serializing_if = "PacingOverrides::is_empty")]
    pub pacing: PacingOverrides,
}

fn default_comment_file() -> PathBuf {
    DEFAULT_COMMENT_FILE.into()
}

fn default_comment_button_image() -> PathBuf {
    DEFAULT_COMMENT_BUTTON_IMAGE.into()
}

fn default_next_button_image() -> PathBuf {
    DEFAULT_NEXT_BUTTON_IMAGE.into()
}

fn default_confidence() -> f32 {
    DEFAULT_CONFIDENCE
}

fn default_error_threshold() -> u32 {
    DEFAULT_ERROR_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            debugging: false,
            comment_file: default_comment_file(),
            comment_button_image: default_comment_button_image(),
            next_button_image: default_next_button_image(),
            confidence: DEFAULT_CONFIDENCE,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            pacing: PacingOverrides::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs_err::read_to_string(path)?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {:?}", path))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs_err::write(path, text)?;
        Ok(())
    }

    /// Checks the settings required to start the automation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::MissingWebhookUrl);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::InvalidConfidence(self.confidence));
        }
        if self.error_threshold == 0 {
            return Err(ConfigError::ZeroErrorThreshold);
        }
        Ok(())
    }

    pub fn templates(&self) -> Templates {
        Templates {
            comment_button: self.comment_button_image.clone(),
            next_button: self.next_button_image.clone(),
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing.apply(Pacing::default())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::time::Duration};

    #[test]
    fn missing_keys_use_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"webhook_url": "https://example.com/hook"}"#).unwrap();
        assert_eq!(
            config,
            Config {
                webhook_url: "https://example.com/hook".into(),
                ..Config::default()
            }
        );
        assert_eq!(config.pacing(), Pacing::default());
    }

    #[test]
    fn reads_document_written_by_older_setup() {
        let config: Config = serde_json::from_str(
            r#"{
                "webhook_url": "https://example.com/hook",
                "debugging": true,
                "comment_file": "lines.txt",
                "comment_button_image": "a.png",
                "next_video_button_image": "b.png",
                "unknown": 1
            }"#,
        )
        .unwrap();
        assert!(config.debugging);
        assert_eq!(config.comment_file, Path::new("lines.txt"));
        assert_eq!(config.templates().next_button, Path::new("b.png"));
    }

    #[test]
    fn pacing_section() {
        let config: Config = serde_json::from_str(
            r#"{"webhook_url": "x", "pacing": {"cycle_interval_ms": 250}}"#,
        )
        .unwrap();
        assert_eq!(config.pacing().cycle_interval, Duration::from_millis(250));
        assert_eq!(config.pacing().settle, Pacing::default().settle);
    }

    #[test]
    fn validation() {
        let mut config = Config::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingWebhookUrl));
        config.webhook_url = "  ".into();
        assert_eq!(config.validate(), Err(ConfigError::MissingWebhookUrl));
        config.webhook_url = "https://example.com/hook".into();
        assert_eq!(config.validate(), Ok(()));
        config.confidence = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfidence(1.5)));
        config.confidence = 0.9;
        config.error_threshold = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroErrorThreshold));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            webhook_url: "https://example.com/hook".into(),
            debugging: true,
            ..Config::default()
        };
        config.save(&path).unwrap();
        let text = fs_err::read_to_string(&path).unwrap();
        assert!(text.contains("\"next_video_button_image\": \"click.png\""));
        assert!(!text.contains("pacing"));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_document_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs_err::write(&path, "{not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.json"));
    }
}
