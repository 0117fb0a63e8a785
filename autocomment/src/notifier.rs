use {
    crate::config::Config,
    anyhow::bail,
    reqwest::{blocking::Client, StatusCode},
    serde::Serialize,
    std::{sync::Arc, time::Duration},
    tracing::{debug, error, info},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers operator-facing alerts. Delivery problems are logged, never returned.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Posts `{"content": message}` to a chat webhook (Discord-compatible).
pub struct WebhookNotifier {
    client: Client,
    url: String,
    enabled: bool,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, enabled: bool) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url: url.into(),
            enabled,
        })
    }

    /// Notifications are only sent when `debugging` is enabled in the configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.webhook_url.clone(), config.debugging)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.url.is_empty()
    }

    /// Sends one message, without retrying. Anything but `204 No Content` is an error.
    pub fn deliver(&self, message: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookMessage { content: message })
            .send()?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            bail!("webhook responded with status code {status}");
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, message: &str) {
        if !self.is_enabled() {
            debug!("notifications are disabled, dropping message: {message:?}");
            return;
        }
        match self.deliver(message) {
            Ok(()) => info!("webhook notification sent"),
            Err(err) => error!("failed to send webhook notification: {err:?}"),
        }
    }
}
