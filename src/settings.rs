//! Deserializable client configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::client::{DEFAULT_TIMEOUT, MailerClientBuilder};

#[derive(Debug, Clone, Deserialize)]
/// Client settings as they appear in an application's configuration file.
///
/// ```rust
/// let settings: mailer_client::MailerSettings =
///     serde_json::from_str(r#"{"base_url": "https://mailer.example.com"}"#).unwrap();
/// let client = settings.builder().build().unwrap();
/// assert_eq!(client.timeout(), Some(std::time::Duration::from_secs(10)));
/// ```
pub struct MailerSettings {
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub allow_plaintext_http: bool,
}

impl MailerSettings {
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Turn these settings into a [`MailerClientBuilder`] for further tweaks.
    pub fn builder(self) -> MailerClientBuilder {
        let timeout = self.timeout();
        let mut builder = MailerClientBuilder::new(self.base_url)
            .timeout(timeout)
            .allow_plaintext_http(self.allow_plaintext_http);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder
    }
}
