use std::time::Duration;

use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

/// Confirmation-code delivery. With no configured API the code is only
/// logged, which is the development backend.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    config: Option<MailConfig>,
}

impl Mailer {
    pub fn new(config: Option<MailConfig>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            config: None,
        }
    }

    pub async fn send_confirmation_code(&self, to: &str, code: &str) -> AppResult<()> {
        let Some(config) = &self.config else {
            tracing::info!(to = %to, code = %code, "mail API not configured, logging confirmation code");
            return Ok(());
        };

        let message = MailMessage {
            from: &config.from_address,
            to: vec![to],
            subject: "Your confirmation code",
            text: &format!("Your confirmation_code is {code}"),
        };

        let response = self
            .client
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("mail request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(anyhow::anyhow!(
                "mail API error: HTTP {status}: {body}"
            )));
        }

        tracing::debug!(to = %to, "confirmation code sent");
        Ok(())
    }
}
