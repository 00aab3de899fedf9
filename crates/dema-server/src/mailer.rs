//! HTTP mail relay client.
//!
//! Messages are posted as JSON to a transactional mail relay; the relay
//! owns SMTP delivery. A non-2xx answer is a failed send.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, Url};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid mail relay URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Attachment as the relay expects it: binary content travels base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub encoding: &'static str,
    pub content: String,
}

impl MailAttachment {
    #[must_use]
    pub fn pdf(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".to_string(),
            encoding: "base64",
            content: STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MailAttachment>,
}

/// Client for the mail relay's send endpoint.
#[derive(Debug, Clone)]
pub struct MailRelay {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl MailRelay {
    /// # Errors
    ///
    /// Returns [`MailError::InvalidUrl`] if `endpoint` does not parse, or
    /// [`MailError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, MailError> {
        let endpoint = Url::parse(endpoint).map_err(|e| MailError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dema-server/0.1 (quote-requests)")
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    /// Post `message` to the relay. No retries.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] on network failure and
    /// [`MailError::Rejected`] on a non-2xx status.
    pub async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(self.endpoint.clone()).json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            to = %message.to.join(", "),
            subject = %message.subject,
            "mail handed to relay"
        );
        Ok(())
    }
}
