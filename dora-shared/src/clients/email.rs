use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{SendError, SEND_TIMEOUT};

/// Anything that can deliver an email to a single address.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<(), SendError>;
}

#[derive(Clone)]
pub struct ResendClient {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl ResendClient {
    pub fn new(api_key: &str, from_email: &str, from_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<(), SendError> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to_address.to_string()],
            subject: subject.to_string(),
            html: format!("<p>{body}</p>"),
        };

        let response = self.client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Provider(body));
        }

        tracing::debug!(to = %to_address, subject = %subject, "email sent");
        Ok(())
    }
}
