use async_trait::async_trait;
use reqwest::Client;

use super::{SendError, SEND_TIMEOUT};

/// Anything that can deliver a text message to a single phone number.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, body: &str, to_number: &str) -> Result<(), SendError>;
}

#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    pub fn new(account_sid: &str, auth_token: &str, from_number: &str) -> Self {
        Self {
            client: Client::new(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        }
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send(&self, body: &str, to_number: &str) -> Result<(), SendError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let params = [
            ("To", to_number),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self.client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Provider(body));
        }

        tracing::debug!(to = %to_number, "text message sent");
        Ok(())
    }
}
