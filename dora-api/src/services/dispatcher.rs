use std::collections::BTreeSet;

use dora_shared::clients::email::EmailSender;
use dora_shared::clients::sms::SmsSender;
use dora_shared::clients::SendError;

/// One delivery attempt against one recipient.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub recipient: String,
    pub result: Result<(), SendError>,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Text `message` to every number in the set.
///
/// A disabled channel or an empty recipient set skips the channel
/// without touching the sender. Each send is fault-bounded on its own:
/// a failure is logged and recorded, and the loop moves on so one bad
/// number never starves the rest of the batch.
pub async fn dispatch_text(
    sms: &dyn SmsSender,
    enabled: bool,
    message: &str,
    numbers: &BTreeSet<String>,
) -> Vec<DispatchOutcome> {
    if !enabled || numbers.is_empty() {
        tracing::info!("skipping text alerts");
        return vec![];
    }

    let mut outcomes = Vec::with_capacity(numbers.len());
    for number in numbers {
        let result = sms.send(message, number).await;
        if let Err(e) = &result {
            tracing::warn!(to = %number, error = %e, "text alert failed");
        }
        outcomes.push(DispatchOutcome {
            recipient: number.clone(),
            result,
        });
    }

    let sent = outcomes.iter().filter(|o| o.succeeded()).count();
    tracing::info!(sent, failed = outcomes.len() - sent, "text alerts dispatched");
    outcomes
}

/// Email every address in the set. Same skip and fault-bounding rules
/// as [`dispatch_text`].
pub async fn dispatch_email(
    email: &dyn EmailSender,
    enabled: bool,
    subject: &str,
    body: &str,
    addresses: &BTreeSet<String>,
) -> Vec<DispatchOutcome> {
    if !enabled || addresses.is_empty() {
        tracing::info!("skipping email alerts");
        return vec![];
    }

    let mut outcomes = Vec::with_capacity(addresses.len());
    for address in addresses {
        let result = email.send(subject, body, address).await;
        if let Err(e) = &result {
            tracing::warn!(to = %address, error = %e, "email alert failed");
        }
        outcomes.push(DispatchOutcome {
            recipient: address.clone(),
            result,
        });
    }

    let sent = outcomes.iter().filter(|o| o.succeeded()).count();
    tracing::info!(sent, failed = outcomes.len() - sent, "email alerts dispatched");
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSms {
        calls: Mutex<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl SmsSender for RecordingSms {
        async fn send(&self, body: &str, to_number: &str) -> Result<(), SendError> {
            self.calls
                .lock()
                .unwrap()
                .push((body.to_string(), to_number.to_string()));
            if self.fail_for.as_deref() == Some(to_number) {
                return Err(SendError::Provider("bad number".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingEmail {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl EmailSender for RecordingEmail {
        async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<(), SendError> {
            self.calls.lock().unwrap().push((
                subject.to_string(),
                body.to_string(),
                to_address.to_string(),
            ));
            Ok(())
        }
    }

    fn numbers(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn disabled_channel_never_touches_the_sender() {
        let sms = RecordingSms::default();
        let outcomes = dispatch_text(&sms, false, "hi", &numbers(&["+15550001"])).await;

        assert!(outcomes.is_empty());
        assert!(sms.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_recipient_set_is_skipped() {
        let sms = RecordingSms::default();
        let outcomes = dispatch_text(&sms, true, "hi", &BTreeSet::new()).await;

        assert!(outcomes.is_empty());
        assert!(sms.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_number_gets_the_message() {
        let sms = RecordingSms::default();
        let outcomes =
            dispatch_text(&sms, true, "Fire\nEvacuate now", &numbers(&["+15550001", "+15550002"]))
                .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(DispatchOutcome::succeeded));

        let calls = sms.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(body, _)| body == "Fire\nEvacuate now"));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_loop() {
        let sms = RecordingSms {
            fail_for: Some("+15550002".into()),
            ..Default::default()
        };
        let outcomes = dispatch_text(
            &sms,
            true,
            "hi",
            &numbers(&["+15550001", "+15550002", "+15550003"]),
        )
        .await;

        assert_eq!(sms.calls.lock().unwrap().len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.succeeded()).count(), 2);
        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.recipient.as_str())
            .collect();
        assert_eq!(failed, vec!["+15550002"]);
    }

    #[tokio::test]
    async fn email_dispatch_carries_subject_and_body() {
        let email = RecordingEmail::default();
        let outcomes = dispatch_email(
            &email,
            true,
            "Alert from Dora: Fire",
            "Evacuate now",
            &numbers(&["a@example.com"]),
        )
        .await;

        assert_eq!(outcomes.len(), 1);
        let calls = email.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                "Alert from Dora: Fire".to_string(),
                "Evacuate now".to_string(),
                "a@example.com".to_string()
            )
        );
    }

    #[tokio::test]
    async fn disabled_email_channel_is_skipped() {
        let email = RecordingEmail::default();
        let outcomes =
            dispatch_email(&email, false, "s", "b", &numbers(&["a@example.com"])).await;

        assert!(outcomes.is_empty());
        assert!(email.calls.lock().unwrap().is_empty());
    }
}
