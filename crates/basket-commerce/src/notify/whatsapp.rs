//! WhatsApp click-to-chat notifications.

use std::sync::Arc;

use async_trait::async_trait;
use url::{form_urlencoded, Url};

use super::{NotificationChannel, NotifyError, OrderNotification};

/// Store number that receives order messages.
pub const DEFAULT_RECIPIENT: &str = "917892783668";

/// Receives the finished `wa.me` link (opens it, prints it, queues it).
pub trait LinkSink: Send + Sync {
    fn deliver(&self, link: &Url) -> Result<(), NotifyError>;
}

/// Sink that only logs the link.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LinkSink for LogSink {
    fn deliver(&self, link: &Url) -> Result<(), NotifyError> {
        tracing::info!(link = %link, "whatsapp notification ready");
        Ok(())
    }
}

/// Builds `https://wa.me/<recipient>?text=<message>` links.
#[derive(Clone)]
pub struct WhatsAppChannel {
    recipient: String,
    sink: Arc<dyn LinkSink>,
}

impl WhatsAppChannel {
    pub fn new(recipient: impl Into<String>, sink: Arc<dyn LinkSink>) -> Self {
        Self {
            recipient: recipient.into(),
            sink,
        }
    }

    /// Channel to the store number that only logs links.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RECIPIENT, Arc::new(LogSink))
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Build the click-to-chat link for `message`.
    pub fn link(&self, message: &str) -> Result<Url, NotifyError> {
        let digits: String = self.recipient.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(NotifyError::Build(format!(
                "invalid recipient number: {:?}",
                self.recipient
            )));
        }
        // Spaces as %20; literal '+' is already escaped as %2B.
        let text = form_urlencoded::byte_serialize(message.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        Url::parse(&format!("https://wa.me/{}?text={}", digits, text))
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl NotificationChannel for WhatsAppChannel {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError> {
        let link = self.link(&notification.render())?;
        self.sink.deliver(&link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl LinkSink for Collect {
        fn deliver(&self, link: &Url) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(link.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_link_encoding() {
        let channel = WhatsAppChannel::with_defaults();
        let link = channel.link("Total: ₹1+1 & more").unwrap();
        let s = link.as_str();
        assert!(s.starts_with("https://wa.me/917892783668?text="));
        assert!(s.contains("Total%3A%20"));
        assert!(s.contains("%2B"));
        assert!(s.contains("%26"));
        assert!(!s.contains(' '));

        let text = link
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(text, "Total: ₹1+1 & more");
    }

    #[test]
    fn test_bad_recipient() {
        let channel = WhatsAppChannel::new("n/a", Arc::new(LogSink));
        assert!(matches!(channel.link("hi"), Err(NotifyError::Build(_))));
    }

    #[tokio::test]
    async fn test_send_hands_link_to_sink() {
        use crate::checkout::{Customer, Order};

        let sink = Arc::new(Collect::default());
        let channel = WhatsAppChannel::new("+91 78927 83668", sink.clone());
        let order: Order = serde_json::from_value(serde_json::json!({"id": 3})).unwrap();
        let notification = OrderNotification {
            order,
            review: None,
            customer: Customer {
                email: "a@b.c".to_string(),
                name: "A".to_string(),
                phone: None,
            },
            location: None,
        };
        channel.send(&notification).await.unwrap();
        let links = sink.0.lock().unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].starts_with("https://wa.me/917892783668?text="));
    }
}
