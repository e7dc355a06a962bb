use crate::config::TelegramConfig;
use crate::error::SinkError;
use crate::models::DomainEvent;
use crate::services::messages::render_event;
use crate::services::notifier::EventSink;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Posts rendered events to a Telegram chat through the Bot API
pub struct TelegramSink {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(config: &TelegramConfig) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Send arbitrary text to the configured chat
    pub async fn send_text(&self, text: &str) -> Result<(), SinkError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl EventSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError> {
        self.send_text(&render_event(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_built_from_config() {
        let config = TelegramConfig {
            api_url: "https://api.telegram.org/".to_string(),
            bot_token: "123:abc".to_string(),
            chat_id: "-10042".to_string(),
            timeout_secs: 5,
        };
        let sink = TelegramSink::new(&config).unwrap();
        assert_eq!(sink.endpoint, "https://api.telegram.org/bot123:abc/sendMessage");
        assert_eq!(sink.chat_id, "-10042");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_reported_not_panicked() {
        let config = TelegramConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            bot_token: "t".to_string(),
            chat_id: "c".to_string(),
            timeout_secs: 1,
        };
        let sink = TelegramSink::new(&config).unwrap();
        let result = sink.send_text("hello").await;
        assert!(matches!(result, Err(SinkError::Http(_))));
    }
}
