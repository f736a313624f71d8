//! Microsoft Teams incoming-webhook notifications.
//!
//! Posts a legacy `MessageCard` with a title and a text body. Delivery is
//! best effort: callers log the error and carry on.

use crate::error::{CoreError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_runtime::config::TeamsConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct MessageCard<'a> {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    summary: &'a str,
    title: &'a str,
    text: &'a str,
}

pub struct TeamsNotifier {
    http_client: Arc<dyn HttpClient>,
    webhook_url: String,
}

impl TeamsNotifier {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &TeamsConfig) -> Self {
        Self {
            http_client,
            webhook_url: config.url.trim().to_string(),
        }
    }

    /// Post one card to the channel.
    #[instrument(skip(self, text))]
    pub async fn send(&self, title: &str, text: &str) -> Result<()> {
        let card = MessageCard {
            card_type: "MessageCard",
            context: "http://schema.org/extensions",
            summary: title,
            title,
            text,
        };

        let request = HttpRequest::new(HttpMethod::Post, self.webhook_url.as_str())
            .json(&card)
            .map_err(|e| CoreError::Notification(e.to_string()))?
            .timeout(WEBHOOK_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| CoreError::Notification(e.to_string()))?;

        if !response.is_success() {
            warn!(status = response.status, "Teams webhook rejected the message");
            return Err(CoreError::Notification(format!(
                "webhook returned {}",
                response.status
            )));
        }

        debug!("Teams notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn notifier(http: MockHttpClient) -> TeamsNotifier {
        TeamsNotifier::new(
            Arc::new(http),
            &TeamsConfig {
                url: "https://contoso.webhook.office.com/webhookb2/abc".to_string(),
            },
        )
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(b"1"),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message_card() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                let body: serde_json::Value =
                    serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
                request.method == HttpMethod::Post
                    && request.url == "https://contoso.webhook.office.com/webhookb2/abc"
                    && body["@type"] == "MessageCard"
                    && body["title"] == "PrEP refresh"
                    && body["text"] == "download: 2 transferred, 1 skipped, 0 failed"
            })
            .times(1)
            .returning(|_| Ok(response(200)));

        notifier(http)
            .send("PrEP refresh", "download: 2 transferred, 1 skipped, 0 failed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_webhook() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| Ok(response(400)));

        let error = notifier(http).send("t", "x").await.unwrap_err();
        assert!(matches!(error, CoreError::Notification(ref m) if m.contains("400")));
    }

    #[tokio::test]
    async fn test_unreachable_webhook() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("dns error".to_string())));

        assert!(matches!(
            notifier(http).send("t", "x").await,
            Err(CoreError::Notification(_))
        ));
    }
}
