use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::{AppError, AppResult, Transport};
use crate::domain::Destination;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramTransport {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TelegramTransport {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiResp {
    ok: bool,
    description: Option<String>,
}

fn send_message_payload<'a>(
    destination: &'a Destination,
    text: &'a str,
) -> AppResult<SendMessage<'a>> {
    match destination {
        Destination::Watcher { watcher_id } => Ok(SendMessage {
            chat_id: watcher_id,
            text,
            message_thread_id: None,
        }),
        Destination::Group {
            group_id,
            channel_ref,
        } => {
            let message_thread_id = match channel_ref {
                Some(c) => Some(c.parse::<i64>().map_err(|_| {
                    AppError::DeliveryFailed(format!("topic id '{}' is not numeric", c))
                })?),
                None => None,
            };
            Ok(SendMessage {
                chat_id: group_id,
                text,
                message_thread_id,
            })
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, destination: &Destination, text: &str) -> AppResult<()> {
        let payload = send_message_payload(destination, text)?;
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let resp: ApiResp = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::DeliveryFailed(e.without_url().to_string()))?
            .error_for_status()
            .map_err(|e| AppError::DeliveryFailed(e.without_url().to_string()))?
            .json()
            .await
            .map_err(|e| AppError::DeliveryFailed(e.without_url().to_string()))?;

        if !resp.ok {
            return Err(AppError::DeliveryFailed(
                resp.description.unwrap_or_else(|| "telegram returned ok=false".into()),
            ));
        }
        Ok(())
    }
}
