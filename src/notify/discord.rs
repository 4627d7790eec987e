//! Discord webhook notifications

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::format::{format_amount, format_price, format_volume};
use super::{Notification, Notifier};
use crate::common::errors::{DcaError, Result};
use crate::common::types::ExecutionStatus;

const FOOTER: &str = "Kraken DCA Bot";

/// Embed colours per outcome
mod colors {
    pub const STARTED: u32 = 0x3498db;
    pub const SIMULATED: u32 = 0xf39c12;
    pub const FILLED: u32 = 0x27ae60;
    pub const REJECTED: u32 = 0xe74c3c;
    pub const ERROR: u32 = 0xff6b35;
    pub const INSUFFICIENT: u32 = 0xc0392b;
    pub const COMPLETED: u32 = 0x9b59b6;
}

/// Webhook request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Build the Discord embed for a notification
pub fn build_embed(notification: &Notification) -> Embed {
    let timestamp = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    let title = notification.title();

    let (description, color, fields, footer) = match notification {
        Notification::RunStarted { .. } => (
            Some(notification.text()),
            colors::STARTED,
            Vec::new(),
            FOOTER.to_string(),
        ),
        Notification::FundsShortfall {
            currency,
            required,
            available,
        } => (
            None,
            colors::INSUFFICIENT,
            vec![
                EmbedField::new(
                    &format!("Required ({})", currency),
                    format_amount(*required),
                    true,
                ),
                EmbedField::new(
                    &format!("Available ({})", currency),
                    format_amount(*available),
                    true,
                ),
                EmbedField::new(
                    "Status",
                    "Strategies the balance cannot cover will be skipped.".to_string(),
                    false,
                ),
            ],
            format!("{} • Pre-Trade Check", FOOTER),
        ),
        Notification::RunCompleted { stats, .. } => {
            let color = if stats.rejected + stats.errors > 0 {
                colors::ERROR
            } else {
                colors::COMPLETED
            };
            (Some(notification.text()), color, Vec::new(), FOOTER.to_string())
        }
        Notification::StrategyResult(result) => {
            let mut fields = vec![
                EmbedField::new("Trading Pair", format!("`{}`", result.pair), true),
                EmbedField::new("Amount", format_amount(result.amount_fiat), true),
            ];
            if let Some(price) = result.price {
                fields.push(EmbedField::new("Price", format_price(price), true));
            }
            if let Some(volume) = result.volume {
                fields.push(EmbedField::new("Volume", format_volume(volume), true));
            }
            if !result.txids.is_empty() {
                fields.push(EmbedField::new(
                    "Transaction ID",
                    format!("`{}`", result.txids.join(", ")),
                    false,
                ));
            }

            let (color, footer) = match result.status {
                ExecutionStatus::Filled => (colors::FILLED, "Live Trading"),
                ExecutionStatus::Simulated => (colors::SIMULATED, "Dry Run Mode"),
                ExecutionStatus::InsufficientFunds => (colors::INSUFFICIENT, "Pre-Trade Check"),
                ExecutionStatus::Rejected => (colors::REJECTED, "Error"),
                ExecutionStatus::Error => (colors::ERROR, "Exception"),
            };
            if result.status != ExecutionStatus::Filled {
                let detail: String = result.detail.chars().take(1000).collect();
                fields.push(EmbedField::new("Details", format!("```{}```", detail), false));
            }
            (None, color, fields, format!("{} • {}", FOOTER, footer))
        }
    };

    Embed {
        title,
        description,
        color,
        fields,
        timestamp,
        footer: EmbedFooter { text: footer },
    }
}

/// Notifier posting embeds to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DcaError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    #[instrument(skip_all)]
    async fn send(&self, notification: &Notification) -> Result<()> {
        let payload = WebhookPayload {
            embeds: vec![build_embed(notification)],
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DcaError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(300).collect();
            return Err(DcaError::Notification(format!(
                "webhook returned status {}: {}",
                status, body
            )));
        }

        debug!("Discord notification delivered: {}", payload.embeds[0].title);
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "discord"
    }
}
