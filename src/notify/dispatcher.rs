//! Best-effort notification delivery
//!
//! One attempt per notification, bounded by a timeout. Delivery failures
//! are logged and never reach the caller.

use std::time::Duration;
use tracing::{debug, warn};

use super::{BoxedNotifier, DiscordNotifier, Notification};
use crate::common::errors::Result;
use crate::config::types::RunConfig;

/// Delivers notifications, swallowing every failure
pub struct NotificationDispatcher {
    notifier: Option<BoxedNotifier>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: BoxedNotifier, timeout: Duration) -> Self {
        Self {
            notifier: Some(notifier),
            timeout,
        }
    }

    /// Dispatcher that drops every notification
    pub fn disabled() -> Self {
        Self {
            notifier: None,
            timeout: Duration::ZERO,
        }
    }

    /// Discord dispatcher for the configured webhook, disabled without one
    pub fn from_run_config(config: &RunConfig) -> Result<Self> {
        let timeout = config.execution.notification_timeout();
        match &config.notification_target {
            Some(url) => Ok(Self::new(
                Box::new(DiscordNotifier::new(url, timeout)?),
                timeout,
            )),
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// One delivery attempt bounded by the timeout. Returns whether the
    /// notification was delivered; failures are only logged.
    pub async fn dispatch(&self, notification: &Notification) -> bool {
        let Some(notifier) = &self.notifier else {
            debug!("No notification channel configured; skipping message");
            return false;
        };

        match tokio::time::timeout(self.timeout, notifier.send(notification)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    "Failed to send {} notification '{}': {}",
                    notifier.channel_name(),
                    notification.title(),
                    e
                );
                false
            }
            Err(_) => {
                warn!(
                    "{} notification '{}' timed out after {:?}",
                    notifier.channel_name(),
                    notification.title(),
                    self.timeout
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field(
                "channel",
                &self.notifier.as_ref().map(|n| n.channel_name()),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}
