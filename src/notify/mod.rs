//! Order notification pipeline: fan-out to admin email, customer email and
//! the Telegram channel, each carrying a UPI payment QR code.

pub mod email;
pub mod telegram;
pub mod upi;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::{AppConfig, UpiConfig};
pub use email::Mailer;
pub use telegram::TelegramClient;

/// Upper bound on concurrently running notification sends. A burst of
/// orders queues behind these permits instead of opening unbounded
/// connections to the providers.
const MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("QR encoding failed: {0}")]
    Qr(String),
}

/// Immutable view of a just-placed order, captured inside the placement
/// transaction so later product edits cannot change what was announced.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub order_id: Uuid,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<LineSnapshot>,
}

#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

struct Channels {
    mailer: Option<Mailer>,
    telegram: Option<TelegramClient>,
    admin_email: Option<String>,
    upi: UpiConfig,
    site_url: String,
    permits: Semaphore,
}

/// Best-effort notification dispatcher.
///
/// `dispatch` is fire-and-forget with at-least-attempt semantics: each of
/// the three channels runs as its own task, failures are caught and logged
/// at the task boundary, and nothing here can fail or delay the order that
/// triggered it. There is no retry, no dead-letter queue and no idempotency
/// key; calling it twice for one order sends duplicate messages.
#[derive(Clone)]
pub struct Notifier {
    channels: Arc<Channels>,
}

impl Notifier {
    pub fn from_config(config: &AppConfig) -> Self {
        let mailer = match &config.smtp {
            Some(smtp) => match Mailer::new(smtp) {
                Ok(mailer) => Some(mailer),
                Err(err) => {
                    tracing::warn!(error = %err, "SMTP misconfigured; email notifications disabled");
                    None
                }
            },
            None => {
                tracing::warn!("SMTP not configured; email notifications disabled");
                None
            }
        };

        let telegram = match &config.telegram {
            Some(telegram) => Some(TelegramClient::new(telegram)),
            None => {
                tracing::warn!("Telegram not configured; chat notifications disabled");
                None
            }
        };

        if config.admin_email.is_none() {
            tracing::warn!("ADMIN_EMAIL not set; admin order emails disabled");
        }

        Self {
            channels: Arc::new(Channels {
                mailer,
                telegram,
                admin_email: config.admin_email.clone(),
                upi: config.upi.clone(),
                site_url: config.site_url.clone(),
                permits: Semaphore::new(MAX_IN_FLIGHT),
            }),
        }
    }

    /// Dispatcher with every channel disabled. Dispatching through it is a
    /// no-op beyond logging, which is exactly the degraded production mode.
    pub fn disabled(upi: UpiConfig, site_url: String) -> Self {
        Self {
            channels: Arc::new(Channels {
                mailer: None,
                telegram: None,
                admin_email: None,
                upi,
                site_url,
                permits: Semaphore::new(MAX_IN_FLIGHT),
            }),
        }
    }

    /// The mail channel, for synchronous flows (password resets) that do
    /// report delivery failure to the caller.
    pub fn mailer(&self) -> Option<&Mailer> {
        self.channels.mailer.as_ref()
    }

    /// Fan the order out to all three channels and return immediately.
    pub fn dispatch(&self, snapshot: OrderSnapshot) {
        self.spawn_admin_email(snapshot.clone());
        self.spawn_customer_email(snapshot.clone());
        self.spawn_telegram(snapshot);
    }

    fn spawn_admin_email(&self, snapshot: OrderSnapshot) {
        let channels = self.channels.clone();
        tokio::spawn(async move {
            let Ok(_permit) = channels.permits.acquire().await else {
                return;
            };
            let (Some(mailer), Some(admin_email)) = (&channels.mailer, &channels.admin_email)
            else {
                tracing::debug!(order_id = %snapshot.order_id, "admin email channel disabled");
                return;
            };
            if let Err(err) = mailer
                .send_admin_order_email(admin_email, &snapshot, &channels.upi)
                .await
            {
                tracing::warn!(
                    error = %err,
                    order_id = %snapshot.order_id,
                    "admin order email failed"
                );
            }
        });
    }

    fn spawn_customer_email(&self, snapshot: OrderSnapshot) {
        let channels = self.channels.clone();
        tokio::spawn(async move {
            let Ok(_permit) = channels.permits.acquire().await else {
                return;
            };
            let Some(mailer) = &channels.mailer else {
                tracing::debug!(order_id = %snapshot.order_id, "customer email channel disabled");
                return;
            };
            if let Err(err) = mailer
                .send_customer_order_email(&snapshot, &channels.upi)
                .await
            {
                tracing::warn!(
                    error = %err,
                    order_id = %snapshot.order_id,
                    "customer order email failed"
                );
            }
        });
    }

    fn spawn_telegram(&self, snapshot: OrderSnapshot) {
        let channels = self.channels.clone();
        tokio::spawn(async move {
            let Ok(_permit) = channels.permits.acquire().await else {
                return;
            };
            let Some(telegram) = &channels.telegram else {
                tracing::debug!(order_id = %snapshot.order_id, "telegram channel disabled");
                return;
            };
            if let Err(err) = telegram
                .send_order_notification(&snapshot, &channels.upi, &channels.site_url)
                .await
            {
                tracing::warn!(
                    error = %err,
                    order_id = %snapshot.order_id,
                    "telegram order notification failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn snapshot() -> OrderSnapshot {
        OrderSnapshot {
            order_id: Uuid::new_v4(),
            reference: "ORD-0badf00d".to_string(),
            customer_name: "Guest".to_string(),
            customer_email: "guest@example.com".to_string(),
            customer_phone: None,
            shipping_address: None,
            total: Decimal::from_str("250.00").unwrap(),
            status: "pending".to_string(),
            created_at: Utc::now(),
            lines: vec![],
        }
    }

    #[tokio::test]
    async fn dispatch_with_disabled_channels_is_a_silent_no_op() {
        let notifier = Notifier::disabled(
            UpiConfig {
                upi_id: "shop@upi".to_string(),
                payee_name: "Store".to_string(),
            },
            "http://localhost:3000".to_string(),
        );
        // Must return immediately and never panic, even twice for one order.
        notifier.dispatch(snapshot());
        notifier.dispatch(snapshot());
        tokio::task::yield_now().await;
    }
}
