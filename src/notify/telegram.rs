use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{NotifyError, OrderSnapshot, upi};
use crate::config::{TelegramConfig, UpiConfig};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client used as the chat-bot notification channel.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    /// New-order alert: an HTML summary message first, then the UPI QR as a
    /// photo with a payment caption, mirroring how the shop owner scans it.
    pub async fn send_order_notification(
        &self,
        snapshot: &OrderSnapshot,
        upi_config: &UpiConfig,
        site_url: &str,
    ) -> Result<(), NotifyError> {
        let message = order_message(snapshot, upi_config, site_url);
        self.send_message(&message).await?;

        let note = format!("Order {}", snapshot.reference);
        let uri = upi::payment_uri(upi_config, snapshot.total, &note);
        let png = upi::qr_png(&uri)?;
        let caption = format!(
            "💳 <b>UPI QR code for {}</b>\n\nAmount: ₹{:.2}\nUPI ID: <code>{}</code>\n\n\
             📱 Scan this code to collect the payment.",
            snapshot.reference, snapshot.total, upi_config.upi_id,
        );
        self.send_photo(png, &caption).await
    }

    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(format!(
                "{TELEGRAM_API_BASE}/bot{}/sendMessage",
                self.bot_token
            ))
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        check(response.json::<TelegramResponse>().await?)
    }

    pub async fn send_photo(&self, png: Vec<u8>, caption: &str) -> Result<(), NotifyError> {
        let photo = reqwest::multipart::Part::bytes(png)
            .file_name("upi-qr.png")
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML".to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(format!(
                "{TELEGRAM_API_BASE}/bot{}/sendPhoto",
                self.bot_token
            ))
            .multipart(form)
            .send()
            .await?;

        check(response.json::<TelegramResponse>().await?)
    }
}

fn check(response: TelegramResponse) -> Result<(), NotifyError> {
    if response.ok {
        Ok(())
    } else {
        Err(NotifyError::Api(
            response
                .description
                .unwrap_or_else(|| "unknown Telegram API error".to_string()),
        ))
    }
}

fn order_message(snapshot: &OrderSnapshot, upi_config: &UpiConfig, site_url: &str) -> String {
    let items: String = snapshot
        .lines
        .iter()
        .map(|line| {
            format!(
                "  • {} - Qty: {} × ₹{:.2} = ₹{:.2}\n",
                line.name,
                line.quantity,
                line.price,
                line.price * Decimal::from(line.quantity),
            )
        })
        .collect();

    let phone = snapshot
        .customer_phone
        .as_deref()
        .map(|p| format!("<b>Phone:</b> {p}\n"))
        .unwrap_or_default();

    format!(
        "🛍️ <b>NEW ORDER RECEIVED!</b>\n\n\
         📋 <b>Order:</b> {}\n\
         <b>Status:</b> {}\n\
         <b>Total:</b> ₹{:.2}\n\n\
         👤 <b>Customer:</b> {}\n\
         <b>Email:</b> {}\n{}\n\
         📦 <b>Items:</b>\n{}\n\
         💳 <b>UPI ID:</b> <code>{}</code>\n\n\
         🔗 View in admin: {}/admin/orders",
        snapshot.reference,
        snapshot.status,
        snapshot.total,
        snapshot.customer_name,
        snapshot.customer_email,
        phone,
        items,
        upi_config.upi_id,
        site_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LineSnapshot;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    #[test]
    fn order_message_carries_reference_items_and_upi_id() {
        let snapshot = OrderSnapshot {
            order_id: Uuid::new_v4(),
            reference: "ORD-feedc0de".to_string(),
            customer_name: "Ravi".to_string(),
            customer_email: "ravi@example.com".to_string(),
            customer_phone: None,
            shipping_address: None,
            total: Decimal::from_str("150.00").unwrap(),
            status: "pending".to_string(),
            created_at: Utc::now(),
            lines: vec![LineSnapshot {
                name: "Smart Watch".to_string(),
                quantity: 1,
                price: Decimal::from_str("150.00").unwrap(),
            }],
        };
        let upi_config = UpiConfig {
            upi_id: "shop@upi".to_string(),
            payee_name: "Store".to_string(),
        };
        let message = order_message(&snapshot, &upi_config, "https://shop.example");
        assert!(message.contains("ORD-feedc0de"));
        assert!(message.contains("Smart Watch"));
        assert!(message.contains("shop@upi"));
        assert!(message.contains("https://shop.example/admin/orders"));
        assert!(!message.contains("Phone:"));
    }
}
