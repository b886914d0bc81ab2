use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;

use super::{NotifyError, OrderSnapshot, upi};
use crate::config::{SmtpConfig, UpiConfig};

/// Content-id under which the UPI QR image is embedded in order emails.
const QR_CONTENT_ID: &str = "upi-qr";

/// SMTP mailer for transactional email. Order notifications attach the UPI
/// QR inline so mail clients render it next to the payment instructions.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let credentials =
            Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        let from = config.from_address.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }

    /// "New order" notification to the shop owner.
    pub async fn send_admin_order_email(
        &self,
        to: &str,
        snapshot: &OrderSnapshot,
        upi: &UpiConfig,
    ) -> Result<(), NotifyError> {
        let subject = format!(
            "New Order {} - {}",
            snapshot.reference, snapshot.customer_name
        );
        let text = format!(
            "New order received from {} ({}). Reference: {}. Total: {}",
            snapshot.customer_name,
            snapshot.customer_email,
            snapshot.reference,
            format_inr(snapshot.total),
        );
        let html = admin_order_html(snapshot, upi);
        self.send_order_email(to, &subject, &text, &html, snapshot, upi)
            .await
    }

    /// Order confirmation to the customer, with the QR they pay against.
    pub async fn send_customer_order_email(
        &self,
        snapshot: &OrderSnapshot,
        upi: &UpiConfig,
    ) -> Result<(), NotifyError> {
        let subject = format!("Order Confirmation {}", snapshot.reference);
        let text = format!(
            "Thank you for your order! Reference: {}. Total: {}. \
             Please complete the payment using the attached UPI QR code.",
            snapshot.reference,
            format_inr(snapshot.total),
        );
        let html = customer_order_html(snapshot, upi);
        self.send_order_email(
            &snapshot.customer_email,
            &subject,
            &text,
            &html,
            snapshot,
            upi,
        )
        .await
    }

    async fn send_order_email(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
        snapshot: &OrderSnapshot,
        upi: &UpiConfig,
    ) -> Result<(), NotifyError> {
        let note = format!("Order {}", snapshot.reference);
        let uri = upi::payment_uri(upi, snapshot.total, &note);
        let qr = upi::qr_png(&uri)?;

        let qr_part = Attachment::new_inline(QR_CONTENT_ID.to_string())
            .body(qr, ContentType::parse("image/png")?);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(text.to_string()))
                    .multipart(
                        MultiPart::related()
                            .singlepart(SinglePart::html(html.to_string()))
                            .singlepart(qr_part),
                    ),
            )?;

        self.transport.send(message).await?;
        Ok(())
    }

    /// Password reset link for a customer account.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_link: &str,
    ) -> Result<(), NotifyError> {
        let text = format!("Reset your password by opening this link: {reset_link}");
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>Password Reset Request</h2>\
             <p>Hi {name},</p>\
             <p>You requested to reset your password. Open the link below to set a new one:</p>\
             <p><a href=\"{reset_link}\">{reset_link}</a></p>\
             <p style=\"color: #999; font-size: 14px;\">This link expires in 1 hour. \
             If you didn't request this, you can ignore this email.</p>\
             </div>"
        );
        self.send_simple(to, "Reset Your Password", &text, &html)
            .await
    }

    /// Temporary password issued after an admin credential reset.
    pub async fn send_admin_temp_password(
        &self,
        to: &str,
        name: &str,
        temp_password: &str,
        login_link: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "Your admin password has been reset. Temporary password: {temp_password}. \
             Login at: {login_link}"
        );
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>Admin Password Reset</h2>\
             <p>Hi {name},</p>\
             <p>Your admin password has been reset. Sign in with this temporary password \
             and change it immediately:</p>\
             <p><code>{temp_password}</code></p>\
             <p><a href=\"{login_link}\">Login to the admin panel</a></p>\
             </div>"
        );
        self.send_simple(to, "Admin Password Reset", &text, &html)
            .await
    }

    async fn send_simple(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn format_inr(amount: Decimal) -> String {
    format!("₹{amount:.2}")
}

fn items_table(snapshot: &OrderSnapshot) -> String {
    let rows: String = snapshot
        .lines
        .iter()
        .map(|line| {
            format!(
                "<tr>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #ddd;\">{}</td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #ddd;\">{}</td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #ddd;\">{}</td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #ddd;\">{}</td>\
                 </tr>",
                line.name,
                line.quantity,
                format_inr(line.price),
                format_inr(line.price * Decimal::from(line.quantity)),
            )
        })
        .collect();

    format!(
        "<table style=\"width: 100%; border-collapse: collapse; margin: 20px 0;\">\
         <thead><tr style=\"background-color: #e5e7eb;\">\
         <th style=\"padding: 10px; text-align: left;\">Product</th>\
         <th style=\"padding: 10px; text-align: left;\">Quantity</th>\
         <th style=\"padding: 10px; text-align: left;\">Price</th>\
         <th style=\"padding: 10px; text-align: left;\">Subtotal</th>\
         </tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn payment_block(snapshot: &OrderSnapshot, upi: &UpiConfig) -> String {
    format!(
        "<h3>UPI Payment</h3>\
         <p><strong>UPI ID:</strong> <code>{}</code><br>\
         <strong>Amount:</strong> {}</p>\
         <img src=\"cid:{QR_CONTENT_ID}\" alt=\"UPI payment QR code\" width=\"200\" height=\"200\">",
        upi.upi_id,
        format_inr(snapshot.total),
    )
}

fn admin_order_html(snapshot: &OrderSnapshot, upi: &UpiConfig) -> String {
    let phone = snapshot
        .customer_phone
        .as_deref()
        .map(|p| format!("<p><strong>Phone:</strong> {p}</p>"))
        .unwrap_or_default();
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">New Order Received</h2>\
         <div style=\"background-color: #f3f4f6; padding: 15px; border-radius: 5px;\">\
         <p><strong>Reference:</strong> {}</p>\
         <p><strong>Customer:</strong> {} ({})</p>{}\
         <p><strong>Placed:</strong> {}</p>\
         </div>\
         {}\
         <div style=\"text-align: right; font-size: 18px; font-weight: bold;\">\
         <p>Total: {}</p></div>\
         {}\
         </div>",
        snapshot.reference,
        snapshot.customer_name,
        snapshot.customer_email,
        phone,
        snapshot.created_at.format("%Y-%m-%d %H:%M UTC"),
        items_table(snapshot),
        format_inr(snapshot.total),
        payment_block(snapshot, upi),
    )
}

fn customer_order_html(snapshot: &OrderSnapshot, upi: &UpiConfig) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">Thank You for Your Order!</h2>\
         <p>Hi {},</p>\
         <p>We've received your order and we're getting it ready. Scan the QR code \
         below to complete your payment.</p>\
         <div style=\"background-color: #f3f4f6; padding: 15px; border-radius: 5px;\">\
         <p><strong>Reference:</strong> {}</p>\
         <p><strong>Placed:</strong> {}</p>\
         </div>\
         {}\
         <div style=\"text-align: right; font-size: 18px; font-weight: bold;\">\
         <p>Total: {}</p></div>\
         {}\
         </div>",
        snapshot.customer_name,
        snapshot.reference,
        snapshot.created_at.format("%Y-%m-%d %H:%M UTC"),
        items_table(snapshot),
        format_inr(snapshot.total),
        payment_block(snapshot, upi),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LineSnapshot;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn snapshot() -> OrderSnapshot {
        OrderSnapshot {
            order_id: Uuid::new_v4(),
            reference: "ORD-1a2b3c4d".to_string(),
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: Some("9999999999".to_string()),
            shipping_address: None,
            total: Decimal::from_str("250.00").unwrap(),
            status: "pending".to_string(),
            created_at: Utc::now(),
            lines: vec![
                LineSnapshot {
                    name: "Premium Headphones".to_string(),
                    quantity: 2,
                    price: Decimal::from_str("100.00").unwrap(),
                },
                LineSnapshot {
                    name: "Laptop Stand".to_string(),
                    quantity: 1,
                    price: Decimal::from_str("50.00").unwrap(),
                },
            ],
        }
    }

    #[test]
    fn admin_html_lists_every_line_and_the_total() {
        let upi = UpiConfig {
            upi_id: "shop@upi".to_string(),
            payee_name: "Store".to_string(),
        };
        let html = admin_order_html(&snapshot(), &upi);
        assert!(html.contains("Premium Headphones"));
        assert!(html.contains("Laptop Stand"));
        assert!(html.contains("₹250.00"));
        assert!(html.contains("ORD-1a2b3c4d"));
        assert!(html.contains(&format!("cid:{QR_CONTENT_ID}")));
    }

    #[test]
    fn subtotals_multiply_price_by_quantity() {
        let table = items_table(&snapshot());
        assert!(table.contains("₹200.00"), "2 × 100.00 subtotal missing");
        assert!(table.contains("₹50.00"));
    }
}
