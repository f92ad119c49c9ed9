use std::time::Duration;

use reqwest::Client;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::{address, order, order_item, user};
use crate::errors::ServiceError;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const WHATSAPP_GRAPH_BASE: &str = "https://graph.facebook.com/v18.0";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub api_key: String,
    pub from: String,
    pub seller_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WhatsAppSettings {
    pub token: String,
    pub phone_number_id: String,
    pub seller_number: Option<String>,
}

/// Everything the order messages need, loaded in one pass.
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub customer_name: String,
    pub customer_email: String,
    pub address: address::Model,
}

/// Best-effort order messaging over SendGrid and the WhatsApp Cloud
/// API. Every failure is logged and swallowed; order placement never
/// depends on a message going out.
pub struct NotificationService {
    http: Client,
    email: Option<EmailSettings>,
    whatsapp: Option<WhatsAppSettings>,
}

impl NotificationService {
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("failed to build http client: {}", e)))?;

        let email = match (&config.sendgrid_api_key, &config.email_from) {
            (Some(api_key), Some(from)) => Some(EmailSettings {
                api_key: api_key.clone(),
                from: from.clone(),
                seller_to: config.seller_notification_email.clone(),
            }),
            _ => None,
        };
        let whatsapp = match (&config.whatsapp_token, &config.whatsapp_phone_number_id) {
            (Some(token), Some(phone_number_id)) => Some(WhatsAppSettings {
                token: token.clone(),
                phone_number_id: phone_number_id.clone(),
                seller_number: config.seller_whatsapp_number.clone(),
            }),
            _ => None,
        };

        if email.is_none() {
            info!("email notifications disabled (sendgrid not configured)");
        }
        if whatsapp.is_none() {
            info!("whatsapp notifications disabled (cloud api not configured)");
        }
        Ok(Self {
            http,
            email,
            whatsapp,
        })
    }

    pub fn email_configured(&self) -> bool {
        self.email.is_some()
    }

    pub fn whatsapp_configured(&self) -> bool {
        self.whatsapp.is_some()
    }

    /// Fans out the order-placed messages. Never returns an error;
    /// anything that goes wrong here is logged and dropped.
    #[instrument(skip(self, db))]
    pub async fn notify_order_placed(&self, db: &DatabaseConnection, order_id: Uuid) {
        let notification = match self.load_notification(db, order_id).await {
            Ok(Some(n)) => n,
            Ok(None) => {
                warn!(%order_id, "order vanished before notification");
                return;
            }
            Err(e) => {
                warn!(%order_id, error = %e, "failed to load order for notification");
                return;
            }
        };

        if let Some(email) = &self.email {
            let (subject, body) = render_customer_email(&notification);
            self.send_email(email, &notification.customer_email, &subject, &body)
                .await;
            if let Some(seller_to) = &email.seller_to {
                let (subject, body) = render_seller_email(&notification);
                self.send_email(email, seller_to, &subject, &body).await;
            }
        }

        if let Some(whatsapp) = &self.whatsapp {
            let customer_number = normalize_phone(&notification.address.phone);
            self.send_whatsapp(whatsapp, &customer_number, &render_customer_text(&notification))
                .await;
            if let Some(seller_number) = &whatsapp.seller_number {
                self.send_whatsapp(whatsapp, seller_number, &render_seller_text(&notification))
                    .await;
            }
        }
    }

    async fn load_notification(
        &self,
        db: &DatabaseConnection,
        order_id: Uuid,
    ) -> Result<Option<OrderNotification>, sea_orm::DbErr> {
        let Some(order) = order::Entity::find_by_id(order_id).one(db).await? else {
            return Ok(None);
        };
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;
        let Some(account) = user::Entity::find_by_id(order.user_id).one(db).await? else {
            return Ok(None);
        };
        let Some(address) = address::Entity::find_by_id(order.address_id).one(db).await? else {
            return Ok(None);
        };
        Ok(Some(OrderNotification {
            order,
            items,
            customer_name: account.name,
            customer_email: account.email,
            address,
        }))
    }

    async fn send_email(&self, settings: &EmailSettings, to: &str, subject: &str, body: &str) {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": settings.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });
        let result = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&settings.api_key)
            .json(&payload)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(to, subject, "email sent");
            }
            Ok(response) => {
                warn!(to, status = %response.status(), "email provider rejected message");
            }
            Err(e) => {
                warn!(to, error = %e, "email send failed");
            }
        }
    }

    async fn send_whatsapp(&self, settings: &WhatsAppSettings, to: &str, body: &str) {
        let url = format!(
            "{}/{}/messages",
            WHATSAPP_GRAPH_BASE, settings.phone_number_id
        );
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body },
        });
        let result = self
            .http
            .post(&url)
            .bearer_auth(&settings.token)
            .json(&payload)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(to, "whatsapp message sent");
            }
            Ok(response) => {
                warn!(to, status = %response.status(), "whatsapp api rejected message");
            }
            Err(e) => {
                warn!(to, error = %e, "whatsapp send failed");
            }
        }
    }
}

/// Strips a phone number to digits and prefixes the Indian country
/// code when the number is a bare 10-digit mobile number.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("91{}", digits)
    } else {
        digits
    }
}

fn item_lines(notification: &OrderNotification) -> String {
    notification
        .items
        .iter()
        .map(|i| format!("  - {} x{} @ {}", i.name, i.quantity, i.offer_price))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_customer_email(n: &OrderNotification) -> (String, String) {
    let subject = format!("Order confirmed: {}", n.order.id);
    let body = format!(
        "Hi {},\n\nThanks for your order! Here is what you ordered:\n{}\n\nTotal: {} ({:?})\nShipping to: {}, {}, {} {}\n\nWe will let you know when it ships.",
        n.customer_name,
        item_lines(n),
        n.order.amount,
        n.order.payment_method,
        n.address.street,
        n.address.city,
        n.address.state,
        n.address.pincode,
    );
    (subject, body)
}

pub fn render_seller_email(n: &OrderNotification) -> (String, String) {
    let subject = format!("New order received: {}", n.order.id);
    let body = format!(
        "New order from {} ({}).\n\nItems:\n{}\n\nTotal: {} ({:?})\nShip to: {} {}, {}, {}, {} {}\nPhone: {}",
        n.customer_name,
        n.customer_email,
        item_lines(n),
        n.order.amount,
        n.order.payment_method,
        n.address.firstname,
        n.address.lastname,
        n.address.street,
        n.address.city,
        n.address.state,
        n.address.pincode,
        n.address.phone,
    );
    (subject, body)
}

pub fn render_customer_text(n: &OrderNotification) -> String {
    format!(
        "Hi {}! Your order of {} item(s) totalling {} is confirmed. We'll update you when it ships.",
        n.customer_name,
        n.items.len(),
        n.order.amount,
    )
}

pub fn render_seller_text(n: &OrderNotification) -> String {
    format!(
        "New order {}: {} item(s), total {}, ship to {} ({}).",
        n.order.id,
        n.items.len(),
        n.order.amount,
        n.address.city,
        n.address.phone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::{OrderStatus, PaymentMethod};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn sample() -> OrderNotification {
        let now = Utc::now();
        OrderNotification {
            order: order::Model {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                address_id: Uuid::new_v4(),
                amount: dec!(408),
                payment_method: PaymentMethod::Cod,
                status: OrderStatus::Pending,
                is_paid: false,
                payment_transaction_id: None,
                payment_status: None,
                paid_at: None,
                created_at: now,
                updated_at: now,
            },
            items: vec![order_item::Model {
                id: Uuid::new_v4(),
                order_id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                name: "Tulsi drops".to_string(),
                offer_price: dec!(200),
                quantity: 2,
                line_total: dec!(400),
                created_at: now,
            }],
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            address: address::Model {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                firstname: "Asha".to_string(),
                lastname: "Rao".to_string(),
                email: "asha@example.com".to_string(),
                street: "12 MG Road".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
                country: "India".to_string(),
                phone: "98765 43210".to_string(),
                created_at: now,
            },
        }
    }

    #[test]
    fn normalize_phone_prefixes_bare_mobile_numbers() {
        assert_eq!(normalize_phone("98765 43210"), "919876543210");
        assert_eq!(normalize_phone("+91 98765-43210"), "919876543210");
        assert_eq!(normalize_phone("919876543210"), "919876543210");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn customer_email_mentions_items_and_total() {
        let n = sample();
        let (subject, body) = render_customer_email(&n);
        assert!(subject.contains(&n.order.id.to_string()));
        assert!(body.contains("Tulsi drops"));
        assert!(body.contains("408"));
        assert!(body.contains("Pune"));
    }

    #[test]
    fn seller_email_includes_contact_details() {
        let n = sample();
        let (_, body) = render_seller_email(&n);
        assert!(body.contains("asha@example.com"));
        assert!(body.contains("98765 43210"));
    }

    #[test]
    fn short_texts_stay_short() {
        let n = sample();
        assert!(render_customer_text(&n).len() < 200);
        assert!(render_seller_text(&n).len() < 200);
    }
}
