use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, instrument};

use crate::config::AppConfig;
use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
}

impl RazorpayConfig {
    /// Returns `None` unless both API credentials are configured, in
    /// which case online payments stay disabled.
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        match (&config.razorpay_key_id, &config.razorpay_key_secret) {
            (Some(key_id), Some(key_secret)) => Some(Self {
                key_id: key_id.clone(),
                key_secret: key_secret.clone(),
                api_base: config.razorpay_api_base.clone(),
            }),
            _ => None,
        }
    }
}

/// An order created on the payment provider, identified by the id the
/// browser checkout widget needs.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// A payment as reported by the provider after the shopper completes
/// checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub method: Option<String>,
}

impl RazorpayPayment {
    /// Captured means money moved; authorized means it is held and
    /// capture is pending. Both count as settled for order confirmation.
    pub fn is_settled(&self) -> bool {
        self.status == "captured" || self.status == "authorized"
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

/// Thin client over the Razorpay Orders and Payments REST APIs.
#[derive(Clone)]
pub struct RazorpayClient {
    http: Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("failed to build http client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Creates a provider-side order for `amount_paise` in the smallest
    /// currency unit, with automatic capture on payment.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder, ServiceError> {
        let url = format!("{}/v1/orders", self.config.api_base);
        let body = CreateOrderBody {
            amount: amount_paise,
            currency,
            receipt,
            payment_capture: 1,
        };
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "razorpay order creation request failed");
                ServiceError::ExternalServiceError("Payment provider is unreachable".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, "razorpay rejected order creation");
            return Err(ServiceError::ExternalServiceError(
                "Payment provider rejected the order".to_string(),
            ));
        }

        response.json::<RazorpayOrder>().await.map_err(|e| {
            error!(error = %e, "razorpay order response was malformed");
            ServiceError::ExternalServiceError("Payment provider returned bad data".to_string())
        })
    }

    /// Fetches the settled state of a payment directly from the
    /// provider. Client-supplied payment status is never trusted.
    #[instrument(skip(self))]
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, ServiceError> {
        let url = format!("{}/v1/payments/{}", self.config.api_base, payment_id);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "razorpay payment fetch failed");
                ServiceError::ExternalServiceError("Payment provider is unreachable".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, payment_id, "razorpay payment lookup failed");
            return Err(ServiceError::PaymentFailed(
                "Payment could not be verified".to_string(),
            ));
        }

        response.json::<RazorpayPayment>().await.map_err(|e| {
            error!(error = %e, "razorpay payment response was malformed");
            ServiceError::ExternalServiceError("Payment provider returned bad data".to_string())
        })
    }

    pub fn verify_signature(&self, order_id: &str, payment_id: &str, supplied: &str) -> bool {
        signature_matches(&self.config.key_secret, order_id, payment_id, supplied)
    }
}

/// Checks a checkout callback signature: HMAC-SHA256 over
/// `"{order_id}|{payment_id}"` keyed with the API secret, hex encoded.
/// Comparison happens in constant time via the MAC verifier.
pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, supplied: &str) -> bool {
    let Ok(supplied_bytes) = hex::decode(supplied) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_signature_matches() {
        // hmac-sha256("test_key_secret", "order_MkWvd1al3yXcQa|pay_MkWw9qFqkZz1Ab")
        assert!(signature_matches(
            "test_key_secret",
            "order_MkWvd1al3yXcQa",
            "pay_MkWw9qFqkZz1Ab",
            "ee34930f103e232f00aa907cc16a742080b106bebd6559fe57e5d6fbfc616caa",
        ));
    }

    #[test]
    fn short_ids_also_verify() {
        assert!(signature_matches(
            "secret",
            "order_abc",
            "pay_xyz",
            "6c4490ce5c4839b0437f2b5dccb1fc7301518f94c6d1165b96d0903bfd33b2ae",
        ));
    }

    #[test]
    fn perturbed_signature_is_rejected() {
        assert!(!signature_matches(
            "test_key_secret",
            "order_MkWvd1al3yXcQa",
            "pay_MkWw9qFqkZz1Ab",
            "ee34930f103e232f00aa907cc16a742080b106bebd6559fe57e5d6fbfc616cab",
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        assert!(!signature_matches(
            "another_secret",
            "order_MkWvd1al3yXcQa",
            "pay_MkWw9qFqkZz1Ab",
            "ee34930f103e232f00aa907cc16a742080b106bebd6559fe57e5d6fbfc616caa",
        ));
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(!signature_matches("secret", "order_abc", "pay_xyz", "not-hex!"));
    }

    #[test]
    fn settled_states() {
        let mut payment = RazorpayPayment {
            id: "pay_1".into(),
            status: "captured".into(),
            amount: 1000,
            currency: "INR".into(),
            method: None,
        };
        assert!(payment.is_settled());
        payment.status = "authorized".into();
        assert!(payment.is_settled());
        payment.status = "failed".into();
        assert!(!payment.is_settled());
        payment.status = "created".into();
        assert!(!payment.is_settled());
    }
}
