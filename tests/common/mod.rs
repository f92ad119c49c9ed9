#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

use herbcart_api::auth::AuthService;
use herbcart_api::config::AppConfig;
use herbcart_api::entities::{address, product, user};
use herbcart_api::events::{Event, EventSender};
use herbcart_api::handlers::AppServices;
use herbcart_api::migrator::Migrator;
use herbcart_api::payments::{RazorpayClient, RazorpayConfig};
use herbcart_api::services::addresses::NewAddress;
use herbcart_api::services::products::NewProduct;
use herbcart_api::services::users::RegisterInput;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_RAZORPAY_SECRET: &str = "test_key_secret";

/// Everything a test needs: services wired to an in-memory database,
/// with the event receiver held open so sends never fail.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
    _event_rx: mpsc::Receiver<Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Wires the order service to a Razorpay client pointed at
    /// `api_base`, normally a wiremock server.
    pub async fn with_razorpay(api_base: &str) -> Self {
        let client = RazorpayClient::new(RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: TEST_RAZORPAY_SECRET.to_string(),
            api_base: api_base.to_string(),
        })
        .unwrap();
        Self::build(Some(Arc::new(client))).await
    }

    async fn build(razorpay: Option<Arc<RazorpayClient>>) -> Self {
        let db = Arc::new(
            Database::connect("sqlite::memory:")
                .await
                .expect("in-memory sqlite"),
        );
        Migrator::up(db.as_ref(), None).await.expect("migrations");

        let config = AppConfig::new("sqlite::memory:", TEST_JWT_SECRET);
        let auth = Arc::new(AuthService::new(TEST_JWT_SECRET, 3600, false));
        let (tx, rx) = mpsc::channel(64);
        let services = AppServices::new(
            db.clone(),
            EventSender::new(tx),
            auth.clone(),
            razorpay,
            &config,
        );

        Self {
            db,
            services,
            auth,
            _event_rx: rx,
        }
    }

    pub async fn seed_product(&self, name: &str, offer_price: Decimal) -> product::Model {
        self.services
            .products
            .create(NewProduct {
                name: name.to_string(),
                category: "herbs".to_string(),
                price: offer_price + Decimal::from(50),
                offer_price,
                image: vec!["https://img.example.com/1.jpg".to_string()],
                description: vec!["A fine herbal product".to_string()],
                in_stock: true,
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_user(&self, email: &str) -> user::Model {
        self.services
            .users
            .register(RegisterInput {
                name: "Test Shopper".to_string(),
                email: email.to_string(),
                password: "a-strong-password".to_string(),
            })
            .await
            .expect("seed user")
    }

    pub async fn seed_address(&self, user_id: Uuid) -> address::Model {
        self.services
            .addresses
            .add(
                user_id,
                NewAddress {
                    firstname: "Asha".to_string(),
                    lastname: "Rao".to_string(),
                    email: "asha@example.com".to_string(),
                    street: "12 MG Road".to_string(),
                    city: "Pune".to_string(),
                    state: "MH".to_string(),
                    pincode: "411001".to_string(),
                    country: "India".to_string(),
                    phone: "9876543210".to_string(),
                },
            )
            .await
            .expect("seed address")
    }
}
