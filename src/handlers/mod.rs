pub mod addresses;
pub mod analytics;
pub mod carts;
pub mod common;
pub mod contacts;
pub mod orders;
pub mod products;
pub mod sellers;
pub mod users;

use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::events::EventSender;
use crate::payments::RazorpayClient;
use crate::services::{
    AddressService, AnalyticsService, CartService, ContactService, OrderService, ProductService,
    UserService,
};

/// All request-path services, built once at startup and cloned into
/// the router state.
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub carts: CartService,
    pub addresses: AddressService,
    pub users: UserService,
    pub orders: OrderService,
    pub contacts: ContactService,
    pub analytics: AnalyticsService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        auth: Arc<AuthService>,
        razorpay: Option<Arc<RazorpayClient>>,
        config: &AppConfig,
    ) -> Self {
        let tax_rate =
            Decimal::from_f64(config.tax_rate).unwrap_or_else(|| Decimal::new(2, 2));
        Self {
            products: ProductService::new(db.clone()),
            carts: CartService::new(db.clone()),
            addresses: AddressService::new(db.clone()),
            users: UserService::new(db.clone(), auth),
            orders: OrderService::new(
                db.clone(),
                event_sender,
                razorpay,
                tax_rate,
                config.currency.clone(),
            ),
            contacts: ContactService::new(db.clone()),
            analytics: AnalyticsService::new(db),
        }
    }
}
