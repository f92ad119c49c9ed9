pub mod addresses;
pub mod analytics;
pub mod carts;
pub mod contacts;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

pub use addresses::AddressService;
pub use analytics::AnalyticsService;
pub use carts::CartService;
pub use contacts::ContactService;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;
