use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{product, user};
use crate::errors::ServiceError;

/// The saved cart plus its priced total.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: HashMap<Uuid, i64>,
    pub total: Decimal,
}

/// Persists the per-user cart snapshot stored on the user row.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Replaces the saved cart wholesale. Entries with a non-positive
    /// quantity are dropped rather than stored.
    #[instrument(skip(self, items))]
    pub async fn update_cart(
        &self,
        user_id: Uuid,
        items: HashMap<Uuid, i64>,
    ) -> Result<HashMap<Uuid, i64>, ServiceError> {
        let sanitized: HashMap<Uuid, i64> =
            items.into_iter().filter(|(_, qty)| *qty > 0).collect();

        let existing = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let as_json: serde_json::Map<String, serde_json::Value> = sanitized
            .iter()
            .map(|(id, qty)| (id.to_string(), serde_json::json!(qty)))
            .collect();

        let mut active: user::ActiveModel = existing.into();
        active.cart_items = Set(serde_json::Value::Object(as_json));
        active.updated_at = Set(Utc::now());
        active.update(self.db.as_ref()).await?;

        Ok(sanitized)
    }

    /// Returns the saved cart with a total priced from the current
    /// catalog. Entries whose product no longer exists are skipped.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let existing = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let items = parse_cart(&existing.cart_items);
        if items.is_empty() {
            return Ok(CartView {
                items,
                total: Decimal::ZERO,
            });
        }

        let ids: Vec<Uuid> = items.keys().copied().collect();
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        let prices: HashMap<Uuid, Decimal> =
            products.into_iter().map(|p| (p.id, p.offer_price)).collect();

        let total = cart_total(&items, &prices);
        Ok(CartView { items, total })
    }
}

/// Reads the stored JSON cart object, ignoring malformed keys and
/// non-positive quantities left over from older writes.
pub fn parse_cart(raw: &serde_json::Value) -> HashMap<Uuid, i64> {
    let Some(map) = raw.as_object() else {
        return HashMap::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let id = Uuid::parse_str(key).ok()?;
            let qty = value.as_i64()?;
            (qty > 0).then_some((id, qty))
        })
        .collect()
}

/// Sums offer price times quantity, truncated to two decimal places.
/// Cart entries without a known price contribute nothing.
pub fn cart_total(cart: &HashMap<Uuid, i64>, prices: &HashMap<Uuid, Decimal>) -> Decimal {
    let total: Decimal = cart
        .iter()
        .filter_map(|(id, qty)| {
            let price = prices.get(id)?;
            Some(*price * Decimal::from(*qty))
        })
        .sum();
    total.trunc_with_scale(2)
}
