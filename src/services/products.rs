use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::product;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub price: Decimal,
    pub offer_price: Decimal,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

/// Catalog reads and seller-side catalog writes.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        input.validate()?;
        if input.price < Decimal::ZERO || input.offer_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Prices cannot be negative".to_string(),
            ));
        }
        if input.offer_price > input.price {
            return Err(ServiceError::ValidationError(
                "Offer price cannot exceed list price".to_string(),
            ));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            category: Set(input.category),
            price: Set(input.price),
            offer_price: Set(input.offer_price),
            image: Set(serde_json::json!(input.image)),
            description: Set(serde_json::json!(input.description)),
            in_stock: Set(input.in_stock),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(self.db.as_ref()).await?;
        info!(product_id = %saved.id, name = %saved.name, "product created");
        Ok(saved)
    }

    /// Full catalog in insertion order, out-of-stock rows included so
    /// the storefront can grey them out.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: Uuid, in_stock: bool) -> Result<product::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: product::ActiveModel = existing.into();
        active.in_stock = Set(in_stock);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;
        info!(product_id = %updated.id, in_stock, "product stock flag updated");
        Ok(updated)
    }
}
