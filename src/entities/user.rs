use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

/// A storefront account. The saved cart lives on the user row as a
/// JSON object of product id to quantity and is replaced wholesale on
/// every cart update.
///
/// `Model` deliberately does not derive `Serialize`; `password_hash`
/// must never reach a response body.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    #[sea_orm(column_type = "Json")]
    pub cart_items: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
