use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{address, order, order_item, product};
use crate::errors::ServiceError;
use crate::services::orders::OrderService;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub revenue: Decimal,
    pub units: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub month: String,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityOrders {
    pub city: String,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub units: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: Uuid,
    pub amount: Decimal,
    pub status: order::OrderStatus,
    pub payment_method: order::PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// The seller dashboard rollup, computed over all visible orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAnalytics {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub total_products: u64,
    pub top_products: Vec<TopProduct>,
    pub sales_by_category: Vec<CategorySales>,
    pub orders_by_month: Vec<MonthlySales>,
    pub orders_by_city: Vec<CityOrders>,
    pub recent_orders: Vec<RecentOrder>,
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Dashboard aggregation. Rollups are computed in process over the
/// order ledger, which keeps the queries portable across backends.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn seller_analytics(&self) -> Result<SellerAnalytics, ServiceError> {
        let orders = order::Entity::find()
            .filter(OrderService::visibility_filter())
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        let total_products = product::Entity::find().count(self.db.as_ref()).await?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = if order_ids.is_empty() {
            Vec::new()
        } else {
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .all(self.db.as_ref())
                .await?
        };

        let total_orders = orders.len() as u64;
        let total_revenue: Decimal = orders.iter().map(|o| o.amount).sum();
        let average_order_value = if total_orders == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(total_orders)).round_dp(2)
        };

        let top_products = top_products(&items);
        let sales_by_category = self.sales_by_category(&items).await?;
        let orders_by_month = orders_by_month(&orders);
        let orders_by_city = self.orders_by_city(&orders).await?;
        let recent_orders = orders
            .iter()
            .take(5)
            .map(|o| RecentOrder {
                id: o.id,
                amount: o.amount,
                status: o.status.clone(),
                payment_method: o.payment_method.clone(),
                created_at: o.created_at,
            })
            .collect();

        Ok(SellerAnalytics {
            total_orders,
            total_revenue,
            average_order_value,
            total_products,
            top_products,
            sales_by_category,
            orders_by_month,
            orders_by_city,
            recent_orders,
        })
    }

    async fn sales_by_category(
        &self,
        items: &[order_item::Model],
    ) -> Result<Vec<CategorySales>, ServiceError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let categories: HashMap<Uuid, String> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|p| (p.id, p.category))
            .collect();

        let mut rollup: HashMap<String, (Decimal, i64)> = HashMap::new();
        for item in items {
            let category = categories
                .get(&item.product_id)
                .cloned()
                .unwrap_or_else(|| "uncategorized".to_string());
            let entry = rollup.entry(category).or_insert((Decimal::ZERO, 0));
            entry.0 += item.line_total;
            entry.1 += item.quantity as i64;
        }

        let mut result: Vec<CategorySales> = rollup
            .into_iter()
            .map(|(category, (revenue, units))| CategorySales {
                category,
                revenue,
                units,
            })
            .collect();
        result.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        Ok(result)
    }

    async fn orders_by_city(&self, orders: &[order::Model]) -> Result<Vec<CityOrders>, ServiceError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let address_ids: Vec<Uuid> = orders.iter().map(|o| o.address_id).collect();
        let cities: HashMap<Uuid, String> = address::Entity::find()
            .filter(address::Column::Id.is_in(address_ids))
            .select_only()
            .columns([address::Column::Id, address::Column::City])
            .into_tuple::<(Uuid, String)>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .collect();

        let mut rollup: HashMap<String, u64> = HashMap::new();
        for o in orders {
            let city = cities
                .get(&o.address_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            *rollup.entry(city).or_insert(0) += 1;
        }

        let mut result: Vec<CityOrders> = rollup
            .into_iter()
            .map(|(city, count)| CityOrders { city, orders: count })
            .collect();
        result.sort_by(|a, b| b.orders.cmp(&a.orders).then(a.city.cmp(&b.city)));
        Ok(result)
    }
}

/// The five best sellers by units, from the snapshotted line items.
/// The snapshot name is used, so renamed or deleted products keep the
/// name they sold under.
fn top_products(items: &[order_item::Model]) -> Vec<TopProduct> {
    let mut rollup: HashMap<Uuid, (String, i64, Decimal)> = HashMap::new();
    for item in items {
        let entry = rollup
            .entry(item.product_id)
            .or_insert_with(|| (item.name.clone(), 0, Decimal::ZERO));
        entry.1 += item.quantity as i64;
        entry.2 += item.line_total;
    }

    let mut result: Vec<TopProduct> = rollup
        .into_iter()
        .map(|(product_id, (name, units, revenue))| TopProduct {
            product_id,
            name,
            units,
            revenue,
        })
        .collect();
    result.sort_by(|a, b| b.units.cmp(&a.units).then(b.revenue.cmp(&a.revenue)));
    result.truncate(5);
    result
}

fn orders_by_month(orders: &[order::Model]) -> Vec<MonthlySales> {
    let mut rollup: HashMap<(i32, u32), (u64, Decimal)> = HashMap::new();
    for o in orders {
        let key = (o.created_at.year(), o.created_at.month());
        let entry = rollup.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += o.amount;
    }

    let mut keyed: Vec<((i32, u32), (u64, Decimal))> = rollup.into_iter().collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed
        .into_iter()
        .map(|((year, month), (count, revenue))| MonthlySales {
            month: format!("{} {}", MONTH_NAMES[(month - 1) as usize], year),
            orders: count,
            revenue,
        })
        .collect()
}
