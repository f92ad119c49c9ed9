use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::{
    address, order,
    order::{OrderStatus, PaymentMethod},
    order_item, product,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::payments::RazorpayClient;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Upper bound on a single line's quantity. The snapshot column is
/// i32, so anything priced must also fit the stored row.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Everything the browser checkout widget needs to collect an online
/// payment. No order row exists yet at this point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayIntent {
    pub order_id: String,
    pub amount: Decimal,
    pub amount_paise: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentInput {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "addressId")]
    pub address_id: Uuid,
    pub items: Vec<OrderItemInput>,
}

/// An order joined with its line items and shipping address, shaped
/// for listing responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub address: Option<address::Model>,
}

#[derive(Debug, Clone)]
struct PricedItem {
    product_id: Uuid,
    name: String,
    offer_price: Decimal,
    quantity: i64,
    line_total: Decimal,
}

/// Converts a whole-currency amount to the provider's smallest unit.
/// Returns `None` if the amount does not fit an i64 paise count.
pub fn to_paise(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).trunc().to_i64()
}

/// Order placement, payment confirmation, and order listings. Amounts
/// are always recomputed from the catalog; client-supplied prices are
/// never trusted.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    razorpay: Option<Arc<RazorpayClient>>,
    tax_rate: Decimal,
    currency: String,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        razorpay: Option<Arc<RazorpayClient>>,
        tax_rate: Decimal,
        currency: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            razorpay,
            tax_rate,
            currency,
        }
    }

    /// Tax is floored to a whole currency unit, so the order total is
    /// `subtotal + floor(subtotal * rate)`.
    fn compute_amount(&self, subtotal: Decimal) -> Decimal {
        subtotal + (subtotal * self.tax_rate).floor()
    }

    async fn price_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        items: &[OrderItemInput],
    ) -> Result<Vec<PricedItem>, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(ServiceError::ValidationError(
                    "Item quantities must be positive".to_string(),
                ));
            }
            if item.quantity > MAX_ITEM_QUANTITY {
                return Err(ServiceError::ValidationError(format!(
                    "Item quantities cannot exceed {}",
                    MAX_ITEM_QUANTITY
                )));
            }
        }

        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        items
            .iter()
            .map(|item| {
                let product = products.get(&item.product_id).ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "Product {} does not exist",
                        item.product_id
                    ))
                })?;
                let quantity = Decimal::from(item.quantity);
                Ok(PricedItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    offer_price: product.offer_price,
                    quantity: item.quantity,
                    line_total: product.offer_price * quantity,
                })
            })
            .collect()
    }

    async fn assert_address_owned<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<address::Model, ServiceError> {
        address::Entity::find_by_id(address_id)
            .filter(address::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Address not found".to_string()))
    }

    async fn insert_order_with_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        address_id: Uuid,
        amount: Decimal,
        payment_method: PaymentMethod,
        status: OrderStatus,
        payment: Option<(&str, &str)>,
        priced: Vec<PricedItem>,
    ) -> Result<order::Model, ServiceError> {
        let now = Utc::now();
        let is_paid = payment.is_some();
        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            address_id: Set(address_id),
            amount: Set(amount),
            payment_method: Set(payment_method),
            status: Set(status),
            is_paid: Set(is_paid),
            payment_transaction_id: Set(payment.map(|(id, _)| id.to_string())),
            payment_status: Set(payment.map(|(_, status)| status.to_string())),
            paid_at: Set(is_paid.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(conn).await?;

        for item in priced {
            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(saved.id),
                product_id: Set(item.product_id),
                name: Set(item.name),
                offer_price: Set(item.offer_price),
                quantity: Set(item.quantity as i32),
                line_total: Set(item.line_total),
                created_at: Set(now),
            };
            line.insert(conn).await?;
        }
        Ok(saved)
    }

    /// Places a cash-on-delivery order: pending, unpaid, line items
    /// snapshotted at today's offer prices.
    #[instrument(skip(self, items))]
    pub async fn place_cod_order(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;
        self.assert_address_owned(&txn, user_id, address_id).await?;
        let priced = self.price_items(&txn, &items).await?;
        let subtotal: Decimal = priced.iter().map(|i| i.line_total).sum();
        let amount = self.compute_amount(subtotal);
        let saved = self
            .insert_order_with_items(
                &txn,
                user_id,
                address_id,
                amount,
                PaymentMethod::Cod,
                OrderStatus::Pending,
                None,
                priced,
            )
            .await?;
        txn.commit().await?;

        info!(order_id = %saved.id, %amount, "cod order placed");
        self.event_sender.send_or_log(Event::OrderPlaced(saved.id)).await;
        Ok(saved)
    }

    /// Creates a provider-side payment order for the priced cart. The
    /// database is untouched until the payment is verified.
    #[instrument(skip(self, items))]
    pub async fn create_razorpay_intent(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<RazorpayIntent, ServiceError> {
        let client = self.razorpay.as_ref().ok_or_else(|| {
            ServiceError::InvalidOperation("Online payments are currently disabled".to_string())
        })?;

        self.assert_address_owned(self.db.as_ref(), user_id, address_id)
            .await?;
        let priced = self.price_items(self.db.as_ref(), &items).await?;
        let subtotal: Decimal = priced.iter().map(|i| i.line_total).sum();
        let amount = self.compute_amount(subtotal);
        let amount_paise = to_paise(amount).ok_or_else(|| {
            ServiceError::ValidationError("Order amount is out of range".to_string())
        })?;

        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
        let provider_order = client
            .create_order(amount_paise, &self.currency, &receipt)
            .await?;

        info!(provider_order_id = %provider_order.id, amount_paise, "payment intent created");
        Ok(RazorpayIntent {
            order_id: provider_order.id,
            amount,
            amount_paise,
            currency: self.currency.clone(),
            key_id: client.key_id().to_string(),
        })
    }

    /// Confirms an online payment. The signature must check out and the
    /// provider must report the payment settled before any order row is
    /// written; a failure at any step leaves the database unchanged.
    #[instrument(skip(self, input))]
    pub async fn verify_and_confirm(
        &self,
        user_id: Uuid,
        input: VerifyPaymentInput,
    ) -> Result<order::Model, ServiceError> {
        let client = self.razorpay.as_ref().ok_or_else(|| {
            ServiceError::InvalidOperation("Online payments are currently disabled".to_string())
        })?;

        if !client.verify_signature(
            &input.razorpay_order_id,
            &input.razorpay_payment_id,
            &input.razorpay_signature,
        ) {
            warn!(%user_id, payment_id = %input.razorpay_payment_id, "payment signature mismatch");
            return Err(ServiceError::PaymentFailed(
                "Payment signature mismatch".to_string(),
            ));
        }

        let payment = client.fetch_payment(&input.razorpay_payment_id).await?;
        if !payment.is_settled() {
            return Err(ServiceError::PaymentFailed(format!(
                "Payment is not settled (status: {})",
                payment.status
            )));
        }

        let txn = self.db.begin().await?;
        self.assert_address_owned(&txn, user_id, input.address_id)
            .await?;
        let priced = self.price_items(&txn, &input.items).await?;
        let subtotal: Decimal = priced.iter().map(|i| i.line_total).sum();
        let amount = self.compute_amount(subtotal);
        let saved = self
            .insert_order_with_items(
                &txn,
                user_id,
                input.address_id,
                amount,
                PaymentMethod::Online,
                OrderStatus::Confirmed,
                Some((&payment.id, &payment.status)),
                priced,
            )
            .await?;
        txn.commit().await?;

        info!(order_id = %saved.id, payment_id = %payment.id, "online order confirmed");
        self.event_sender.send_or_log(Event::OrderPlaced(saved.id)).await;
        Ok(saved)
    }

    /// Orders visible to customers and the dashboard: any COD or
    /// Online order, plus anything already paid.
    pub(crate) fn visibility_filter() -> Condition {
        Condition::any()
            .add(
                order::Column::PaymentMethod
                    .is_in([PaymentMethod::Cod, PaymentMethod::Online]),
            )
            .add(order::Column::IsPaid.eq(true))
    }

    #[instrument(skip(self))]
    pub async fn list_user_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, ServiceError> {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(Self::visibility_filter())
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        self.hydrate(orders).await
    }

    #[instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let orders = order::Entity::find()
            .filter(Self::visibility_filter())
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        self.hydrate(orders).await
    }

    async fn hydrate(&self, orders: Vec<order::Model>) -> Result<Vec<OrderView>, ServiceError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let address_ids: Vec<Uuid> = orders.iter().map(|o| o.address_id).collect();

        let mut items_by_order: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(self.db.as_ref())
            .await?;
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let addresses: HashMap<Uuid, address::Model> = address::Entity::find()
            .filter(address::Column::Id.is_in(address_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| OrderView {
                items: items_by_order.remove(&o.id).unwrap_or_default(),
                address: addresses.get(&o.address_id).cloned(),
                order: o,
            })
            .collect())
    }

    /// Moves an order to a new status. Delivered and cancelled orders
    /// are final.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let existing = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let old_status = existing.status.clone();
        if old_status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Order is already {:?} and cannot change status",
                old_status
            )));
        }
        if old_status == new_status {
            return Ok(existing);
        }

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(new_status.clone());
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount_for(subtotal: Decimal) -> Decimal {
        subtotal + (subtotal * dec!(0.02)).floor()
    }

    #[test]
    fn tax_is_floored_to_whole_units() {
        assert_eq!(amount_for(dec!(400)), dec!(408));
        // 2% of 99.50 is 1.99, floored to 1
        assert_eq!(amount_for(dec!(99.50)), dec!(100.50));
        // 2% of 49 is 0.98, floored to 0
        assert_eq!(amount_for(dec!(49)), dec!(49));
        assert_eq!(amount_for(dec!(0)), dec!(0));
    }

    #[test]
    fn paise_conversion_truncates() {
        assert_eq!(to_paise(dec!(408)), Some(40800));
        assert_eq!(to_paise(dec!(100.50)), Some(10050));
        assert_eq!(to_paise(dec!(0.009)), Some(0));
    }
}
