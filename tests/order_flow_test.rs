mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TestApp;
use herbcart_api::entities::order::{OrderStatus, PaymentMethod};
use herbcart_api::entities::{Order, OrderItem};
use herbcart_api::errors::ServiceError;
use herbcart_api::services::orders::{OrderItemInput, VerifyPaymentInput, MAX_ITEM_QUANTITY};

// Signature for secret "test_key_secret" over
// "order_MkWvd1al3yXcQa|pay_MkWw9qFqkZz1Ab".
const KNOWN_ORDER_ID: &str = "order_MkWvd1al3yXcQa";
const KNOWN_PAYMENT_ID: &str = "pay_MkWw9qFqkZz1Ab";
const KNOWN_SIGNATURE: &str = "ee34930f103e232f00aa907cc16a742080b106bebd6559fe57e5d6fbfc616caa";

#[tokio::test]
async fn cod_order_snapshots_items_and_computes_amount() {
    let app = TestApp::new().await;
    let user = app.seed_user("cod@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let order = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    // 200 * 2 = 400 subtotal, plus floor(2%) = 8 tax
    assert_eq!(order.amount, dec!(408));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Cod);
    assert!(!order.is_paid);
    assert!(order.payment_transaction_id.is_none());

    let items = OrderItem::find().all(app.db.as_ref()).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].order_id, order.id);
    assert_eq!(items[0].name, "Tulsi drops");
    assert_eq!(items[0].offer_price, dec!(200));
    assert_eq!(items[0].line_total, dec!(400));
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("empty@example.com").await;
    let address = app.seed_address(user.id).await;

    let result = app
        .services
        .orders
        .place_cod_order(user.id, address.id, vec![])
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_product_leaves_no_rows_behind() {
    let app = TestApp::new().await;
    let user = app.seed_user("ghost@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Ashwagandha", dec!(150)).await;

    let result = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![
                OrderItemInput {
                    product_id: product.id,
                    quantity: 1,
                },
                OrderItemInput {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                },
            ],
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    assert_eq!(Order::find().count(app.db.as_ref()).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(app.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn oversized_quantity_is_rejected_not_truncated() {
    let app = TestApp::new().await;
    let user = app.seed_user("huge@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    // A quantity past the bound would wrap in the i32 snapshot column
    // while still pricing from the full i64.
    let result = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: (1i64 << 32) + 2,
            }],
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
    assert_eq!(Order::find().count(app.db.as_ref()).await.unwrap(), 0);

    // The largest allowed quantity still snapshots consistently.
    let order = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: MAX_ITEM_QUANTITY,
            }],
        )
        .await
        .unwrap();
    let items = OrderItem::find().all(app.db.as_ref()).await.unwrap();
    assert_eq!(items[0].quantity as i64, MAX_ITEM_QUANTITY);
    assert_eq!(items[0].line_total, dec!(200) * rust_decimal::Decimal::from(MAX_ITEM_QUANTITY));
    assert!(order.amount >= items[0].line_total);
}

#[tokio::test]
async fn someone_elses_address_is_rejected() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner@example.com").await;
    let address = app.seed_address(owner.id).await;
    let intruder = app.seed_user("intruder@example.com").await;
    let product = app.seed_product("Brahmi", dec!(100)).await;

    let result = app
        .services
        .orders
        .place_cod_order(
            intruder.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn tampered_signature_writes_nothing() {
    let app = TestApp::with_razorpay("http://127.0.0.1:1").await;
    let user = app.seed_user("tamper@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Neem caps", dec!(120)).await;

    let result = app
        .services
        .orders
        .verify_and_confirm(
            user.id,
            VerifyPaymentInput {
                razorpay_order_id: KNOWN_ORDER_ID.to_string(),
                razorpay_payment_id: KNOWN_PAYMENT_ID.to_string(),
                razorpay_signature: "00".repeat(32),
                address_id: address.id,
                items: vec![OrderItemInput {
                    product_id: product.id,
                    quantity: 1,
                }],
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::PaymentFailed(_)));
    assert_eq!(Order::find().count(app.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn verified_settled_payment_creates_confirmed_order() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/payments/{}", KNOWN_PAYMENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": KNOWN_PAYMENT_ID,
            "status": "captured",
            "amount": 40800,
            "currency": "INR",
            "method": "upi",
        })))
        .mount(&provider)
        .await;

    let app = TestApp::with_razorpay(&provider.uri()).await;
    let user = app.seed_user("paid@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let order = app
        .services
        .orders
        .verify_and_confirm(
            user.id,
            VerifyPaymentInput {
                razorpay_order_id: KNOWN_ORDER_ID.to_string(),
                razorpay_payment_id: KNOWN_PAYMENT_ID.to_string(),
                razorpay_signature: KNOWN_SIGNATURE.to_string(),
                address_id: address.id,
                items: vec![OrderItemInput {
                    product_id: product.id,
                    quantity: 2,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(order.amount, dec!(408));
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment_method, PaymentMethod::Online);
    assert!(order.is_paid);
    assert_eq!(order.payment_transaction_id.as_deref(), Some(KNOWN_PAYMENT_ID));
    assert_eq!(order.payment_status.as_deref(), Some("captured"));
    assert!(order.paid_at.is_some());
}

#[tokio::test]
async fn unsettled_payment_is_rejected() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/payments/{}", KNOWN_PAYMENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": KNOWN_PAYMENT_ID,
            "status": "failed",
            "amount": 40800,
            "currency": "INR",
        })))
        .mount(&provider)
        .await;

    let app = TestApp::with_razorpay(&provider.uri()).await;
    let user = app.seed_user("failed@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let result = app
        .services
        .orders
        .verify_and_confirm(
            user.id,
            VerifyPaymentInput {
                razorpay_order_id: KNOWN_ORDER_ID.to_string(),
                razorpay_payment_id: KNOWN_PAYMENT_ID.to_string(),
                razorpay_signature: KNOWN_SIGNATURE.to_string(),
                address_id: address.id,
                items: vec![OrderItemInput {
                    product_id: product.id,
                    quantity: 2,
                }],
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::PaymentFailed(_)));
    assert_eq!(Order::find().count(app.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn online_checkout_without_credentials_is_unavailable() {
    let app = TestApp::new().await;
    let user = app.seed_user("nopay@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let result = app
        .services
        .orders
        .create_razorpay_intent(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn listings_show_own_orders_newest_first_with_details() {
    let app = TestApp::new().await;
    let user = app.seed_user("list@example.com").await;
    let other = app.seed_user("other@example.com").await;
    let address = app.seed_address(user.id).await;
    let other_address = app.seed_address(other.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let first = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();
    let second = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 3,
            }],
        )
        .await
        .unwrap();
    app.services
        .orders
        .place_cod_order(
            other.id,
            other_address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let mine = app.services.orders.list_user_orders(user.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    let listed: Vec<Uuid> = mine.iter().map(|v| v.order.id).collect();
    assert!(listed.contains(&first.id));
    assert!(listed.contains(&second.id));
    for view in &mine {
        assert_eq!(view.items.len(), 1);
        assert!(view.address.is_some());
    }

    let all = app.services.orders.list_all_orders().await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn terminal_statuses_are_final() {
    let app = TestApp::new().await;
    let user = app.seed_user("status@example.com").await;
    let address = app.seed_address(user.id).await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;

    let order = app
        .services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let confirmed = app
        .services
        .orders
        .update_status(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    let delivered = app
        .services
        .orders
        .update_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let reopened = app
        .services
        .orders
        .update_status(order.id, OrderStatus::Pending)
        .await;
    assert_matches!(reopened, Err(ServiceError::InvalidOperation(_)));
}
