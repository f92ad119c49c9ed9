mod common;

use std::collections::HashMap;

use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn cart_is_replaced_wholesale_and_priced() {
    let app = TestApp::new().await;
    let user = app.seed_user("cart@example.com").await;
    let tulsi = app.seed_product("Tulsi drops", dec!(200)).await;
    let neem = app.seed_product("Neem caps", dec!(99.99)).await;

    app.services
        .carts
        .update_cart(user.id, HashMap::from([(tulsi.id, 1), (neem.id, 5)]))
        .await
        .unwrap();

    // Second write replaces the first entirely.
    app.services
        .carts
        .update_cart(user.id, HashMap::from([(neem.id, 2)]))
        .await
        .unwrap();

    let view = app.services.carts.get_cart(user.id).await.unwrap();
    assert_eq!(view.items, HashMap::from([(neem.id, 2)]));
    assert_eq!(view.total, dec!(199.98));
}

#[tokio::test]
async fn non_positive_quantities_are_dropped() {
    let app = TestApp::new().await;
    let user = app.seed_user("zero@example.com").await;
    let tulsi = app.seed_product("Tulsi drops", dec!(200)).await;
    let neem = app.seed_product("Neem caps", dec!(100)).await;

    let saved = app
        .services
        .carts
        .update_cart(
            user.id,
            HashMap::from([(tulsi.id, 2), (neem.id, 0), (Uuid::new_v4(), -3)]),
        )
        .await
        .unwrap();
    assert_eq!(saved, HashMap::from([(tulsi.id, 2)]));
}

#[tokio::test]
async fn stale_entries_do_not_break_pricing() {
    let app = TestApp::new().await;
    let user = app.seed_user("stale@example.com").await;
    let tulsi = app.seed_product("Tulsi drops", dec!(200)).await;

    // A product id that never existed in the catalog.
    app.services
        .carts
        .update_cart(user.id, HashMap::from([(tulsi.id, 1), (Uuid::new_v4(), 4)]))
        .await
        .unwrap();

    let view = app.services.carts.get_cart(user.id).await.unwrap();
    assert_eq!(view.total, dec!(200));
}

#[rstest]
#[case(1, dec!(200))]
#[case(3, dec!(600))]
#[case(10, dec!(2000))]
#[tokio::test]
async fn total_scales_with_quantity(#[case] qty: i64, #[case] expected: Decimal) {
    let app = TestApp::new().await;
    let user = app.seed_user("scale@example.com").await;
    let tulsi = app.seed_product("Tulsi drops", dec!(200)).await;

    app.services
        .carts
        .update_cart(user.id, HashMap::from([(tulsi.id, qty)]))
        .await
        .unwrap();
    let view = app.services.carts.get_cart(user.id).await.unwrap();
    assert_eq!(view.total, expected);
}

#[tokio::test]
async fn empty_cart_totals_zero() {
    let app = TestApp::new().await;
    let user = app.seed_user("emptycart@example.com").await;
    let view = app.services.carts.get_cart(user.id).await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(view.total, dec!(0));
}
