mod common;

use rust_decimal_macros::dec;

use common::TestApp;
use herbcart_api::services::orders::OrderItemInput;

#[tokio::test]
async fn dashboard_rolls_up_revenue_categories_and_cities() {
    let app = TestApp::new().await;
    let user = app.seed_user("dash@example.com").await;
    let address = app.seed_address(user.id).await;
    let tulsi = app.seed_product("Tulsi drops", dec!(200)).await;
    let neem = app.seed_product("Neem caps", dec!(100)).await;

    // 200*2 = 400 + 8 tax, then 100*1 = 100 + 2 tax
    app.services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: tulsi.id,
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    app.services
        .orders
        .place_cod_order(
            user.id,
            address.id,
            vec![OrderItemInput {
                product_id: neem.id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let analytics = app.services.analytics.seller_analytics().await.unwrap();
    assert_eq!(analytics.total_orders, 2);
    assert_eq!(analytics.total_revenue, dec!(510));
    assert_eq!(analytics.average_order_value, dec!(255));
    assert_eq!(analytics.total_products, 2);

    assert_eq!(analytics.top_products.len(), 2);
    assert_eq!(analytics.top_products[0].name, "Tulsi drops");
    assert_eq!(analytics.top_products[0].units, 2);
    assert_eq!(analytics.top_products[0].revenue, dec!(400));

    assert_eq!(analytics.sales_by_category.len(), 1);
    assert_eq!(analytics.sales_by_category[0].category, "herbs");
    assert_eq!(analytics.sales_by_category[0].revenue, dec!(500));
    assert_eq!(analytics.sales_by_category[0].units, 3);

    assert_eq!(analytics.orders_by_city.len(), 1);
    assert_eq!(analytics.orders_by_city[0].city, "Pune");
    assert_eq!(analytics.orders_by_city[0].orders, 2);

    assert_eq!(analytics.orders_by_month.len(), 1);
    assert_eq!(analytics.recent_orders.len(), 2);
}

#[tokio::test]
async fn empty_store_reports_zeroes() {
    let app = TestApp::new().await;
    let analytics = app.services.analytics.seller_analytics().await.unwrap();
    assert_eq!(analytics.total_orders, 0);
    assert_eq!(analytics.total_revenue, dec!(0));
    assert_eq!(analytics.average_order_value, dec!(0));
    assert!(analytics.top_products.is_empty());
    assert!(analytics.sales_by_category.is_empty());
    assert!(analytics.recent_orders.is_empty());
}
