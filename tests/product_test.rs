mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::TestApp;
use herbcart_api::errors::ServiceError;
use herbcart_api::services::products::NewProduct;

#[tokio::test]
async fn list_returns_products_in_insertion_order() {
    let app = TestApp::new().await;
    app.seed_product("Tulsi drops", dec!(200)).await;
    app.seed_product("Neem caps", dec!(100)).await;
    app.seed_product("Brahmi oil", dec!(150)).await;

    let products = app.services.products.list().await.unwrap();
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Tulsi drops", "Neem caps", "Brahmi oil"]);
}

#[tokio::test]
async fn stock_toggle_is_reflected_in_listing() {
    let app = TestApp::new().await;
    let product = app.seed_product("Tulsi drops", dec!(200)).await;
    assert!(product.in_stock);

    app.services
        .products
        .set_stock(product.id, false)
        .await
        .unwrap();

    let products = app.services.products.list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert!(!products[0].in_stock);
}

#[tokio::test]
async fn offer_price_above_list_price_is_rejected() {
    let app = TestApp::new().await;
    let result = app
        .services
        .products
        .create(NewProduct {
            name: "Overpriced".to_string(),
            category: "herbs".to_string(),
            price: dec!(100),
            offer_price: dec!(150),
            image: vec![],
            description: vec![],
            in_stock: true,
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let app = TestApp::new().await;
    let result = app.services.products.get(Uuid::new_v4()).await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}
