mod common;

use assert_matches::assert_matches;

use common::TestApp;
use herbcart_api::errors::ServiceError;
use herbcart_api::services::users::{LoginInput, RegisterInput};

#[tokio::test]
async fn register_then_login_round_trips() {
    let app = TestApp::new().await;
    let registered = app.seed_user("asha@example.com").await;

    let logged_in = app
        .services
        .users
        .login(LoginInput {
            email: "asha@example.com".to_string(),
            password: "a-strong-password".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.id, registered.id);
}

#[tokio::test]
async fn email_lookup_is_case_insensitive() {
    let app = TestApp::new().await;
    app.seed_user("asha@example.com").await;

    let logged_in = app
        .services
        .users
        .login(LoginInput {
            email: "Asha@Example.COM".to_string(),
            password: "a-strong-password".to_string(),
        })
        .await;
    assert!(logged_in.is_ok());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.seed_user("dup@example.com").await;

    let result = app
        .services
        .users
        .register(RegisterInput {
            name: "Second".to_string(),
            email: "dup@example.com".to_string(),
            password: "another-password".to_string(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.seed_user("asha@example.com").await;

    let result = app
        .services
        .users
        .login(LoginInput {
            email: "asha@example.com".to_string(),
            password: "not-the-password".to_string(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn unknown_email_gets_the_same_error_as_wrong_password() {
    let app = TestApp::new().await;
    let result = app
        .services
        .users
        .login(LoginInput {
            email: "nobody@example.com".to_string(),
            password: "whatever-password".to_string(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = TestApp::new().await;
    let result = app
        .services
        .users
        .register(RegisterInput {
            name: "Shorty".to_string(),
            email: "short@example.com".to_string(),
            password: "short".to_string(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}
