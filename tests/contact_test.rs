mod common;

use assert_matches::assert_matches;

use common::TestApp;
use herbcart_api::entities::contact::ContactStatus;
use herbcart_api::errors::ServiceError;
use herbcart_api::services::contacts::NewContact;

fn message(email: &str, subject: &str) -> NewContact {
    NewContact {
        name: "Asha".to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: "Is the tulsi in stock?".to_string(),
    }
}

#[tokio::test]
async fn submitted_messages_appear_newest_first() {
    let app = TestApp::new().await;
    app.services
        .contacts
        .submit(message("a@example.com", "First"))
        .await
        .unwrap();
    app.services
        .contacts
        .submit(message("b@example.com", "Second"))
        .await
        .unwrap();

    let listed = app.services.contacts.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|m| m.status == ContactStatus::New));
    let subjects: Vec<&str> = listed.iter().map(|m| m.subject.as_str()).collect();
    assert!(subjects.contains(&"First"));
    assert!(subjects.contains(&"Second"));
}

#[tokio::test]
async fn bad_email_is_rejected() {
    let app = TestApp::new().await;
    let result = app
        .services
        .contacts
        .submit(message("not-an-email", "Hello"))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn status_moves_through_the_inbox() {
    let app = TestApp::new().await;
    let saved = app
        .services
        .contacts
        .submit(message("a@example.com", "Question"))
        .await
        .unwrap();

    let updated = app
        .services
        .contacts
        .update_status(saved.id, ContactStatus::Read)
        .await
        .unwrap();
    assert_eq!(updated.status, ContactStatus::Read);

    let replied = app
        .services
        .contacts
        .update_status(saved.id, ContactStatus::Replied)
        .await
        .unwrap();
    assert_eq!(replied.status, ContactStatus::Replied);
}
