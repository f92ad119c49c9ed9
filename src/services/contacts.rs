use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::contact::{self, ContactStatus};
use crate::errors::ServiceError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// Contact form submissions and the seller-side inbox over them.
#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: NewContact) -> Result<contact::Model, ServiceError> {
        input.validate()?;
        if !EMAIL_RE.is_match(input.email.trim()) {
            return Err(ServiceError::ValidationError(
                "A valid email is required".to_string(),
            ));
        }

        let model = contact::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            subject: Set(input.subject.trim().to_string()),
            message: Set(input.message.trim().to_string()),
            status: Set(ContactStatus::New),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(self.db.as_ref()).await?;
        info!(contact_id = %saved.id, "contact message received");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<contact::Model>, ServiceError> {
        let messages = contact::Entity::find()
            .order_by_desc(contact::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(messages)
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<contact::Model, ServiceError> {
        let existing = contact::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Message not found".to_string()))?;
        let mut active: contact::ActiveModel = existing.into();
        active.status = Set(status);
        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a@b.co", true)]
    #[test_case("seller@herbcart.example.com", true)]
    #[test_case("no-at-sign", false)]
    #[test_case("two@@signs.com", false ; "double at still has no clean local part")]
    #[test_case("trailing@dot", false)]
    #[test_case("spaces in@mail.com", false)]
    fn email_shape(input: &str, ok: bool) {
        assert_eq!(EMAIL_RE.is_match(input), ok);
    }
}
