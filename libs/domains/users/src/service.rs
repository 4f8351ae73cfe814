use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, UserInput};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List users matching raw query parameters
    pub async fn list_users(&self, query: &HashMap<String, String>) -> UserResult<Vec<User>> {
        let filter = UserFilter::from_query(query)?;
        self.repository.list(filter).await
    }

    /// Get the active user with this email
    pub async fn get_user(&self, email: &str) -> UserResult<User> {
        self.repository
            .get(email)
            .await?
            .ok_or_else(|| UserError::not_found(email, "no active user with this email"))
    }

    /// Validate and store a new user, returning its email
    pub async fn create_user(&self, input: UserInput) -> UserResult<String> {
        let user = User::try_from(input)?;
        let email = user.email.clone();
        self.repository.create(user).await?;
        Ok(email)
    }

    /// Replace the mutable fields of the active user at `email`.
    ///
    /// The payload must carry the same email: it identifies the record and
    /// cannot be changed.
    pub async fn modify_user(&self, email: &str, input: UserInput) -> UserResult<()> {
        input.validate()?;
        if input.email.as_deref() != Some(email) {
            return Err(UserError::Validation(format!(
                ".email must match the addressed user '{}'",
                email
            )));
        }

        let user = User::try_from(input)?;
        self.repository.modify(user).await
    }

    /// Soft-delete the active user at `email`
    pub async fn delete_user(&self, email: &str) -> UserResult<()> {
        self.repository.delete(email).await
    }

    /// Release the underlying storage
    pub async fn close(&self) -> UserResult<()> {
        self.repository.close().await
    }
}
