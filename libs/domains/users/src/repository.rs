use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Storage contract for users.
///
/// Implementations keep at most one active user per email, also under
/// concurrent calls, and hand out copies that callers may mutate freely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users matching the filter, in insertion order
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Get the active user with this email
    async fn get(&self, email: &str) -> UserResult<Option<User>>;

    /// Store a new active user; `Conflict` if the email is taken by an active user
    async fn create(&self, user: User) -> UserResult<()>;

    /// Replace the mutable fields of the active user with `user.email`
    async fn modify(&self, user: User) -> UserResult<()>;

    /// Soft-delete the active user with this email
    async fn delete(&self, email: &str) -> UserResult<()>;

    /// Release held resources. Safe to call more than once.
    async fn close(&self) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Clones share the same store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `users` as given, including soft-deleted ones.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn get(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.is_active() && u.email == email)
            .cloned())
    }

    async fn create(&self, mut user: User) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.is_active() && u.email == user.email) {
            return Err(UserError::conflict(
                user.email,
                "an active user with this email is already stored",
            ));
        }

        user.deleted = None;
        tracing::info!(email = %user.email, "Created user");
        users.push(user);
        Ok(())
    }

    async fn modify(&self, user: User) -> UserResult<()> {
        let mut users = self.users.write().await;

        let stored = users
            .iter_mut()
            .find(|u| u.is_active() && u.email == user.email)
            .ok_or_else(|| UserError::not_found(user.email.clone(), "no active user to modify"))?;

        stored.apply_update(user);
        tracing::info!(email = %stored.email, "Modified user");
        Ok(())
    }

    async fn delete(&self, email: &str) -> UserResult<()> {
        let mut users = self.users.write().await;

        let stored = users
            .iter_mut()
            .find(|u| u.is_active() && u.email == email)
            .ok_or_else(|| UserError::not_found(email, "no active user to delete"))?;

        stored.deleted = Some(Utc::now());
        tracing::info!(email = %email, "Deleted user");
        Ok(())
    }

    async fn close(&self) -> UserResult<()> {
        Ok(())
    }
}
