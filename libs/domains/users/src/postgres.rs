use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserFilter},
    repository::UserRepository,
};

/// Schema for the users table.
///
/// Uniqueness of email is scoped to active rows by a partial index, so any
/// number of soft-deleted rows may share an email.
pub const SCHEMA: [&str; 2] = [
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        surname TEXT NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL,
        birthday TIMESTAMPTZ NOT NULL,
        address TEXT NOT NULL,
        phone TEXT NULL,
        technology TEXT NOT NULL,
        deleted TIMESTAMPTZ NULL
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS users_only_one_active
        ON users (email)
        WHERE deleted IS NULL"#,
];

fn internal(context: &'static str) -> impl FnOnce(DbErr) -> UserError {
    move |e| UserError::Internal(format!("{}: {}", context, e))
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    /// Wraps an existing connection without touching the schema.
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Wraps `db` after making sure the table and its indexes exist.
    pub async fn connect(db: DatabaseConnection) -> UserResult<Self> {
        let repository = Self::new(db);
        repository.ensure_schema().await?;
        Ok(repository)
    }

    pub async fn ensure_schema(&self) -> UserResult<()> {
        for statement in SCHEMA {
            self.db
                .execute_unprepared(statement)
                .await
                .map_err(internal("creating schema"))?;
        }
        tracing::info!("Users schema ready");
        Ok(())
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let mut query = entity::Entity::find();

        if let Some(technology) = filter.technology {
            query = query.filter(entity::Column::Technology.eq(technology.to_string()));
        }

        query = match filter.deleted {
            Some(true) => query.filter(entity::Column::Deleted.is_not_null()),
            Some(false) => query.filter(entity::Column::Deleted.is_null()),
            None => query,
        };

        let models = query
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(internal("listing users"))?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn get(&self, email: &str) -> UserResult<Option<User>> {
        let mut models = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .filter(entity::Column::Deleted.is_null())
            .limit(2)
            .all(&self.db)
            .await
            .map_err(internal("getting user"))?;

        match models.len() {
            0 => Ok(None),
            1 => models.pop().map(User::try_from).transpose(),
            rows => {
                tracing::error!(email = %email, rows, "Multiple active users share one email");
                Err(UserError::Internal(
                    "multiple active users share one email".to_string(),
                ))
            }
        }
    }

    async fn create(&self, user: User) -> UserResult<()> {
        let email = user.email.clone();
        let active_model: entity::ActiveModel = user.into();

        match entity::Entity::insert(active_model)
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => {
                tracing::info!(email = %email, "Created user");
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(UserError::conflict(email, e))
            }
            Err(e) => Err(internal("creating user")(e)),
        }
    }

    async fn modify(&self, user: User) -> UserResult<()> {
        let email = user.email.clone();

        let result = entity::Entity::update_many()
            .set(entity::mutable_columns(user))
            .filter(entity::Column::Email.eq(email.as_str()))
            .filter(entity::Column::Deleted.is_null())
            .exec(&self.db)
            .await
            .map_err(internal("modifying user"))?;

        if result.rows_affected == 0 {
            return Err(UserError::not_found(email, "no active row updated"));
        }

        tracing::info!(email = %email, "Modified user");
        Ok(())
    }

    async fn delete(&self, email: &str) -> UserResult<()> {
        let result = entity::Entity::update_many()
            .set(entity::ActiveModel {
                deleted: Set(Some(Utc::now())),
                ..Default::default()
            })
            .filter(entity::Column::Email.eq(email))
            .filter(entity::Column::Deleted.is_null())
            .exec(&self.db)
            .await
            .map_err(internal("deleting user"))?;

        match result.rows_affected {
            0 => Err(UserError::not_found(email, "no active row updated")),
            1 => {
                tracing::info!(email = %email, "Deleted user");
                Ok(())
            }
            rows => {
                tracing::error!(email = %email, rows, "Multiple active users deleted at once");
                Ok(())
            }
        }
    }

    async fn close(&self) -> UserResult<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(internal("closing connection pool"))
    }
}
