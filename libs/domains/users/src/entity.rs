use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::error::UserError;
use crate::models::{Technology, User};

/// Sea-ORM Entity for the users table.
///
/// `id` is internal; users are addressed by email.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub birthday: DateTimeUtc,
    pub address: String,
    pub phone: Option<String>,
    pub technology: String,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = UserError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let technology = Technology::from_str(&model.technology).map_err(|_| {
            UserError::Internal(format!(
                "stored user {} has unknown technology '{}'",
                model.id, model.technology
            ))
        })?;

        Ok(User {
            name: model.name,
            surname: model.surname,
            email: model.email,
            password: model.password,
            birthday: model.birthday,
            address: model.address,
            phone: model.phone,
            technology,
            deleted: model.deleted,
        })
    }
}

/// Insert form of a user: a fresh active row.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(user.name),
            surname: Set(user.surname),
            email: Set(user.email),
            password: Set(user.password),
            birthday: Set(user.birthday),
            address: Set(user.address),
            phone: Set(user.phone),
            technology: Set(user.technology.to_string()),
            deleted: Set(None),
        }
    }
}

/// Update form of a user: only the mutable columns are set.
pub fn mutable_columns(user: User) -> ActiveModel {
    ActiveModel {
        name: Set(user.name),
        surname: Set(user.surname),
        password: Set(user.password),
        birthday: Set(user.birthday),
        address: Set(user.address),
        phone: Set(user.phone),
        technology: Set(user.technology.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn model(technology: &str) -> Model {
        Model {
            id: 7,
            name: "Robert'); DROP TABLE Users;--".to_string(),
            surname: "Tables".to_string(),
            email: "bobby.tables@xkcd.com".to_string(),
            password: "TODO: harder".to_string(),
            birthday: Utc.with_ymd_and_hms(2007, 10, 7, 0, 0, 0).unwrap(),
            address: "Wherever".to_string(),
            phone: None,
            technology: technology.to_string(),
            deleted: None,
        }
    }

    #[test]
    fn test_model_to_user() {
        let user = User::try_from(model("js")).unwrap();
        assert_eq!(user.technology, Technology::Js);
        assert_eq!(user.name, "Robert'); DROP TABLE Users;--");
        assert!(user.is_active());
    }

    #[test]
    fn test_unknown_stored_technology_is_internal() {
        let err = User::try_from(model("cobol")).unwrap_err();
        assert!(matches!(err, UserError::Internal(ref m) if m.contains("cobol")));
    }

    #[test]
    fn test_mutable_columns_leave_identity_unset() {
        let user = User::try_from(model("go")).unwrap();
        let active = mutable_columns(user);
        assert!(active.email.is_not_set());
        assert!(active.deleted.is_not_set());
        assert!(active.id.is_not_set());
        assert_eq!(active.technology, Set("go".to_string()));
    }
}
