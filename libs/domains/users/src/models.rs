use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Technology a user works with. The set is closed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Technology {
    Go,
    Java,
    Js,
    Php,
}

impl Technology {
    /// Allowed wire values, space separated, e.g. `go java js php`.
    pub fn allowed() -> String {
        Technology::iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// User record as submitted by clients on create and modify.
///
/// Every field is optional so that a missing field can be told apart from an
/// empty one; validation decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserInput {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// One of `go`, `java`, `js`, `php`
    #[schema(example = "go")]
    pub technology: Option<String>,
    /// Must be absent; only deletion sets it
    pub deleted: Option<DateTime<Utc>>,
}

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub name: String,
    pub surname: String,
    /// Business key; unique among active users
    pub email: String,
    pub password: String,
    pub birthday: DateTime<Utc>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub technology: Technology,
    /// Soft-delete timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.deleted.is_none()
    }

    /// Copies every mutable field from `other`, leaving email and deleted as is.
    pub fn apply_update(&mut self, other: User) {
        self.name = other.name;
        self.surname = other.surname;
        self.password = other.password;
        self.birthday = other.birthday;
        self.address = other.address;
        self.phone = other.phone;
        self.technology = other.technology;
    }
}

/// Query criteria for listing users.
///
/// `None` matches any value. `deleted: Some(false)` selects active users only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFilter {
    pub technology: Option<Technology>,
    pub deleted: Option<bool>,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            technology: None,
            deleted: Some(false),
        }
    }
}

impl UserFilter {
    /// Filter that matches every record, active or not.
    pub fn any() -> Self {
        Self {
            technology: None,
            deleted: None,
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.technology.is_none_or(|t| t == user.technology)
            && self.deleted.is_none_or(|d| d == user.deleted.is_some())
    }
}
