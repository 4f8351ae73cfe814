use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{UserError, UserResult};
use crate::models::{Technology, User, UserInput};

/// The first rule a [`UserInput`] breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, code: &'static str, message: String) -> Self {
        Self {
            field,
            code,
            message,
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, "required", format!(".{} must not be empty", field))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

impl UserInput {
    /// Checks the rules in order and reports only the first one broken.
    pub fn first_violation(&self) -> Option<Violation> {
        if is_blank(&self.name) {
            return Some(Violation::required("name"));
        }
        if is_blank(&self.surname) {
            return Some(Violation::required("surname"));
        }
        if is_blank(&self.email) {
            return Some(Violation::required("email"));
        }
        if !self.email.as_deref().unwrap_or_default().contains('@') {
            return Some(Violation::new(
                "email",
                "email",
                ".email is not a valid email address".to_string(),
            ));
        }
        if is_blank(&self.password) {
            return Some(Violation::required("password"));
        }
        if self.birthday.is_none() {
            return Some(Violation::required("birthday"));
        }
        if is_blank(&self.address) {
            return Some(Violation::required("address"));
        }
        if is_blank(&self.technology) {
            return Some(Violation::required("technology"));
        }
        let technology = self.technology.as_deref().unwrap_or_default();
        if Technology::from_str(technology).is_err() {
            return Some(Violation::new(
                "technology",
                "technology",
                format!(".technology must be one of: {}", Technology::allowed()),
            ));
        }
        if self.deleted.is_some() {
            return Some(Violation::new(
                "deleted",
                "must_be_empty",
                ".deleted must be empty".to_string(),
            ));
        }
        None
    }
}

impl Validate for UserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let Some(violation) = self.first_violation() else {
            return Ok(());
        };

        let mut errors = ValidationErrors::new();
        errors.add(
            violation.field,
            ValidationError::new(violation.code).with_message(Cow::Owned(violation.message)),
        );
        Err(errors)
    }
}

impl TryFrom<UserInput> for User {
    type Error = UserError;

    fn try_from(input: UserInput) -> UserResult<Self> {
        input.validate()?;

        let technology = input
            .technology
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| UserError::Validation(".technology is invalid".to_string()))?;
        let birthday = input
            .birthday
            .ok_or_else(|| UserError::Validation(".birthday must not be empty".to_string()))?;

        Ok(User {
            name: input.name.unwrap_or_default(),
            surname: input.surname.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            password: input.password.unwrap_or_default(),
            birthday,
            address: input.address.unwrap_or_default(),
            phone: input.phone,
            technology,
            deleted: None,
        })
    }
}
