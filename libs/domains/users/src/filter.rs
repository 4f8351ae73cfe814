use std::collections::HashMap;

use crate::error::{UserError, UserResult};
use crate::models::{Technology, UserFilter};

impl UserFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// - `technology`: absent, empty or `*` matches any, otherwise one of [`Technology`]
    /// - `deleted`: `*` matches any, `yes`/`true` only deleted,
    ///   absent, empty, `no` or `false` only active
    ///
    /// `technology` is checked first; the first bad parameter is reported.
    pub fn from_query(query: &HashMap<String, String>) -> UserResult<Self> {
        let technology = match query.get("technology").map(String::as_str) {
            None | Some("") | Some("*") => None,
            Some(value) => Some(value.parse::<Technology>().map_err(|_| {
                UserError::InvalidFilter(format!(
                    "'technology' query parameter must be one of: * {}",
                    Technology::allowed()
                ))
            })?),
        };

        let deleted = match query.get("deleted").map(String::as_str) {
            Some("*") => None,
            Some("yes") | Some("true") => Some(true),
            None | Some("") | Some("no") | Some("false") => Some(false),
            Some(_) => {
                return Err(UserError::InvalidFilter(
                    "'deleted' query parameter must be one of: * yes no true false".to_string(),
                ));
            }
        };

        Ok(Self {
            technology,
            deleted,
        })
    }
}
