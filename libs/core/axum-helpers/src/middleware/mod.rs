//! HTTP middleware shared by the apps.

pub mod request_log;

pub use request_log::{REQUEST_ID_HEADER, request_log};
