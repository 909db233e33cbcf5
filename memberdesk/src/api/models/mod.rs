//! Request and response bodies for the HTTP API.
//!
//! DB rows are converted with `From` impls so that handlers never serialize repository types
//! directly.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cron;
pub mod members;
pub mod pagination;
pub mod requests;
pub mod reviews;
pub mod vendors;

use serde::{Deserialize, Deserializer};

/// Deserialize a string with surrounding whitespace removed
pub(crate) fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Deserialize an optional string, treating a blank value as absent
pub(crate) fn trimmed_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}
