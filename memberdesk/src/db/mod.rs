//! Database layer for data persistence and access.
//!
//! ```text
//! API handlers -> db::handlers (repositories) -> db::models (rows) -> PostgreSQL
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` and bound parameters. Migrations live in
//! `migrations/` and are applied by [`crate::migrator`] at startup.

pub mod errors;
pub mod handlers;
pub mod models;
