//! Database record structures matching table schemas.
//!
//! Each module holds the `*CreateDBRequest` / `*UpdateDBRequest` inputs and the `*DBResponse`
//! rows for one table. Status columns are TEXT with CHECK constraints and map to the enums
//! defined alongside their table.

pub mod apple_accounts;
pub mod bookings;
pub mod member_requests;
pub mod members;
pub mod revenue;
pub mod reviews;
pub mod vendors;
pub mod youtube_accounts;
