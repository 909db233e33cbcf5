//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection` and owns the SQL for one table:
//!
//! - [`MemberRequests`]: membership applications
//! - [`AppleAccounts`], [`YoutubeAccounts`]: the account hierarchy, with cascading deletes
//! - [`Members`]: paying customers, deposit state, renewals and the monthly sweep
//! - [`Revenue`]: the append-only ledger and month-end snapshots
//! - [`Vendors`], [`Bookings`]: the movie booking side
//! - [`Reviews`]: customer reviews
//! - [`AdminCredentials`]: the administrator password hash
//!
//! Writes that touch more than one row should run on a transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! AppleAccounts::new(&mut tx).delete_cascade(id).await?;
//! tx.commit().await?;
//! ```

pub mod admin_credentials;
pub mod apple_accounts;
pub mod bookings;
pub mod member_requests;
pub mod members;
pub mod repository;
pub mod revenue;
pub mod reviews;
pub mod vendors;
pub mod youtube_accounts;

pub use admin_credentials::AdminCredentials;
pub use apple_accounts::AppleAccounts;
pub use bookings::Bookings;
pub use member_requests::MemberRequests;
pub use members::Members;
pub use repository::Repository;
pub use revenue::Revenue;
pub use reviews::Reviews;
pub use vendors::Vendors;
pub use youtube_accounts::YoutubeAccounts;
