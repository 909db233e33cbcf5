//! Authentication for the admin API, the vendor portal and cron callers.
//!
//! - [`password`]: argon2id hashing of the administrator password
//! - [`session`]: HS256 JWT sessions carried as a bearer token or an HttpOnly cookie
//! - [`extractors`]: [`AdminSession`], [`VendorSession`] and [`CronAuth`], which reject
//!   unauthenticated callers with 401 before the handler runs
//!
//! Routes that take none of the extractors are public.

pub mod extractors;
pub mod password;
pub mod session;

pub use extractors::{AdminSession, CronAuth, VendorSession};
