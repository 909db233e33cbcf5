//! HTTP request handlers for all API endpoints.
//!
//! Handlers are grouped by resource and mounted under `/api` by [`crate::build_router`]:
//!
//! - [`auth`]: administrator login and logout
//! - [`requests`]: membership applications and their registration as members
//! - [`apple_accounts`], [`youtube_accounts`]: the shared account hierarchy
//! - [`members`]: members, deposit status, and the public expiry/renewal lookups
//! - [`renewals`]: renewal requests and their approval
//! - [`admin`]: dashboard statistics and the manual renewal sweep
//! - [`vendors`]: vendor management and vendor login
//! - [`bookings`]: movie-ticket booking intake and administration
//! - [`vendor_portal`]: the booking list, claims and statistics a vendor sees
//! - [`reviews`]: customer reviews
//! - [`cron`]: maintenance endpoints for the external scheduler
//!
//! # Authentication
//!
//! Access is declared by the extractors a handler takes: [`crate::auth::AdminSession`],
//! [`crate::auth::VendorSession`] or [`crate::auth::CronAuth`]. Handlers without one are public.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Result`], whose error converts into a status code and a
//! `{ "error": "..." }` body.

pub mod admin;
pub mod apple_accounts;
pub mod auth;
pub mod bookings;
pub mod cron;
pub mod members;
pub mod renewals;
pub mod requests;
pub mod reviews;
pub mod vendor_portal;
pub mod vendors;
pub mod youtube_accounts;
