//! HTTP API: route handlers and their request/response models.
//!
//! - **[`handlers`]**: Axum route handlers, one module per resource
//! - **[`models`]**: Request/response bodies and query parameters
//!
//! # API Structure
//!
//! Everything is nested under `/api`:
//!
//! - **Auth** (`/api/auth/*`): admin login and logout
//! - **Requests** (`/api/requests/*`): membership applications and registration
//! - **Accounts** (`/api/apple-accounts/*`, `/api/youtube-accounts/*`): the account hierarchy
//! - **Members** (`/api/members/*`, `/api/renewals/*`): customers, deposits and renewals
//! - **Admin** (`/api/admin/*`): dashboard figures and the monthly sweep
//! - **Bookings** (`/api/movie-bookings/*`, `/api/vendors/*`, `/api/vendor/*`): movie tickets
//! - **Reviews** (`/api/reviews`)
//! - **Cron** (`/api/cron/*`): scheduled maintenance, authenticated by `cron_secret`
//!
//! The OpenAPI document is served at `/docs`.

pub mod handlers;
pub mod models;
