//! # memberdesk: back office for resold family subscriptions
//!
//! `memberdesk` runs the back office of a small reselling business. Customers apply for a seat on
//! a shared YouTube Premium family plan, an administrator approves the application and places the
//! customer on a family slot, and the service then tracks deposits, renewals and revenue month by
//! month. A second, smaller surface takes movie-ticket booking requests and hands them to vendors,
//! who claim them and earn a commission.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for all persistence.
//!
//! ### Account hierarchy
//!
//! Each **Apple account** pays for one or more **YouTube family slots**, and **members** are placed
//! on a slot by an administrator. Deleting an Apple account removes its slots and their members in
//! the same transaction. Every payment appends a row to the **revenue ledger**; month-end snapshots
//! are written by a cron call.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes everything under `/api`. Public routes cover applying for a
//! membership, checking an expiry date, asking to renew, booking tickets and posting reviews. The
//! rest is gated by the extractors in [`auth`]: an admin session, a vendor session, or the cron
//! secret.
//!
//! The **database layer** ([`db`]) uses the repository pattern. Each table has a repository that
//! borrows a connection, so several repositories can share one transaction.
//!
//! The date arithmetic behind billing lives in [`billing`] and the referral commission rules in
//! [`commission`], both free of I/O.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use memberdesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = memberdesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     memberdesk::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod billing;
pub mod commission;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    auth::password::{self, Argon2Params},
    config::CorsOrigin,
    db::handlers::AdminCredentials,
    email::EmailService,
    openapi::ApiDoc,
};
use axum::{
    Router, http,
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AppleAccountId, BookingId, MemberId, RequestId, VendorId, YoutubeAccountId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .email(Arc::new(EmailService::new(&config)?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub email: Arc<EmailService>,
}

/// Get the memberdesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Store the configured administrator password as an argon2 hash.
///
/// Runs on every start so that changing `admin_password` in the config takes effect. Without a
/// configured password the stored hash is left alone.
#[instrument(skip_all)]
pub async fn seed_admin_password(config: &Config, db: &PgPool) -> anyhow::Result<()> {
    let Some(admin_password) = config.admin_password.clone() else {
        debug!("No admin_password configured, keeping stored hash");
        return Ok(());
    };

    let params = Argon2Params::from(&config.auth.password);
    let hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&admin_password, Some(params)))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {e}"))??;

    let mut conn = db.acquire().await?;
    AdminCredentials::new(&mut conn).set_password_hash(&hash).await?;

    info!("Admin password seeded");
    Ok(())
}

/// Connect to PostgreSQL, run migrations and seed the admin password.
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database_url is not configured. Set DATABASE_URL or database_url in the config file."))?;

    let settings = &config.database.pool;
    let mut options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));
    if settings.idle_timeout_secs > 0 {
        options = options.idle_timeout(Duration::from_secs(settings.idle_timeout_secs));
    }
    if settings.max_lifetime_secs > 0 {
        options = options.max_lifetime(Duration::from_secs(settings.max_lifetime_secs));
    }

    info!("Connecting to database");
    let pool = options.connect(database_url).await?;

    migrator().run(&pool).await?;
    seed_admin_password(config, &pool).await?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.cors.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// All API routes live under `/api`. `/healthz` answers liveness checks and `/docs` serves the
/// OpenAPI reference.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers;

    let api_routes = Router::new()
        // Admin session
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // Membership applications
        .route("/requests", get(handlers::requests::list_requests))
        .route("/requests", post(handlers::requests::create_request))
        .route("/requests/{id}", patch(handlers::requests::update_request))
        .route("/requests/{id}", delete(handlers::requests::delete_request))
        .route("/requests/{id}/status", patch(handlers::requests::update_request_status))
        .route("/requests/{id}/register", post(handlers::requests::register_request))
        // Account hierarchy
        .route("/apple-accounts", get(handlers::apple_accounts::list_apple_accounts))
        .route("/apple-accounts", post(handlers::apple_accounts::create_apple_account))
        .route("/apple-accounts/{id}", put(handlers::apple_accounts::update_apple_account))
        .route("/apple-accounts/{id}", delete(handlers::apple_accounts::delete_apple_account))
        .route("/apple-accounts/{id}/credit", patch(handlers::apple_accounts::update_credit))
        .route("/youtube-accounts", get(handlers::youtube_accounts::list_youtube_accounts))
        .route("/youtube-accounts", post(handlers::youtube_accounts::create_youtube_account))
        .route("/youtube-accounts/{id}", put(handlers::youtube_accounts::update_youtube_account))
        .route("/youtube-accounts/{id}", delete(handlers::youtube_accounts::delete_youtube_account))
        // Members
        .route("/members", get(handlers::members::list_members))
        .route("/members", post(handlers::members::create_member))
        .route("/members/all", get(handlers::members::list_all_members))
        .route("/members/bulk-deposit-status", post(handlers::members::bulk_update_deposit_status))
        .route("/members/expiry", get(handlers::members::get_expiry))
        .route("/members/renewal", put(handlers::members::update_renewal_preferences))
        .route("/members/verify", post(handlers::members::verify_member))
        .route("/members/{id}", put(handlers::members::update_member))
        .route("/members/{id}", delete(handlers::members::delete_member))
        .route("/members/{id}/deposit-status", patch(handlers::members::update_deposit_status))
        // Renewals
        .route("/renewals", get(handlers::renewals::list_renewals))
        .route("/renewals/{member_id}/approve", post(handlers::renewals::approve_renewal))
        // Dashboard
        .route(
            "/admin/monthly-update",
            get(handlers::admin::preview_monthly_update).post(handlers::admin::run_monthly_update),
        )
        .route("/admin/stats", get(handlers::admin::get_stats))
        .route("/admin/request-stats", get(handlers::admin::get_request_stats))
        .route("/admin/revenue-records", get(handlers::admin::get_revenue_records))
        .route("/admin/monthly-revenue", get(handlers::admin::get_monthly_revenue))
        // Vendors
        .route("/vendors", get(handlers::vendors::list_vendors))
        .route("/vendors", post(handlers::vendors::create_vendor))
        .route("/vendors/login", post(handlers::vendors::vendor_login))
        .route("/vendors/{id}", patch(handlers::vendors::update_vendor))
        .route("/vendors/{id}", delete(handlers::vendors::delete_vendor))
        // Movie bookings
        .route("/movie-bookings", get(handlers::bookings::list_bookings))
        .route("/movie-bookings", post(handlers::bookings::create_booking))
        .route("/movie-bookings/stats", get(handlers::bookings::booking_stats))
        .route("/movie-bookings/{id}", delete(handlers::bookings::delete_booking))
        .route("/movie-bookings/{id}/status", patch(handlers::bookings::update_booking_status))
        .route("/movie-bookings/{id}/commission", patch(handlers::bookings::update_commission))
        // Vendor portal
        .route("/vendor/bookings", get(handlers::vendor_portal::vendor_bookings))
        .route("/vendor/bookings/{id}/claim", post(handlers::vendor_portal::claim_booking))
        .route("/vendor/stats", get(handlers::vendor_portal::vendor_stats))
        // Reviews
        .route("/reviews", get(handlers::reviews::list_reviews))
        .route("/reviews", post(handlers::reviews::create_review))
        // Scheduled maintenance
        .route(
            "/cron/update-expired-members",
            get(handlers::cron::update_expired_members).post(handlers::cron::update_expired_members),
        )
        .route(
            "/cron/record-monthly-revenue",
            get(handlers::cron::record_monthly_revenue).post(handlers::cron::record_monthly_revenue),
        )
        .route(
            "/cron/monthly-update",
            get(handlers::cron::monthly_update).post(handlers::cron::monthly_update),
        );

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The HTTP server and the resources it owns.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs migrations, seeds the admin
///    password and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, reusing `pool` when given instead of connecting from the config.
    ///
    /// Migrations and the admin password seed run either way.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting memberdesk with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                seed_admin_password(&config, &pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let email = Arc::new(EmailService::new(&config)?);

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).email(email).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "memberdesk listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
