//! Test utilities for integration testing (available with `test-utils` feature).

use crate::auth::session::{self, SessionClaims, SessionRole};
use crate::commission::ReferralType;
use crate::config::{AuthConfig, Config, EmailConfig, EmailTransportConfig, PasswordConfig, PoolSettings};
use crate::db::{
    handlers::{AppleAccounts, Bookings, Members, Repository, Vendors, YoutubeAccounts},
    models::{
        apple_accounts::{AppleAccountCreateDBRequest, AppleAccountDBResponse},
        bookings::{BookingCreateDBRequest, BookingDBResponse},
        members::{DepositStatus, MemberCreateDBRequest, MemberDBResponse},
        vendors::{VendorCreateDBRequest, VendorDBResponse},
        youtube_accounts::{YoutubeAccountCreateDBRequest, YoutubeAccountDBResponse},
    },
};
use crate::types::{AppleAccountId, YoutubeAccountId};
use axum_test::TestServer;
use chrono::{Months, NaiveDate, Utc};
use sqlx::PgPool;

pub const TEST_ADMIN_PASSWORD: &str = "test-admin-password";
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    // Use temp directory for test emails
    let temp_dir = std::env::temp_dir().join(format!("memberdesk-test-emails-{}", std::process::id()));

    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: crate::config::DatabaseConfig {
            pool: PoolSettings {
                max_connections: 2,
                min_connections: 0,
                ..Default::default()
            },
        },
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        admin_password: Some(TEST_ADMIN_PASSWORD.to_string()),
        cron_secret: Some(TEST_CRON_SECRET.to_string()),
        auth: AuthConfig {
            // Cheap hashing keeps login tests fast
            password: PasswordConfig {
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
            },
            ..Default::default()
        },
        billing: Default::default(),
        email: EmailConfig {
            transport: EmailTransportConfig::File {
                path: temp_dir.to_string_lossy().to_string(),
            },
            admin_notification_email: Some("admin@memberdesk.test".to_string()),
            ..Default::default()
        },
    }
}

/// Bearer header carrying a fresh admin session
pub fn admin_auth_header() -> (String, String) {
    let config = create_test_config();
    let token = session::create_session_token(&SessionClaims::admin(&config), &config).expect("Failed to create admin token");
    ("authorization".to_string(), format!("Bearer {token}"))
}

/// Bearer header carrying a session for `vendor`
pub fn vendor_auth_header(vendor: &VendorDBResponse) -> (String, String) {
    let config = create_test_config();
    let claims = SessionClaims::new(vendor.id, vendor.email.clone(), SessionRole::Vendor, &config);
    let token = session::create_session_token(&claims, &config).expect("Failed to create vendor token");
    ("authorization".to_string(), format!("Bearer {token}"))
}

pub fn cron_auth_header() -> (String, String) {
    ("authorization".to_string(), format!("Bearer {TEST_CRON_SECRET}"))
}

pub async fn create_test_apple_account(pool: &PgPool, apple_email: &str) -> AppleAccountDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    AppleAccounts::new(&mut conn)
        .create(&AppleAccountCreateDBRequest {
            apple_email: apple_email.to_string(),
            remaining_credit: 0,
            memo: None,
        })
        .await
        .expect("Failed to create test apple account")
}

pub async fn create_test_youtube_account(pool: &PgPool, apple_account_id: AppleAccountId, youtube_email: &str) -> YoutubeAccountDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    YoutubeAccounts::new(&mut conn)
        .create(&YoutubeAccountCreateDBRequest {
            apple_account_id,
            youtube_email: youtube_email.to_string(),
            nickname: Some("family".to_string()),
            renewal_date: Utc::now().date_naive(),
            memo: None,
        })
        .await
        .expect("Failed to create test youtube account")
}

/// A pending member whose next payment is a month out
pub async fn create_test_member(pool: &PgPool, youtube_account_id: YoutubeAccountId, email: &str) -> MemberDBResponse {
    let payment_date = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(1))
        .expect("date in range");
    create_test_member_with(pool, youtube_account_id, email, payment_date, DepositStatus::Pending).await
}

pub async fn create_test_member_with(
    pool: &PgPool,
    youtube_account_id: YoutubeAccountId,
    email: &str,
    payment_date: NaiveDate,
    deposit_status: DepositStatus,
) -> MemberDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Members::new(&mut conn)
        .create(&MemberCreateDBRequest {
            youtube_account_id,
            request_id: None,
            nickname: "tester".to_string(),
            email: email.to_string(),
            name: "Test Member".to_string(),
            last_payment_date: None,
            payment_date,
            deposit_status,
        })
        .await
        .expect("Failed to create test member")
}

pub async fn create_test_vendor(pool: &PgPool, email: &str) -> VendorDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Vendors::new(&mut conn)
        .create(&VendorCreateDBRequest {
            name: "Test Vendor".to_string(),
            email: email.to_string(),
            phone: "010-0000-0000".to_string(),
        })
        .await
        .expect("Failed to create test vendor")
}

pub async fn create_test_booking(pool: &PgPool, referral_code: Option<String>, referral_type: Option<ReferralType>) -> BookingDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Bookings::new(&mut conn)
        .create(&BookingCreateDBRequest {
            customer_email: "moviegoer@example.com".to_string(),
            customer_phone: "010-1111-2222".to_string(),
            theater: "CGV Yongsan".to_string(),
            movie_title: "Test Movie".to_string(),
            show_date: "2025-03-01".to_string(),
            show_time: "20:00".to_string(),
            seats: 2,
            additional_info: None,
            referral_code,
            referral_type,
        })
        .await
        .expect("Failed to create test booking")
}
