//! OpenAPI documentation for the `/api` surface, served by Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::{handlers, models};
use crate::{commission::ReferralType, db::models as db_models};

/// Bearer and cookie session schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token from `/api/auth/login` or `/api/vendors/login`:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```\n\n\
                            Cron endpoints take the configured cron secret in the same header.",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "memberdesk_session",
                    "Session cookie set by the login endpoints",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api", description = "Membership desk API")
    ),
    modifiers(&SecurityAddon),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::update_request_status,
        handlers::requests::update_request,
        handlers::requests::delete_request,
        handlers::requests::register_request,
        handlers::apple_accounts::list_apple_accounts,
        handlers::apple_accounts::create_apple_account,
        handlers::apple_accounts::update_apple_account,
        handlers::apple_accounts::update_credit,
        handlers::apple_accounts::delete_apple_account,
        handlers::youtube_accounts::list_youtube_accounts,
        handlers::youtube_accounts::create_youtube_account,
        handlers::youtube_accounts::update_youtube_account,
        handlers::youtube_accounts::delete_youtube_account,
        handlers::members::list_members,
        handlers::members::list_all_members,
        handlers::members::create_member,
        handlers::members::update_member,
        handlers::members::delete_member,
        handlers::members::update_deposit_status,
        handlers::members::bulk_update_deposit_status,
        handlers::members::get_expiry,
        handlers::members::update_renewal_preferences,
        handlers::members::verify_member,
        handlers::renewals::list_renewals,
        handlers::renewals::approve_renewal,
        handlers::admin::preview_monthly_update,
        handlers::admin::run_monthly_update,
        handlers::admin::get_stats,
        handlers::admin::get_request_stats,
        handlers::admin::get_revenue_records,
        handlers::admin::get_monthly_revenue,
        handlers::vendors::list_vendors,
        handlers::vendors::create_vendor,
        handlers::vendors::update_vendor,
        handlers::vendors::delete_vendor,
        handlers::vendors::vendor_login,
        handlers::bookings::create_booking,
        handlers::bookings::list_bookings,
        handlers::bookings::update_booking_status,
        handlers::bookings::update_commission,
        handlers::bookings::delete_booking,
        handlers::bookings::booking_stats,
        handlers::vendor_portal::vendor_bookings,
        handlers::vendor_portal::claim_booking,
        handlers::vendor_portal::vendor_stats,
        handlers::reviews::list_reviews,
        handlers::reviews::create_review,
        handlers::cron::update_expired_members,
        handlers::cron::record_monthly_revenue,
        handlers::cron::monthly_update,
    ),
    components(
        schemas(
            models::auth::LoginRequest,
            models::auth::LoginInfo,
            models::auth::LogoutResponse,
            models::requests::MemberRequestCreate,
            models::requests::MemberRequestUpdate,
            models::requests::RequestStatusUpdate,
            models::requests::RegisterRequest,
            models::requests::MemberRequestResponse,
            models::requests::RegisterResponse,
            models::accounts::AppleAccountCreate,
            models::accounts::CreditUpdate,
            models::accounts::AppleAccountResponse,
            models::accounts::AppleAccountDeleteResponse,
            models::accounts::YoutubeAccountCreate,
            models::accounts::YoutubeAccountUpdate,
            models::accounts::YoutubeAccountResponse,
            models::members::MemberCreate,
            models::members::MemberResponse,
            models::members::MemberDetailResponse,
            models::members::DepositStatusUpdate,
            models::members::BulkDepositStatusUpdate,
            models::members::ExpiryResponse,
            models::members::RenewalPreferencesUpdate,
            models::members::RenewalPreferencesResponse,
            models::members::VerifyMemberRequest,
            models::members::VerifyMemberResponse,
            models::members::RenewalApprovalResponse,
            models::members::RenewalSweepEntryResponse,
            models::members::MonthlyUpdateResponse,
            models::admin::DashboardStats,
            models::admin::RequestStats,
            models::admin::RevenueRecordResponse,
            models::admin::MonthsBreakdownResponse,
            models::admin::RevenueRecordsResponse,
            models::admin::MonthlyRevenueResponse,
            models::vendors::VendorCreate,
            models::vendors::VendorUpdate,
            models::vendors::VendorLogin,
            models::vendors::VendorResponse,
            models::vendors::VendorLoginResponse,
            models::bookings::BookingCreate,
            models::bookings::BookingStatusUpdate,
            models::bookings::CommissionUpdate,
            models::bookings::BookingResponse,
            models::bookings::BookingStatsResponse,
            models::bookings::VendorStatsResponse,
            models::reviews::ReviewCreate,
            models::reviews::ReviewResponse,
            models::cron::ExpiredMemberResponse,
            models::cron::ExpiredMembersResponse,
            models::cron::MonthlyRevenueRecorded,
            db_models::member_requests::RequestStatus,
            db_models::member_requests::PlanType,
            db_models::member_requests::AccountType,
            db_models::members::DepositStatus,
            db_models::bookings::BookingStatus,
            ReferralType,
            crate::auth::session::SessionRole,
        )
    ),
    tags(
        (name = "auth", description = "Administrator login and logout"),
        (name = "requests", description = "Membership applications. Creating one is public; everything else is admin-only."),
        (name = "accounts", description = "Apple accounts and the YouTube family slots billed to them"),
        (name = "members", description = "Members of a family slot, their deposits, and the public expiry and renewal lookups"),
        (name = "renewals", description = "Renewal requests and their approval"),
        (name = "admin", description = "Dashboard statistics and the renewal sweep"),
        (name = "vendors", description = "Ticket vendors and vendor login"),
        (name = "bookings", description = "Movie-ticket bookings and commissions"),
        (name = "vendor", description = "The vendor portal"),
        (name = "reviews", description = "Customer reviews"),
        (name = "cron", description = "Maintenance endpoints for the external scheduler. Authenticate with the cron secret as a bearer token."),
    ),
    info(
        title = "Membership Desk API",
        version = "1.0.0",
        description = "Request intake, shared account assignment, renewals and revenue tracking for resold family subscriptions, plus movie-ticket booking for vendors.

## Authentication

Admin routes take the session issued by `POST /api/auth/login`, either as a bearer token or as the session cookie. Vendor routes take the session from `POST /api/vendors/login`.

## Errors

Every error has the body:

```json
{ \"error\": \"This email has already applied\" }
```"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_area() {
        let doc = ApiDoc::openapi();

        for path in [
            "/requests",
            "/requests/{id}/register",
            "/apple-accounts/{id}/credit",
            "/members/renewal",
            "/movie-bookings/{id}/commission",
            "/vendor/bookings/{id}/claim",
            "/cron/monthly-update",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
        assert!(components.security_schemes.contains_key("CookieAuth"));
    }
}
