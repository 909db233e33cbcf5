//! Routes a logged-in vendor uses to find and claim bookings.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::{
    AppState,
    api::models::bookings::{BookingResponse, VendorStatsResponse},
    auth::VendorSession,
    db::handlers::Bookings,
    errors::{Error, Result},
    types::{BookingId, abbrev_uuid},
};

/// Bookings open for claiming plus the vendor's own
#[utoipa::path(
    get,
    path = "/vendor/bookings",
    tag = "vendor",
    summary = "Vendor booking list",
    responses(
        (status = 200, description = "Pending bookings and bookings claimed by this vendor", body = Vec<BookingResponse>),
        (status = 401, description = "No vendor session"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn vendor_bookings(State(state): State<AppState>, session: VendorSession) -> Result<Json<Vec<BookingResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let bookings = Bookings::new(&mut conn).list_for_vendor(session.vendor_id).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Claim a pending booking
#[utoipa::path(
    post,
    path = "/vendor/bookings/{id}/claim",
    tag = "vendor",
    summary = "Claim booking",
    params(("id" = uuid::Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking claimed", body = BookingResponse),
        (status = 401, description = "No vendor session"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is no longer pending"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn claim_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    session: VendorSession,
) -> Result<Json<BookingResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    match repo.claim(id, session.vendor_id).await? {
        Some(booking) => {
            info!(booking_id = %abbrev_uuid(&id), vendor_id = %abbrev_uuid(&session.vendor_id), "Booking claimed");
            Ok(Json(booking.into()))
        }
        None if repo.get_by_id(id).await?.is_some() => Err(Error::Conflict {
            message: "This booking has already been claimed".to_string(),
        }),
        None => Err(Error::NotFound {
            resource: "Booking".to_string(),
            id: id.to_string(),
        }),
    }
}

/// Totals for bookings the vendor referred and handled
#[utoipa::path(
    get,
    path = "/vendor/stats",
    tag = "vendor",
    summary = "Vendor statistics",
    responses(
        (status = 200, description = "Vendor statistics", body = VendorStatsResponse),
        (status = 401, description = "No vendor session"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn vendor_stats(State(state): State<AppState>, session: VendorSession) -> Result<Json<VendorStatsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let stats = Bookings::new(&mut conn).vendor_stats(session.vendor_id).await?;
    Ok(Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::bookings::{BookingResponse, VendorStatsResponse};
    use crate::commission::ReferralType;
    use crate::db::models::bookings::BookingStatus;
    use crate::test_utils::{admin_auth_header, create_test_app, create_test_booking, create_test_vendor, vendor_auth_header};
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_claim_race_has_one_winner(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let first = create_test_vendor(&pool, "first@vendor.kr").await;
        let second = create_test_vendor(&pool, "second@vendor.kr").await;
        let booking = create_test_booking(&pool, None, None).await;
        let (first_name, first_value) = vendor_auth_header(&first);
        let (second_name, second_value) = vendor_auth_header(&second);

        let visible: Vec<BookingResponse> = app
            .get("/api/vendor/bookings")
            .add_header(second_name.clone(), second_value.clone())
            .await
            .json();
        assert_eq!(visible.len(), 1);

        let claimed: BookingResponse = app
            .post(&format!("/api/vendor/bookings/{}/claim", booking.id))
            .add_header(first_name, first_value)
            .await
            .json();
        assert_eq!(claimed.status, BookingStatus::Claimed);
        assert_eq!(claimed.claimed_by, Some(first.id));

        app.post(&format!("/api/vendor/bookings/{}/claim", booking.id))
            .add_header(second_name.clone(), second_value.clone())
            .await
            .assert_status(StatusCode::CONFLICT);

        let visible: Vec<BookingResponse> = app
            .get("/api/vendor/bookings")
            .add_header(second_name.clone(), second_value.clone())
            .await
            .json();
        assert!(visible.is_empty());

        app.post(&format!("/api/vendor/bookings/{}/claim", uuid::Uuid::new_v4()))
            .add_header(second_name, second_value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_vendor_stats_count_referred_and_claimed(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let vendor = create_test_vendor(&pool, "v@vendor.kr").await;
        let referred = create_test_booking(&pool, Some(vendor.id.to_string()), Some(ReferralType::Vendor)).await;
        create_test_booking(&pool, None, None).await;
        let (vendor_name, vendor_value) = vendor_auth_header(&vendor);
        let (admin_name, admin_value) = admin_auth_header();

        app.post(&format!("/api/vendor/bookings/{}/claim", referred.id))
            .add_header(vendor_name.clone(), vendor_value.clone())
            .await
            .assert_status_ok();
        app.patch(&format!("/api/movie-bookings/{}/commission", referred.id))
            .add_header(admin_name.clone(), admin_value.clone())
            .json(&json!({ "total_price": 12000 }))
            .await
            .assert_status_ok();
        app.patch(&format!("/api/movie-bookings/{}/status", referred.id))
            .add_header(admin_name, admin_value)
            .json(&json!({ "status": "completed" }))
            .await
            .assert_status_ok();

        let stats: VendorStatsResponse = app.get("/api/vendor/stats").add_header(vendor_name, vendor_value).await.json();
        assert_eq!(stats.total_bookings, 1);
        assert_eq!(stats.completed_bookings, 1);
        assert_eq!(stats.total_earnings, Decimal::from(12_000));
    }

    #[sqlx::test]
    async fn test_admin_session_is_not_a_vendor_session(pool: PgPool) {
        let app = create_test_app(pool).await;
        let (name, value) = admin_auth_header();
        app.get("/api/vendor/bookings")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
