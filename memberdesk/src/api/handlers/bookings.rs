use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    AppState,
    api::models::bookings::{BookingCreate, BookingResponse, BookingStatsResponse, BookingStatusUpdate, CommissionUpdate, ListBookingsQuery},
    auth::AdminSession,
    commission::{ADMIN_REFERRAL_CODE, ReferralType, commission_for, resolve_referral},
    db::{
        handlers::{Bookings, Repository, Vendors, vendors::VendorFilter},
        models::bookings::BookingCreateDBRequest,
    },
    errors::{Error, Result},
    types::{BookingId, abbrev_uuid},
};

fn booking_not_found(id: BookingId) -> Error {
    Error::NotFound {
        resource: "Booking".to_string(),
        id: id.to_string(),
    }
}

/// Submit a movie-ticket booking request.
///
/// The referral code decides who hears about it: a known vendor's code notifies only that
/// vendor (if active), anything else notifies every active vendor.
#[utoipa::path(
    post,
    path = "/movie-bookings",
    request_body = BookingCreate,
    tag = "bookings",
    summary = "Request a booking",
    responses(
        (status = 201, description = "Booking received", body = BookingResponse),
        (status = 400, description = "Missing fields or invalid email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_booking(State(state): State<AppState>, Json(create): Json<BookingCreate>) -> Result<(StatusCode, Json<BookingResponse>)> {
    let required = [
        &create.customer_email,
        &create.customer_phone,
        &create.theater,
        &create.movie_title,
        &create.show_date,
        &create.show_time,
    ];
    if required.iter().any(|field| field.trim().is_empty()) || create.seats < 1 {
        return Err(Error::BadRequest {
            message: "All booking fields are required".to_string(),
        });
    }
    create.validate()?;

    let referral_code = create.referral_code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let referring_vendor = match referral_code.as_deref() {
        Some(code) if code != ADMIN_REFERRAL_CODE => Vendors::new(&mut conn).find_by_referral_code(code).await?,
        _ => None,
    };
    let referral_type = resolve_referral(referral_code.as_deref(), referring_vendor.is_some());

    let booking = Bookings::new(&mut conn)
        .create(&BookingCreateDBRequest {
            customer_email: create.customer_email.trim().to_string(),
            customer_phone: create.customer_phone.trim().to_string(),
            theater: create.theater.trim().to_string(),
            movie_title: create.movie_title.trim().to_string(),
            show_date: create.show_date.trim().to_string(),
            show_time: create.show_time.trim().to_string(),
            seats: create.seats,
            additional_info: create.additional_info,
            referral_code,
            referral_type,
        })
        .await?;

    let recipients: Vec<String> = match (referral_type, referring_vendor) {
        (Some(ReferralType::Vendor), Some(vendor)) => {
            if vendor.is_active {
                vec![vendor.email]
            } else {
                debug!(vendor_id = %abbrev_uuid(&vendor.id), "Referring vendor is inactive, nobody notified");
                Vec::new()
            }
        }
        _ => Vendors::new(&mut conn)
            .list(&VendorFilter { active_only: true })
            .await?
            .into_iter()
            .map(|v| v.email)
            .collect(),
    };

    info!(
        booking_id = %abbrev_uuid(&booking.id),
        referral_type = ?booking.referral_type,
        recipients = recipients.len(),
        "New booking request"
    );

    let emails = state.email.booking_notifications(&booking, &recipients);
    state.email.spawn_send(emails);

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// List bookings
#[utoipa::path(
    get,
    path = "/movie-bookings",
    tag = "bookings",
    summary = "List bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = Vec<BookingResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
    _: AdminSession,
) -> Result<Json<Vec<BookingResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let bookings = Bookings::new(&mut conn).list(query.status).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Set a booking's status
#[utoipa::path(
    patch,
    path = "/movie-bookings/{id}/status",
    request_body = BookingStatusUpdate,
    tag = "bookings",
    summary = "Update booking status",
    params(("id" = uuid::Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Status updated", body = BookingResponse),
        (status = 404, description = "Booking or vendor not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    _: AdminSession,
    Json(update): Json<BookingStatusUpdate>,
) -> Result<Json<BookingResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(vendor_id) = update.claimed_by {
        Vendors::new(&mut conn).get_by_id(vendor_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Vendor".to_string(),
            id: vendor_id.to_string(),
        })?;
    }

    let booking = Bookings::new(&mut conn).update_status(id, update.status, update.claimed_by).await?;
    Ok(Json(booking.into()))
}

/// Record the final ticket price and compute the commission on it
#[utoipa::path(
    patch,
    path = "/movie-bookings/{id}/commission",
    request_body = CommissionUpdate,
    tag = "bookings",
    summary = "Set commission",
    params(("id" = uuid::Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Commission recorded", body = BookingResponse),
        (status = 400, description = "Negative price"),
        (status = 404, description = "Booking not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_commission(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    _: AdminSession,
    Json(update): Json<CommissionUpdate>,
) -> Result<Json<BookingResponse>> {
    if update.total_price.is_sign_negative() {
        return Err(Error::BadRequest {
            message: "Total price cannot be negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let booking = repo.get_by_id(id).await?.ok_or_else(|| booking_not_found(id))?;
    let commission = commission_for(booking.referral_type, update.total_price);
    let booking = repo.set_commission(id, commission).await?;

    debug!(booking_id = %abbrev_uuid(&id), %commission, "Commission recorded");
    Ok(Json(booking.into()))
}

#[utoipa::path(
    delete,
    path = "/movie-bookings/{id}",
    tag = "bookings",
    summary = "Delete booking",
    params(("id" = uuid::Uuid, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_booking(State(state): State<AppState>, Path(id): Path<BookingId>, _: AdminSession) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Bookings::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(booking_not_found(id))
    }
}

/// Booking totals and the commission kept on direct bookings
#[utoipa::path(
    get,
    path = "/movie-bookings/stats",
    tag = "bookings",
    summary = "Booking statistics",
    responses(
        (status = 200, description = "Booking statistics", body = BookingStatsResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn booking_stats(State(state): State<AppState>, _: AdminSession) -> Result<Json<BookingStatsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let stats = Bookings::new(&mut conn).stats().await?;
    Ok(Json(stats.into()))
}
