//! Database repository for movie-ticket booking requests.

use crate::db::errors::{DbError, Result};
use crate::db::models::bookings::{BookingCreateDBRequest, BookingDBResponse, BookingStats, BookingStatus, VendorBookingStats};
use crate::types::{abbrev_uuid, BookingId, VendorId};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Bookings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Bookings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a booking. New bookings are pending with zero commission.
    #[instrument(skip(self, request), fields(referral_type = ?request.referral_type), err)]
    pub async fn create(&mut self, request: &BookingCreateDBRequest) -> Result<BookingDBResponse> {
        let booking = sqlx::query_as::<_, BookingDBResponse>(
            r#"
            INSERT INTO movie_booking_requests (
                customer_email, customer_phone, theater, movie_title, show_date, show_time,
                seats, additional_info, referral_code, referral_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&request.customer_email)
        .bind(&request.customer_phone)
        .bind(&request.theater)
        .bind(&request.movie_title)
        .bind(&request.show_date)
        .bind(&request.show_time)
        .bind(request.seats)
        .bind(&request.additional_info)
        .bind(&request.referral_code)
        .bind(request.referral_type)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: BookingId) -> Result<Option<BookingDBResponse>> {
        let booking = sqlx::query_as::<_, BookingDBResponse>("SELECT * FROM movie_booking_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(booking)
    }

    /// All bookings, newest first, optionally with one status
    #[instrument(skip(self), err)]
    pub async fn list(&mut self, status: Option<BookingStatus>) -> Result<Vec<BookingDBResponse>> {
        let rows = sqlx::query_as::<_, BookingDBResponse>(
            "SELECT * FROM movie_booking_requests WHERE ($1::text IS NULL OR status = $1) ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// What a vendor can see: unclaimed pending bookings and everything they claimed
    #[instrument(skip(self), fields(vendor_id = %abbrev_uuid(&vendor_id)), err)]
    pub async fn list_for_vendor(&mut self, vendor_id: VendorId) -> Result<Vec<BookingDBResponse>> {
        let rows = sqlx::query_as::<_, BookingDBResponse>(
            "SELECT * FROM movie_booking_requests WHERE status = 'pending' OR claimed_by = $1 ORDER BY created_at DESC",
        )
        .bind(vendor_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Set the status. Moving to `claimed` with a vendor also records who claimed it and when.
    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id), status = status.as_str()), err)]
    pub async fn update_status(&mut self, id: BookingId, status: BookingStatus, claimed_by: Option<VendorId>) -> Result<BookingDBResponse> {
        let booking = sqlx::query_as::<_, BookingDBResponse>(
            r#"
            UPDATE movie_booking_requests SET
                status = $2,
                claimed_by = CASE WHEN $2 = 'claimed' AND $3::uuid IS NOT NULL THEN $3 ELSE claimed_by END,
                claimed_at = CASE WHEN $2 = 'claimed' AND $3::uuid IS NOT NULL THEN NOW() ELSE claimed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(claimed_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(booking)
    }

    /// Claim a pending booking for a vendor. Returns `None` if it is missing or no longer pending.
    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id), vendor_id = %abbrev_uuid(&vendor_id)), err)]
    pub async fn claim(&mut self, id: BookingId, vendor_id: VendorId) -> Result<Option<BookingDBResponse>> {
        let booking = sqlx::query_as::<_, BookingDBResponse>(
            r#"
            UPDATE movie_booking_requests SET
                status = 'claimed',
                claimed_by = $2,
                claimed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn set_commission(&mut self, id: BookingId, commission: Decimal) -> Result<BookingDBResponse> {
        let booking = sqlx::query_as::<_, BookingDBResponse>(
            "UPDATE movie_booking_requests SET commission = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(commission)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: BookingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movie_booking_requests WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn stats(&mut self) -> Result<BookingStats> {
        let stats = sqlx::query_as::<_, BookingStats>(
            r#"
            SELECT
                COUNT(*) AS total_bookings,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings,
                COALESCE(SUM(commission) FILTER (
                    WHERE status = 'completed' AND (referral_type = 'admin' OR referral_type IS NULL)
                ), 0) AS admin_commission
            FROM movie_booking_requests
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;
        Ok(stats)
    }

    /// Bookings a vendor both referred and claimed
    #[instrument(skip(self), fields(vendor_id = %abbrev_uuid(&vendor_id)), err)]
    pub async fn vendor_stats(&mut self, vendor_id: VendorId) -> Result<VendorBookingStats> {
        let stats = sqlx::query_as::<_, VendorBookingStats>(
            r#"
            SELECT
                COUNT(*) AS total_bookings,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings,
                COALESCE(SUM(commission) FILTER (WHERE status = 'completed'), 0) AS total_earnings
            FROM movie_booking_requests
            WHERE claimed_by = $1 AND referral_type = 'vendor'
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(stats)
    }
}
