//! API request/response models for movie-ticket bookings.

use crate::commission::ReferralType;
use crate::db::models::bookings::{BookingDBResponse, BookingStats, BookingStatus, VendorBookingStats};
use crate::types::{BookingId, VendorId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
}

/// A customer's ticket request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct BookingCreate {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: String,
    pub customer_phone: String,
    #[schema(example = "CGV Gangnam")]
    pub theater: String,
    pub movie_title: String,
    #[schema(example = "2025-03-01")]
    pub show_date: String,
    #[schema(example = "19:30")]
    pub show_time: String,
    #[schema(minimum = 1)]
    pub seats: i32,
    pub additional_info: Option<String>,
    /// `admin`, a vendor id, or absent
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
    /// Vendor to record when moving to `claimed`
    #[schema(value_type = Option<String>, format = "uuid")]
    pub claimed_by: Option<VendorId>,
}

/// Final ticket price the commission is computed from
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommissionUpdate {
    #[schema(example = "15000")]
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    pub customer_email: String,
    pub customer_phone: String,
    pub theater: String,
    pub movie_title: String,
    pub show_date: String,
    pub show_time: String,
    pub seats: i32,
    pub additional_info: Option<String>,
    pub status: BookingStatus,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub claimed_by: Option<VendorId>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub commission: Decimal,
    pub referral_code: Option<String>,
    pub referral_type: Option<ReferralType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingDBResponse> for BookingResponse {
    fn from(db: BookingDBResponse) -> Self {
        Self {
            id: db.id,
            customer_email: db.customer_email,
            customer_phone: db.customer_phone,
            theater: db.theater,
            movie_title: db.movie_title,
            show_date: db.show_date,
            show_time: db.show_time,
            seats: db.seats,
            additional_info: db.additional_info,
            status: db.status,
            claimed_by: db.claimed_by,
            claimed_at: db.claimed_at,
            commission: db.commission,
            referral_code: db.referral_code,
            referral_type: db.referral_type,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingStatsResponse {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    /// Commission on completed bookings that came in without a vendor referral
    pub admin_commission: Decimal,
}

impl From<BookingStats> for BookingStatsResponse {
    fn from(stats: BookingStats) -> Self {
        Self {
            total_bookings: stats.total_bookings,
            completed_bookings: stats.completed_bookings,
            admin_commission: stats.admin_commission,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorStatsResponse {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub total_earnings: Decimal,
}

impl From<VendorBookingStats> for VendorStatsResponse {
    fn from(stats: VendorBookingStats) -> Self {
        Self {
            total_bookings: stats.total_bookings,
            completed_bookings: stats.completed_bookings,
            total_earnings: stats.total_earnings,
        }
    }
}
