//! Database models for movie-ticket booking requests.

use crate::commission::ReferralType;
use crate::types::{BookingId, VendorId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Booking lifecycle, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Claimed,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Claimed => "claimed",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "claimed" => Ok(BookingStatus::Claimed),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

/// Database request for creating a booking
#[derive(Debug, Clone)]
pub struct BookingCreateDBRequest {
    pub customer_email: String,
    pub customer_phone: String,
    pub theater: String,
    pub movie_title: String,
    pub show_date: String,
    pub show_time: String,
    pub seats: i32,
    pub additional_info: Option<String>,
    pub referral_code: Option<String>,
    pub referral_type: Option<ReferralType>,
}

/// Database response for a booking
#[derive(Debug, Clone, FromRow)]
pub struct BookingDBResponse {
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
    pub claimed_by: Option<VendorId>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub commission: Decimal,
    pub referral_code: Option<String>,
    pub referral_type: Option<ReferralType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin overview of bookings
#[derive(Debug, Clone, FromRow)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    /// Commission on completed bookings that came through the admin link or no referral
    pub admin_commission: Decimal,
}

/// A vendor's own referral performance
#[derive(Debug, Clone, FromRow)]
pub struct VendorBookingStats {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub total_earnings: Decimal,
}
