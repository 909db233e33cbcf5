use crate::types::VendorId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating a vendor
#[derive(Debug, Clone)]
pub struct VendorCreateDBRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Database request for a partial vendor update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct VendorUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl VendorUpdateDBRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.is_active.is_none()
    }
}

/// Database response for a vendor
#[derive(Debug, Clone, FromRow)]
pub struct VendorDBResponse {
    pub id: VendorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
    pub rating: Decimal,
    pub completed_bookings: i32,
    pub total_earnings: Decimal,
    pub response_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
