//! API request/response models for ticket vendors.

use crate::db::models::vendors::VendorDBResponse;
use crate::types::VendorId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct VendorCreate {
    pub name: String,
    #[schema(example = "tickets@vendor.kr")]
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: String,
}

/// Partial vendor update. At least one field must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct VendorUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorLogin {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorResponse {
    /// Also the vendor's referral code
    #[schema(value_type = String, format = "uuid")]
    pub id: VendorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
    pub rating: Decimal,
    pub completed_bookings: i32,
    pub total_earnings: Decimal,
    /// Average response time in minutes
    pub response_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VendorDBResponse> for VendorResponse {
    fn from(db: VendorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            phone: db.phone,
            is_active: db.is_active,
            rating: db.rating,
            completed_bookings: db.completed_bookings,
            total_earnings: db.total_earnings,
            response_time: db.response_time,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Vendor session issued by the vendor login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorLoginResponse {
    pub token: String,
    pub vendor: VendorResponse,
}
