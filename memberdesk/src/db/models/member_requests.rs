//! Database models for membership applications.

use crate::types::RequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Review state of an application, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Family,
    Individual,
}

/// Whether the applicant is a customer or the admin registering a house account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    User,
    Admin,
}

/// Database request for creating an application
#[derive(Debug, Clone, Default)]
pub struct MemberRequestCreateDBRequest {
    pub email: Option<String>,
    pub kakao_id: Option<String>,
    pub phone: Option<String>,
    pub referral_email: Option<String>,
    pub months: Option<i32>,
    pub depositor_name: Option<String>,
    pub plan_type: PlanType,
    pub account_type: AccountType,
}

/// Database request for editing an application. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemberRequestUpdateDBRequest {
    pub months: Option<i32>,
    pub depositor_name: Option<String>,
    pub status: Option<RequestStatus>,
}

/// Database response for an application
#[derive(Debug, Clone, FromRow)]
pub struct MemberRequestDBResponse {
    pub id: RequestId,
    pub email: String,
    pub kakao_id: Option<String>,
    pub phone: Option<String>,
    pub referral_email: Option<String>,
    pub months: Option<i32>,
    pub depositor_name: Option<String>,
    pub plan_type: PlanType,
    pub account_type: AccountType,
    pub status: RequestStatus,
    /// True once a member row links back to this request
    pub is_registered: bool,
    pub created_at: DateTime<Utc>,
}

/// Request counts per status
#[derive(Debug, Clone, Default, FromRow)]
pub struct RequestStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}
