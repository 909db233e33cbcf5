//! API request/response models for membership applications.

use super::pagination::Pagination;
use crate::db::models::member_requests::{AccountType, MemberRequestDBResponse, PlanType, RequestStatus};
use crate::types::{MemberId, RequestId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing applications
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListRequestsQuery {
    /// Only return applications with this status
    pub status: Option<RequestStatus>,

    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

/// A customer's application for a family slot.
///
/// Either `kakao_id` or `phone` is required so the operator can reach the applicant. Admin-type
/// applications may leave `email` empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MemberRequestCreate {
    #[schema(example = "applicant@example.com")]
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub kakao_id: Option<String>,
    #[schema(example = "010-1234-5678")]
    pub phone: Option<String>,
    /// Email of the member who referred this applicant
    pub referral_email: Option<String>,
    /// Months paid up front (default 1)
    #[schema(example = 3, minimum = 1)]
    pub months: Option<i32>,
    /// Name on the bank deposit
    pub depositor_name: Option<String>,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub account_type: AccountType,
}

/// Edit an application's payment details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberRequestUpdate {
    #[schema(minimum = 1)]
    pub months: Option<i32>,
    pub depositor_name: Option<String>,
}

/// Approve or reject an application
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestStatusUpdate {
    pub status: RequestStatus,
}

/// Place an approved applicant into a YouTube family slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(value_type = String, format = "uuid")]
    pub youtube_account_id: YoutubeAccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberRequestResponse {
    #[schema(value_type = String, format = "uuid")]
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
    /// Whether a member has been created from this application
    pub is_registered: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MemberRequestDBResponse> for MemberRequestResponse {
    fn from(db: MemberRequestDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            kakao_id: db.kakao_id,
            phone: db.phone,
            referral_email: db.referral_email,
            months: db.months,
            depositor_name: db.depositor_name,
            plan_type: db.plan_type,
            account_type: db.account_type,
            status: db.status,
            is_registered: db.is_registered,
            created_at: db.created_at,
        }
    }
}

/// Result of registering an application
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(value_type = String, format = "uuid")]
    pub member_id: MemberId,
    pub last_payment_date: NaiveDate,
    pub payment_date: NaiveDate,
    /// Revenue recorded for the paid months
    pub amount: i32,
}
