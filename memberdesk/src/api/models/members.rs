//! API request/response models for members, deposits and customer renewal preferences.

use crate::db::models::members::{DepositStatus, MemberDBResponse, MemberDetailDBResponse, RenewalSweepEntry};
use crate::types::{MemberId, RequestId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing members
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListMembersQuery {
    /// Only members of this family slot
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub youtube_account_id: Option<YoutubeAccountId>,
}

/// Case-insensitive search over member name and email
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Create or fully replace a member. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MemberCreate {
    #[schema(value_type = String, format = "uuid")]
    pub youtube_account_id: YoutubeAccountId,
    pub nickname: String,
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub name: String,
    pub last_payment_date: Option<NaiveDate>,
    /// Date the paid period ends
    #[schema(example = "2025-03-31")]
    pub payment_date: NaiveDate,
    pub deposit_status: DepositStatus,
}

pub type MemberUpdate = MemberCreate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MemberId,
    #[schema(value_type = String, format = "uuid")]
    pub youtube_account_id: YoutubeAccountId,
    /// Application this member was registered from
    #[schema(value_type = Option<String>, format = "uuid")]
    pub request_id: Option<RequestId>,
    pub nickname: String,
    pub email: String,
    pub name: String,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_date: NaiveDate,
    pub deposit_status: DepositStatus,
    pub will_renew: bool,
    pub renew_months: Option<i32>,
    pub is_auto_payment: bool,
    pub renewal_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MemberDBResponse> for MemberResponse {
    fn from(db: MemberDBResponse) -> Self {
        Self {
            id: db.id,
            youtube_account_id: db.youtube_account_id,
            request_id: db.request_id,
            nickname: db.nickname,
            email: db.email,
            name: db.name,
            last_payment_date: db.last_payment_date,
            payment_date: db.payment_date,
            deposit_status: db.deposit_status,
            will_renew: db.will_renew,
            renew_months: db.renew_months,
            is_auto_payment: db.is_auto_payment,
            renewal_message: db.renewal_message,
            created_at: db.created_at,
        }
    }
}

/// A member together with the accounts their slot belongs to
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberDetailResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub youtube_email: String,
    pub youtube_nickname: Option<String>,
    pub apple_email: String,
}

impl From<MemberDetailDBResponse> for MemberDetailResponse {
    fn from(db: MemberDetailDBResponse) -> Self {
        Self {
            member: db.member.into(),
            youtube_email: db.youtube_email,
            youtube_nickname: db.youtube_nickname,
            apple_email: db.apple_email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositStatusUpdate {
    pub status: DepositStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDepositStatusUpdate {
    #[schema(value_type = Vec<String>)]
    pub member_ids: Vec<MemberId>,
    pub status: DepositStatus,
}

/// Lookup by full email, or by the part before `@`
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ExpiryQuery {
    #[param(example = "customer@gmail.com")]
    pub email: String,
}

/// What a customer sees when checking their membership
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MemberId,
    pub email: String,
    pub expiry_date: NaiveDate,
    pub will_renew: bool,
    pub renew_months: Option<i32>,
    pub is_auto_payment: bool,
}

impl From<MemberDBResponse> for ExpiryResponse {
    fn from(db: MemberDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            expiry_date: db.payment_date,
            will_renew: db.will_renew,
            renew_months: db.renew_months,
            is_auto_payment: db.is_auto_payment,
        }
    }
}

/// A customer's renewal intent. `renew_months` is required when `will_renew` is set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalPreferencesUpdate {
    pub email: String,
    pub will_renew: bool,
    #[schema(minimum = 1)]
    pub renew_months: Option<i32>,
    #[serde(default)]
    pub is_auto_payment: bool,
    pub renewal_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalPreferencesResponse {
    pub updated_count: usize,
    pub members: Vec<ExpiryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyMemberRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyMemberResponse {
    pub valid: bool,
}

/// Result of approving a member's renewal request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalApprovalResponse {
    pub member: MemberResponse,
    pub months: i32,
    /// Revenue recorded for the renewal
    pub amount: i32,
}

/// One member touched by the monthly renewal sweep
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalSweepEntryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub previous_payment_date: NaiveDate,
    pub previous_status: DepositStatus,
    pub new_payment_date: NaiveDate,
}

impl From<RenewalSweepEntry> for RenewalSweepEntryResponse {
    fn from(entry: RenewalSweepEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            previous_payment_date: entry.previous_payment_date,
            previous_status: entry.previous_status,
            new_payment_date: entry.new_payment_date,
        }
    }
}

/// Preview or outcome of the monthly renewal sweep
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyUpdateResponse {
    /// Business date the sweep ran for
    pub date: NaiveDate,
    /// Whether rows were written (false for a preview)
    pub applied: bool,
    pub count: usize,
    pub members: Vec<RenewalSweepEntryResponse>,
}

impl MonthlyUpdateResponse {
    pub fn new(date: NaiveDate, applied: bool, entries: Vec<RenewalSweepEntry>) -> Self {
        Self {
            date,
            applied,
            count: entries.len(),
            members: entries.into_iter().map(Into::into).collect(),
        }
    }
}
