//! Database models for members and their renewal state.

use crate::types::{MemberId, RequestId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Payment state for the current billing period, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Completed,
    Failed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Completed => "completed",
            DepositStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for DepositStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DepositStatus::Pending),
            "completed" => Ok(DepositStatus::Completed),
            "failed" => Ok(DepositStatus::Failed),
            _ => Err(format!("Unknown deposit status: {}", s)),
        }
    }
}

/// Database request for creating a member
#[derive(Debug, Clone)]
pub struct MemberCreateDBRequest {
    pub youtube_account_id: YoutubeAccountId,
    pub request_id: Option<RequestId>,
    pub nickname: String,
    pub email: String,
    pub name: String,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_date: NaiveDate,
    pub deposit_status: DepositStatus,
}

/// Database request for replacing a member's editable fields
#[derive(Debug, Clone)]
pub struct MemberUpdateDBRequest {
    pub youtube_account_id: YoutubeAccountId,
    pub nickname: String,
    pub email: String,
    pub name: String,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_date: NaiveDate,
    pub deposit_status: DepositStatus,
}

/// Database response for a member
#[derive(Debug, Clone, FromRow)]
pub struct MemberDBResponse {
    pub id: MemberId,
    pub youtube_account_id: YoutubeAccountId,
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

/// A member joined with the slot and Apple account it lives under
#[derive(Debug, Clone, FromRow)]
pub struct MemberDetailDBResponse {
    #[sqlx(flatten)]
    pub member: MemberDBResponse,
    pub youtube_email: String,
    pub youtube_nickname: Option<String>,
    pub apple_email: String,
}

/// Customer-submitted renewal preferences, applied to every row with the email
#[derive(Debug, Clone)]
pub struct RenewalPreferencesDBRequest {
    pub will_renew: bool,
    pub renew_months: Option<i32>,
    pub is_auto_payment: bool,
    pub renewal_message: Option<String>,
}

/// One member moved by the monthly renewal sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalSweepEntry {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub previous_payment_date: NaiveDate,
    pub previous_status: DepositStatus,
    pub new_payment_date: NaiveDate,
}

/// A member whose completed period lapsed and was reset to pending
#[derive(Debug, Clone, FromRow)]
pub struct ExpiredMember {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub payment_date: NaiveDate,
}
