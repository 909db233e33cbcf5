//! API request/response models for the Apple and YouTube account hierarchy.

use crate::db::models::{
    apple_accounts::{AppleAccountDBResponse, AppleAccountDeletion},
    youtube_accounts::YoutubeAccountDBResponse,
};
use crate::types::{AppleAccountId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Create or fully replace an Apple account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AppleAccountCreate {
    #[schema(example = "owner@icloud.com")]
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid Apple account email"))]
    pub apple_email: String,
    /// Prepaid credit left on the account (default 0, never negative)
    #[serde(default)]
    #[schema(minimum = 0)]
    #[validate(range(min = 0, message = "Remaining credit cannot be negative"))]
    pub remaining_credit: i32,
    pub memo: Option<String>,
}

pub type AppleAccountUpdate = AppleAccountCreate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreditUpdate {
    #[schema(minimum = 0)]
    #[validate(range(min = 0, message = "Remaining credit cannot be negative"))]
    pub remaining_credit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppleAccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AppleAccountId,
    pub apple_email: String,
    pub remaining_credit: i32,
    pub memo: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<AppleAccountDBResponse> for AppleAccountResponse {
    fn from(db: AppleAccountDBResponse) -> Self {
        Self {
            id: db.id,
            apple_email: db.apple_email,
            remaining_credit: db.remaining_credit,
            memo: db.memo,
            last_updated: db.last_updated,
            created_at: db.created_at,
        }
    }
}

/// What a cascading Apple account delete removed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppleAccountDeleteResponse {
    pub deleted_youtube_accounts: u64,
    pub deleted_members: u64,
}

impl From<AppleAccountDeletion> for AppleAccountDeleteResponse {
    fn from(deletion: AppleAccountDeletion) -> Self {
        Self {
            deleted_youtube_accounts: deletion.youtube_accounts,
            deleted_members: deletion.members,
        }
    }
}

/// Query parameters for listing YouTube accounts
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListYoutubeAccountsQuery {
    /// Only accounts billed through this Apple account
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub apple_account_id: Option<AppleAccountId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct YoutubeAccountCreate {
    #[schema(value_type = String, format = "uuid")]
    pub apple_account_id: AppleAccountId,
    #[schema(example = "family.owner@gmail.com")]
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid YouTube account email"))]
    pub youtube_email: String,
    pub nickname: Option<String>,
    /// Next subscription renewal, `YYYY-MM-DD`
    #[schema(example = "2025-03-15")]
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct YoutubeAccountUpdate {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid YouTube account email"))]
    pub youtube_email: String,
    pub nickname: Option<String>,
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YoutubeAccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: YoutubeAccountId,
    #[schema(value_type = String, format = "uuid")]
    pub apple_account_id: AppleAccountId,
    pub youtube_email: String,
    pub nickname: Option<String>,
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<YoutubeAccountDBResponse> for YoutubeAccountResponse {
    fn from(db: YoutubeAccountDBResponse) -> Self {
        Self {
            id: db.id,
            apple_account_id: db.apple_account_id,
            youtube_email: db.youtube_email,
            nickname: db.nickname,
            renewal_date: db.renewal_date,
            memo: db.memo,
            created_at: db.created_at,
        }
    }
}
