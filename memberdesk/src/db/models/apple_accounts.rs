use crate::types::AppleAccountId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating an Apple account
#[derive(Debug, Clone)]
pub struct AppleAccountCreateDBRequest {
    pub apple_email: String,
    pub remaining_credit: i32,
    pub memo: Option<String>,
}

/// Database request for replacing an Apple account's editable fields
#[derive(Debug, Clone)]
pub struct AppleAccountUpdateDBRequest {
    pub apple_email: String,
    pub remaining_credit: i32,
    pub memo: Option<String>,
}

/// Database response for an Apple account
#[derive(Debug, Clone, FromRow)]
pub struct AppleAccountDBResponse {
    pub id: AppleAccountId,
    pub apple_email: String,
    pub remaining_credit: i32,
    pub memo: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Row counts removed by a cascading Apple account delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppleAccountDeletion {
    pub youtube_accounts: u64,
    pub members: u64,
}
