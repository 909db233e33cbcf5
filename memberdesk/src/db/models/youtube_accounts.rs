use crate::types::{AppleAccountId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for creating a family slot
#[derive(Debug, Clone)]
pub struct YoutubeAccountCreateDBRequest {
    pub apple_account_id: AppleAccountId,
    pub youtube_email: String,
    pub nickname: Option<String>,
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
}

/// Database request for replacing a family slot's editable fields
#[derive(Debug, Clone)]
pub struct YoutubeAccountUpdateDBRequest {
    pub youtube_email: String,
    pub nickname: Option<String>,
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
}

/// Database response for a family slot
#[derive(Debug, Clone, FromRow)]
pub struct YoutubeAccountDBResponse {
    pub id: YoutubeAccountId,
    pub apple_account_id: AppleAccountId,
    pub youtube_email: String,
    pub nickname: Option<String>,
    pub renewal_date: NaiveDate,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}
