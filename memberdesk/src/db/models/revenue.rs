use crate::types::{MemberId, RevenueRecordId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database request for appending a ledger row
#[derive(Debug, Clone)]
pub struct RevenueRecordCreateDBRequest {
    pub member_id: Option<MemberId>,
    pub amount: i32,
    pub months: i32,
    pub description: Option<String>,
}

impl RevenueRecordCreateDBRequest {
    /// Payment for `months` of service at `price_per_month`
    pub fn payment(member_id: MemberId, months: i32, price_per_month: i64, description: impl Into<String>) -> Self {
        Self {
            member_id: Some(member_id),
            amount: (months as i64 * price_per_month) as i32,
            months,
            description: Some(description.into()),
        }
    }
}

/// Database response for a ledger row
#[derive(Debug, Clone, FromRow)]
pub struct RevenueRecordDBResponse {
    pub id: RevenueRecordId,
    pub member_id: Option<MemberId>,
    pub amount: i32,
    pub months: i32,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Ledger row with the paying member's name and email, when the member still exists
#[derive(Debug, Clone, FromRow)]
pub struct RevenueRecordDetailDBResponse {
    #[sqlx(flatten)]
    pub record: RevenueRecordDBResponse,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
}

/// Month-end snapshot
#[derive(Debug, Clone, FromRow)]
pub struct MonthlyRevenueDBResponse {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub member_count: i32,
    pub revenue: i64,
    pub recorded_at: DateTime<Utc>,
}
