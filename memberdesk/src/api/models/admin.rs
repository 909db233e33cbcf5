//! Dashboard and ledger figures for the admin console.

use crate::db::handlers::revenue::MonthsBreakdown;
use crate::db::models::member_requests::RequestStatusCounts;
use crate::db::models::revenue::{MonthlyRevenueDBResponse, RevenueRecordDetailDBResponse};
use crate::types::{MemberId, RevenueRecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_members: i64,
    pub total_youtube_accounts: i64,
    /// Sum of every ledger entry
    pub cumulative_revenue: i64,
    /// Members times the monthly price
    pub monthly_revenue: i64,
    /// YouTube accounts times the monthly account cost
    pub monthly_cost: i64,
    pub profit: i64,
}

impl DashboardStats {
    pub fn new(
        total_members: i64,
        total_youtube_accounts: i64,
        cumulative_revenue: i64,
        price_per_member_month: i64,
        account_monthly_cost: i64,
    ) -> Self {
        let monthly_revenue = total_members * price_per_member_month;
        let monthly_cost = total_youtube_accounts * account_monthly_cost;
        Self {
            total_members,
            total_youtube_accounts,
            cumulative_revenue,
            monthly_revenue,
            monthly_cost,
            profit: monthly_revenue - monthly_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl From<RequestStatusCounts> for RequestStats {
    fn from(counts: RequestStatusCounts) -> Self {
        Self {
            total: counts.total,
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueRecordResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RevenueRecordId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub member_id: Option<MemberId>,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub amount: i32,
    pub months: i32,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<RevenueRecordDetailDBResponse> for RevenueRecordResponse {
    fn from(db: RevenueRecordDetailDBResponse) -> Self {
        Self {
            id: db.record.id,
            member_id: db.record.member_id,
            member_name: db.member_name,
            member_email: db.member_email,
            amount: db.record.amount,
            months: db.record.months,
            description: db.record.description,
            recorded_at: db.record.recorded_at,
        }
    }
}

/// Number of ledger entries for one `months` value
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthsBreakdownResponse {
    pub months: i32,
    pub count: i64,
}

impl From<MonthsBreakdown> for MonthsBreakdownResponse {
    fn from(row: MonthsBreakdown) -> Self {
        Self {
            months: row.months,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueRecordsResponse {
    pub records: Vec<RevenueRecordResponse>,
    pub total_revenue: i64,
    pub months_breakdown: Vec<MonthsBreakdownResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenueResponse {
    pub year: i32,
    pub month: i32,
    pub member_count: i32,
    pub revenue: i64,
    pub recorded_at: DateTime<Utc>,
}

impl From<MonthlyRevenueDBResponse> for MonthlyRevenueResponse {
    fn from(db: MonthlyRevenueDBResponse) -> Self {
        Self {
            year: db.year,
            month: db.month,
            member_count: db.member_count,
            revenue: db.revenue,
            recorded_at: db.recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_profit() {
        let stats = DashboardStats::new(10, 2, 120_000, 4_000, 389 * 16);
        assert_eq!(stats.monthly_revenue, 40_000);
        assert_eq!(stats.monthly_cost, 12_448);
        assert_eq!(stats.profit, 27_552);
    }

    #[test]
    fn test_dashboard_can_run_at_a_loss() {
        let stats = DashboardStats::new(0, 1, 0, 4_000, 6_224);
        assert_eq!(stats.profit, -6_224);
    }
}
