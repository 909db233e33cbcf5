//! Database repository for the revenue ledger and month-end snapshots.

use crate::db::errors::Result;
use crate::db::models::revenue::{
    MonthlyRevenueDBResponse, RevenueRecordCreateDBRequest, RevenueRecordDBResponse, RevenueRecordDetailDBResponse,
};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Number of ledger rows per `months` value
#[derive(Debug, Clone, FromRow)]
pub struct MonthsBreakdown {
    pub months: i32,
    pub count: i64,
}

pub struct Revenue<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Revenue<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Append a ledger row. Rows are never updated or removed.
    #[instrument(skip(self, request), fields(amount = request.amount, months = request.months), err)]
    pub async fn record(&mut self, request: &RevenueRecordCreateDBRequest) -> Result<RevenueRecordDBResponse> {
        let record = sqlx::query_as::<_, RevenueRecordDBResponse>(
            "INSERT INTO revenue_records (member_id, amount, months, description) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(request.member_id)
        .bind(request.amount)
        .bind(request.months)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(record)
    }

    /// Ledger rows newest first, with the member's name and email where the member still exists
    #[instrument(skip(self), err)]
    pub async fn list_records(&mut self) -> Result<Vec<RevenueRecordDetailDBResponse>> {
        let rows = sqlx::query_as::<_, RevenueRecordDetailDBResponse>(
            r#"
            SELECT r.*, m.name AS member_name, m.email AS member_email
            FROM revenue_records r
            LEFT JOIN members m ON m.id = r.member_id
            ORDER BY r.recorded_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Sum of every ledger row
    #[instrument(skip(self), err)]
    pub async fn total(&mut self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM revenue_records")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }

    #[instrument(skip(self), err)]
    pub async fn months_breakdown(&mut self) -> Result<Vec<MonthsBreakdown>> {
        let rows = sqlx::query_as::<_, MonthsBreakdown>(
            "SELECT months, COUNT(*) AS count FROM revenue_records GROUP BY months ORDER BY months",
        )
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Write or overwrite the snapshot for (`year`, `month`)
    #[instrument(skip(self), err)]
    pub async fn upsert_monthly(&mut self, year: i32, month: u32, member_count: i64, revenue: i64) -> Result<MonthlyRevenueDBResponse> {
        let snapshot = sqlx::query_as::<_, MonthlyRevenueDBResponse>(
            r#"
            INSERT INTO monthly_revenue (year, month, member_count, revenue)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (year, month) DO UPDATE SET
                member_count = EXCLUDED.member_count,
                revenue = EXCLUDED.revenue,
                recorded_at = NOW()
            RETURNING *
            "#,
        )
        .bind(year)
        .bind(month as i32)
        .bind(member_count as i32)
        .bind(revenue)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(snapshot)
    }

    /// Snapshots, newest period first
    #[instrument(skip(self), err)]
    pub async fn list_monthly(&mut self) -> Result<Vec<MonthlyRevenueDBResponse>> {
        let rows = sqlx::query_as::<_, MonthlyRevenueDBResponse>("SELECT * FROM monthly_revenue ORDER BY year DESC, month DESC")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }
}
