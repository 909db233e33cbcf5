//! Admin dashboard figures and the manually triggered renewal sweep.

use axum::{Json, extract::State};
use chrono::NaiveDate;
use tracing::info;

use crate::{
    AppState,
    api::models::{
        admin::{DashboardStats, MonthlyRevenueResponse, RequestStats, RevenueRecordsResponse},
        members::MonthlyUpdateResponse,
    },
    auth::AdminSession,
    billing::today_in_offset,
    db::{
        handlers::{MemberRequests, Members, Revenue, YoutubeAccounts},
        models::members::RenewalSweepEntry,
    },
    errors::{Error, Result},
};

/// Preview which members the renewal sweep would move to the current month
#[utoipa::path(
    get,
    path = "/admin/monthly-update",
    tag = "admin",
    summary = "Preview renewal sweep",
    responses(
        (status = 200, description = "Members that are due", body = MonthlyUpdateResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn preview_monthly_update(State(state): State<AppState>, _: AdminSession) -> Result<Json<MonthlyUpdateResponse>> {
    let today = today_in_offset(state.config.billing.utc_offset_hours);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let candidates = Members::new(&mut conn).renewal_candidates(today).await?;

    Ok(Json(MonthlyUpdateResponse::new(today, false, candidates)))
}

/// Run the renewal sweep now
#[utoipa::path(
    post,
    path = "/admin/monthly-update",
    tag = "admin",
    summary = "Run renewal sweep",
    responses(
        (status = 200, description = "Members moved to the current month", body = MonthlyUpdateResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn run_monthly_update(State(state): State<AppState>, _: AdminSession) -> Result<Json<MonthlyUpdateResponse>> {
    let today = today_in_offset(state.config.billing.utc_offset_hours);
    let entries = sweep(&state, today).await?;
    info!(%today, updated = entries.len(), "Renewal sweep run by admin");
    Ok(Json(MonthlyUpdateResponse::new(today, true, entries)))
}

/// Apply the sweep for `today` in one transaction
pub(crate) async fn sweep(state: &AppState, today: NaiveDate) -> Result<Vec<RenewalSweepEntry>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let entries = Members::new(&mut tx).renewal_sweep(today).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(entries)
}

/// Headline figures for the dashboard
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    summary = "Dashboard statistics",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_stats(State(state): State<AppState>, _: AdminSession) -> Result<Json<DashboardStats>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let total_members = Members::new(&mut conn).count().await?;
    let total_youtube_accounts = YoutubeAccounts::new(&mut conn).count().await?;
    let cumulative_revenue = Revenue::new(&mut conn).total().await?;

    Ok(Json(DashboardStats::new(
        total_members,
        total_youtube_accounts,
        cumulative_revenue,
        state.config.billing.price_per_member_month,
        state.config.billing.account_monthly_cost,
    )))
}

/// Application counts by status
#[utoipa::path(
    get,
    path = "/admin/request-stats",
    tag = "admin",
    summary = "Application statistics",
    responses(
        (status = 200, description = "Counts by status", body = RequestStats),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_request_stats(State(state): State<AppState>, _: AdminSession) -> Result<Json<RequestStats>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let counts = MemberRequests::new(&mut conn).status_counts().await?;
    Ok(Json(counts.into()))
}

/// The revenue ledger
#[utoipa::path(
    get,
    path = "/admin/revenue-records",
    tag = "admin",
    summary = "Revenue ledger",
    responses(
        (status = 200, description = "Ledger entries with totals", body = RevenueRecordsResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_revenue_records(State(state): State<AppState>, _: AdminSession) -> Result<Json<RevenueRecordsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Revenue::new(&mut conn);

    let records = repo.list_records().await?;
    let total_revenue = repo.total().await?;
    let months_breakdown = repo.months_breakdown().await?;

    Ok(Json(RevenueRecordsResponse {
        records: records.into_iter().map(Into::into).collect(),
        total_revenue,
        months_breakdown: months_breakdown.into_iter().map(Into::into).collect(),
    }))
}

/// Stored month-end snapshots
#[utoipa::path(
    get,
    path = "/admin/monthly-revenue",
    tag = "admin",
    summary = "Monthly revenue snapshots",
    responses(
        (status = 200, description = "Snapshots, newest first", body = Vec<MonthlyRevenueResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_monthly_revenue(State(state): State<AppState>, _: AdminSession) -> Result<Json<Vec<MonthlyRevenueResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let snapshots = Revenue::new(&mut conn).list_monthly().await?;
    Ok(Json(snapshots.into_iter().map(Into::into).collect()))
}
