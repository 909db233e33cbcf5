//! Maintenance endpoints pinged by an external scheduler.
//!
//! Each route accepts GET or POST and requires `Authorization: Bearer <cron_secret>`. A ping runs
//! one unit of work and returns what it changed; running it twice is harmless.

use axum::{Json, extract::State};
use tracing::info;

use crate::{
    AppState,
    api::{
        handlers::admin::sweep,
        models::{
            cron::{ExpiredMembersResponse, MonthlyRevenueRecorded},
            members::MonthlyUpdateResponse,
        },
    },
    auth::CronAuth,
    billing::{first_of_month, previous_month, start_of_day_utc, today_in_offset},
    db::handlers::{Members, Revenue},
    errors::{Error, Result},
};

/// Reset members whose paid period has ended back to pending
#[utoipa::path(
    post,
    path = "/cron/update-expired-members",
    tag = "cron",
    summary = "Expire members",
    responses(
        (status = 200, description = "Members reset to pending", body = ExpiredMembersResponse),
        (status = 401, description = "Missing or wrong cron secret"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_expired_members(State(state): State<AppState>, _: CronAuth) -> Result<Json<ExpiredMembersResponse>> {
    let today = today_in_offset(state.config.billing.utc_offset_hours);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let expired = Members::new(&mut conn).expire_due(today).await?;

    Ok(Json(ExpiredMembersResponse {
        date: today,
        updated_count: expired.len(),
        updated_members: expired.into_iter().map(Into::into).collect(),
    }))
}

/// Snapshot last month's member count and revenue
#[utoipa::path(
    post,
    path = "/cron/record-monthly-revenue",
    tag = "cron",
    summary = "Record monthly revenue",
    responses(
        (status = 200, description = "Snapshot written", body = MonthlyRevenueRecorded),
        (status = 401, description = "Missing or wrong cron secret"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn record_monthly_revenue(State(state): State<AppState>, _: CronAuth) -> Result<Json<MonthlyRevenueRecorded>> {
    let offset = state.config.billing.utc_offset_hours;
    let today = today_in_offset(offset);
    let (year, month) = previous_month(today);

    // Members that existed by the end of last month, in local time
    let cutoff = start_of_day_utc(first_of_month(today), offset);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let member_count = Members::new(&mut conn).count_created_before(cutoff).await?;
    let revenue = member_count * state.config.billing.price_per_member_month;

    Revenue::new(&mut conn).upsert_monthly(year, month, member_count, revenue).await?;

    info!(year, month, member_count, revenue, "Monthly revenue recorded");
    Ok(Json(MonthlyRevenueRecorded {
        year,
        month,
        member_count,
        revenue,
    }))
}

/// Run the monthly renewal sweep
#[utoipa::path(
    post,
    path = "/cron/monthly-update",
    tag = "cron",
    summary = "Renewal sweep",
    responses(
        (status = 200, description = "Members moved to the current month", body = MonthlyUpdateResponse),
        (status = 401, description = "Missing or wrong cron secret"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn monthly_update(State(state): State<AppState>, _: CronAuth) -> Result<Json<MonthlyUpdateResponse>> {
    let today = today_in_offset(state.config.billing.utc_offset_hours);
    let entries = sweep(&state, today).await?;
    info!(%today, updated = entries.len(), "Renewal sweep run by cron");
    Ok(Json(MonthlyUpdateResponse::new(today, true, entries)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::admin::MonthlyRevenueResponse;
    use crate::api::models::cron::{ExpiredMembersResponse, MonthlyRevenueRecorded};
    use crate::api::models::members::MonthlyUpdateResponse;
    use crate::billing::{previous_month, today_in_offset};
    use crate::db::models::members::DepositStatus;
    use crate::test_utils::{
        admin_auth_header, create_test_app, create_test_apple_account, create_test_member, create_test_member_with,
        create_test_youtube_account, cron_auth_header,
    };
    use axum::http::StatusCode;
    use chrono::{Datelike, Months};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_cron_requires_secret(pool: PgPool) {
        let app = create_test_app(pool).await;
        let (admin_name, admin_value) = admin_auth_header();

        for path in [
            "/api/cron/update-expired-members",
            "/api/cron/record-monthly-revenue",
            "/api/cron/monthly-update",
        ] {
            app.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
            app.post(path)
                .add_header("authorization", "Bearer wrong-secret")
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
            // An admin session is not the cron secret
            app.post(path)
                .add_header(admin_name.clone(), admin_value.clone())
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_expire_resets_completed_members(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let today = today_in_offset(9);
        let expired = create_test_member_with(&pool, slot.id, "expired@example.com", today, DepositStatus::Completed).await;
        let future = today.checked_add_months(Months::new(1)).unwrap();
        create_test_member_with(&pool, slot.id, "future@example.com", future, DepositStatus::Completed).await;
        create_test_member_with(&pool, slot.id, "failed@example.com", today, DepositStatus::Failed).await;
        let (name, value) = cron_auth_header();

        let response: ExpiredMembersResponse = app
            .get("/api/cron/update-expired-members")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(response.date, today);
        assert_eq!(response.updated_count, 1);
        assert_eq!(response.updated_members[0].id, expired.id);

        let again: ExpiredMembersResponse = app.post("/api/cron/update-expired-members").add_header(name, value).await.json();
        assert_eq!(again.updated_count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_record_monthly_revenue_upserts(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        create_test_member(&pool, slot.id, "new@example.com").await;

        // Backdate one member so it existed last month
        let old = create_test_member(&pool, slot.id, "old@example.com").await;
        sqlx::query("UPDATE members SET created_at = created_at - INTERVAL '40 days' WHERE id = $1")
            .bind(old.id)
            .execute(&pool)
            .await
            .unwrap();

        let (name, value) = cron_auth_header();
        let (year, month) = previous_month(today_in_offset(9));

        let recorded: MonthlyRevenueRecorded = app
            .post("/api/cron/record-monthly-revenue")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!((recorded.year, recorded.month), (year, month));
        assert_eq!(recorded.member_count, 1);
        assert_eq!(recorded.revenue, 4_000);

        app.get("/api/cron/record-monthly-revenue")
            .add_header(name, value)
            .await
            .assert_status_ok();

        let (admin_name, admin_value) = admin_auth_header();
        let snapshots: Vec<MonthlyRevenueResponse> = app
            .get("/api/admin/monthly-revenue")
            .add_header(admin_name, admin_value)
            .await
            .json();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].member_count, 1);
    }

    #[sqlx::test]
    async fn test_cron_monthly_update_runs_sweep(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let today = today_in_offset(9);
        let last_month = today.with_day(1).unwrap().checked_sub_months(Months::new(1)).unwrap();
        create_test_member_with(&pool, slot.id, "due@example.com", last_month, DepositStatus::Pending).await;
        let (name, value) = cron_auth_header();

        let run: MonthlyUpdateResponse = app.post("/api/cron/monthly-update").add_header(name.clone(), value.clone()).await.json();
        assert!(run.applied);
        assert_eq!(run.count, 1);

        let again: MonthlyUpdateResponse = app.get("/api/cron/monthly-update").add_header(name, value).await.json();
        assert_eq!(again.count, 0);
    }
}
