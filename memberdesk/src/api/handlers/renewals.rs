use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;

use crate::{
    AppState,
    api::models::members::{MemberDetailResponse, RenewalApprovalResponse, SearchQuery},
    auth::AdminSession,
    billing::today_in_offset,
    db::{
        handlers::{Members, Revenue},
        models::revenue::RevenueRecordCreateDBRequest,
    },
    errors::{Error, Result},
    types::{MemberId, abbrev_uuid},
};

/// Members who asked to renew
#[utoipa::path(
    get,
    path = "/renewals",
    tag = "renewals",
    summary = "List renewal requests",
    params(SearchQuery),
    responses(
        (status = 200, description = "Renewal requests, soonest due first", body = Vec<MemberDetailResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_renewals(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    _: AdminSession,
) -> Result<Json<Vec<MemberDetailResponse>>> {
    let search = query.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let members = Members::new(&mut conn).list_renewal_requests(search.as_deref()).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Approve a renewal: extend the paid period and record the payment
#[utoipa::path(
    post,
    path = "/renewals/{member_id}/approve",
    tag = "renewals",
    summary = "Approve renewal",
    params(("member_id" = uuid::Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Renewal approved", body = RenewalApprovalResponse),
        (status = 404, description = "Member not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn approve_renewal(
    State(state): State<AppState>,
    Path(member_id): Path<MemberId>,
    _: AdminSession,
) -> Result<Json<RenewalApprovalResponse>> {
    let today = today_in_offset(state.config.billing.utc_offset_hours);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let approval = Members::new(&mut tx).approve_renewal(member_id, today).await?;
    let record = Revenue::new(&mut tx)
        .record(&RevenueRecordCreateDBRequest::payment(
            member_id,
            approval.months,
            state.config.billing.price_per_member_month,
            format!("Renewal ({} months)", approval.months),
        ))
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(
        member_id = %abbrev_uuid(&member_id),
        months = approval.months,
        payment_date = %approval.member.payment_date,
        "Renewal approved"
    );

    Ok(Json(RenewalApprovalResponse {
        member: approval.member.into(),
        months: approval.months,
        amount: record.amount,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::members::{MemberDetailResponse, RenewalApprovalResponse};
    use crate::db::models::members::DepositStatus;
    use crate::test_utils::{
        admin_auth_header, create_test_app, create_test_apple_account, create_test_member_with, create_test_youtube_account,
    };
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_approve_extends_and_clears_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let member = create_test_member_with(&pool, slot.id, "renew@example.com", date, DepositStatus::Completed).await;
        let (name, value) = admin_auth_header();

        app.put("/api/members/renewal")
            .json(&json!({ "email": "renew@example.com", "will_renew": true, "renew_months": 3 }))
            .await
            .assert_status_ok();

        let pending: Vec<MemberDetailResponse> = app.get("/api/renewals").add_header(name.clone(), value.clone()).await.json();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].member.id, member.id);

        let response = app
            .post(&format!("/api/renewals/{}/approve", member.id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let approval: RenewalApprovalResponse = response.json();
        assert_eq!(approval.months, 3);
        assert_eq!(approval.amount, 12_000);
        assert_eq!(approval.member.payment_date, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
        assert!(!approval.member.will_renew);
        assert_eq!(approval.member.renew_months, None);

        let pending: Vec<MemberDetailResponse> = app.get("/api/renewals").add_header(name, value).await.json();
        assert!(pending.is_empty());
    }

    #[sqlx::test]
    async fn test_approve_unknown_member(pool: PgPool) {
        let app = create_test_app(pool).await;
        let (name, value) = admin_auth_header();

        app.post(&format!("/api/renewals/{}/approve", uuid::Uuid::new_v4()))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
