use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    AppState,
    api::models::members::{
        BulkDepositStatusUpdate, DepositStatusUpdate, ExpiryQuery, ExpiryResponse, ListMembersQuery, MemberCreate, MemberDetailResponse,
        MemberResponse, MemberUpdate, RenewalPreferencesResponse, RenewalPreferencesUpdate, SearchQuery, VerifyMemberRequest,
        VerifyMemberResponse,
    },
    auth::AdminSession,
    db::{
        handlers::{Members, Repository, Revenue, YoutubeAccounts, members::MemberFilter},
        models::{
            members::{MemberCreateDBRequest, MemberUpdateDBRequest, RenewalPreferencesDBRequest},
            revenue::RevenueRecordCreateDBRequest,
        },
    },
    errors::{Error, Result},
    types::{MemberId, abbrev_uuid},
};

fn validate_member(member: &MemberCreate) -> Result<()> {
    if member.name.trim().is_empty() || member.nickname.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Name and nickname are required".to_string(),
        });
    }
    member.validate()?;
    Ok(())
}

fn search_term(search: Option<String>) -> Option<String> {
    search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// List members, optionally of one family slot
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    summary = "List members",
    params(ListMembersQuery),
    responses(
        (status = 200, description = "Members", body = Vec<MemberResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListMembersQuery>,
    _: AdminSession,
) -> Result<Json<Vec<MemberResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let members = Members::new(&mut conn)
        .list(&MemberFilter {
            youtube_account_id: query.youtube_account_id,
        })
        .await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// List every member with the accounts their slot belongs to
#[utoipa::path(
    get,
    path = "/members/all",
    tag = "members",
    summary = "List members with account details",
    params(SearchQuery),
    responses(
        (status = 200, description = "Members with YouTube and Apple emails", body = Vec<MemberDetailResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_all_members(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    _: AdminSession,
) -> Result<Json<Vec<MemberDetailResponse>>> {
    let search = search_term(query.search);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let members = Members::new(&mut conn).list_with_details(search.as_deref()).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Add a member to a family slot
#[utoipa::path(
    post,
    path = "/members",
    request_body = MemberCreate,
    tag = "members",
    summary = "Create member",
    responses(
        (status = 201, description = "Member created", body = MemberResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "YouTube account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_member(
    State(state): State<AppState>,
    _: AdminSession,
    Json(create): Json<MemberCreate>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    validate_member(&create)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    YoutubeAccounts::new(&mut conn)
        .get_by_id(create.youtube_account_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "YouTube account".to_string(),
            id: create.youtube_account_id.to_string(),
        })?;

    let member = Members::new(&mut conn)
        .create(&MemberCreateDBRequest {
            youtube_account_id: create.youtube_account_id,
            request_id: None,
            nickname: create.nickname.trim().to_string(),
            email: create.email.trim().to_string(),
            name: create.name.trim().to_string(),
            last_payment_date: create.last_payment_date,
            payment_date: create.payment_date,
            deposit_status: create.deposit_status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Replace a member's details
#[utoipa::path(
    put,
    path = "/members/{id}",
    request_body = MemberUpdate,
    tag = "members",
    summary = "Update member",
    params(("id" = uuid::Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member updated", body = MemberResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Member not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<MemberId>,
    _: AdminSession,
    Json(update): Json<MemberUpdate>,
) -> Result<Json<MemberResponse>> {
    validate_member(&update)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let member = Members::new(&mut conn)
        .update(
            id,
            &MemberUpdateDBRequest {
                youtube_account_id: update.youtube_account_id,
                nickname: update.nickname.trim().to_string(),
                email: update.email.trim().to_string(),
                name: update.name.trim().to_string(),
                last_payment_date: update.last_payment_date,
                payment_date: update.payment_date,
                deposit_status: update.deposit_status,
            },
        )
        .await?;

    Ok(Json(member.into()))
}

#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    summary = "Delete member",
    params(("id" = uuid::Uuid, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<MemberId>, _: AdminSession) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Members::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Member".to_string(),
            id: id.to_string(),
        })
    }
}

/// Set a member's deposit status.
///
/// Moving into `completed` counts as one month paid and is written to the revenue ledger in the
/// same transaction.
#[utoipa::path(
    patch,
    path = "/members/{id}/deposit-status",
    request_body = DepositStatusUpdate,
    tag = "members",
    summary = "Update deposit status",
    params(("id" = uuid::Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Deposit status updated", body = MemberResponse),
        (status = 404, description = "Member not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_deposit_status(
    State(state): State<AppState>,
    Path(id): Path<MemberId>,
    _: AdminSession,
    Json(update): Json<DepositStatusUpdate>,
) -> Result<Json<MemberResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let change = Members::new(&mut tx).set_deposit_status(id, update.status).await?;

    if change.completed_payment() {
        Revenue::new(&mut tx)
            .record(&RevenueRecordCreateDBRequest::payment(
                id,
                1,
                state.config.billing.price_per_member_month,
                "Deposit completed",
            ))
            .await?;
        info!(member_id = %abbrev_uuid(&id), "Deposit completed, revenue recorded");
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(change.member.into()))
}

/// Set the deposit status of several members at once.
///
/// Each member that moves into `completed` gets the same one-month ledger row as the single
/// update.
#[utoipa::path(
    post,
    path = "/members/bulk-deposit-status",
    request_body = BulkDepositStatusUpdate,
    tag = "members",
    summary = "Bulk update deposit status",
    responses(
        (status = 200, description = "Updated members", body = Vec<MemberResponse>),
        (status = 400, description = "No member IDs given"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_update_deposit_status(
    State(state): State<AppState>,
    _: AdminSession,
    Json(update): Json<BulkDepositStatusUpdate>,
) -> Result<Json<Vec<MemberResponse>>> {
    if update.member_ids.is_empty() {
        return Err(Error::BadRequest {
            message: "member_ids must not be empty".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let changes = Members::new(&mut tx).bulk_set_deposit_status(&update.member_ids, update.status).await?;

    let mut completed = 0;
    for change in changes.iter().filter(|c| c.completed_payment()) {
        Revenue::new(&mut tx)
            .record(&RevenueRecordCreateDBRequest::payment(
                change.member.id,
                1,
                state.config.billing.price_per_member_month,
                "Deposit completed",
            ))
            .await?;
        completed += 1;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    debug!(
        requested = update.member_ids.len(),
        updated = changes.len(),
        completed,
        "Bulk deposit status update"
    );
    Ok(Json(changes.into_iter().map(|c| c.member.into()).collect()))
}

/// Look up a membership's expiry date
#[utoipa::path(
    get,
    path = "/members/expiry",
    tag = "members",
    summary = "Check expiry",
    params(ExpiryQuery),
    responses(
        (status = 200, description = "Membership found", body = ExpiryResponse),
        (status = 404, description = "No membership for this email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_expiry(State(state): State<AppState>, Query(query): Query<ExpiryQuery>) -> Result<Json<ExpiryResponse>> {
    let email = query.email.trim();
    if email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let member = Members::new(&mut conn).find_for_expiry(email).await?.ok_or_else(|| Error::NotFound {
        resource: "Member".to_string(),
        id: email.to_string(),
    })?;

    Ok(Json(member.into()))
}

/// Record whether a customer wants to renew
#[utoipa::path(
    put,
    path = "/members/renewal",
    request_body = RenewalPreferencesUpdate,
    tag = "members",
    summary = "Set renewal preferences",
    responses(
        (status = 200, description = "Preferences saved", body = RenewalPreferencesResponse),
        (status = 400, description = "renew_months missing or invalid"),
        (status = 404, description = "No membership for this email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_renewal_preferences(
    State(state): State<AppState>,
    Json(update): Json<RenewalPreferencesUpdate>,
) -> Result<Json<RenewalPreferencesResponse>> {
    let email = update.email.trim();
    if email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }
    if update.will_renew && !update.renew_months.is_some_and(|m| m >= 1) {
        return Err(Error::BadRequest {
            message: "renew_months of at least 1 is required to renew".to_string(),
        });
    }

    let prefs = RenewalPreferencesDBRequest {
        will_renew: update.will_renew,
        renew_months: update.renew_months.filter(|_| update.will_renew),
        is_auto_payment: update.is_auto_payment && update.will_renew,
        renewal_message: update.renewal_message.filter(|_| update.will_renew),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let members = Members::new(&mut conn).update_renewal_preferences(email, &prefs).await?;

    if members.is_empty() {
        return Err(Error::NotFound {
            resource: "Member".to_string(),
            id: email.to_string(),
        });
    }

    Ok(Json(RenewalPreferencesResponse {
        updated_count: members.len(),
        members: members.into_iter().map(Into::into).collect(),
    }))
}

/// Check whether an email belongs to a member
#[utoipa::path(
    post,
    path = "/members/verify",
    request_body = VerifyMemberRequest,
    tag = "members",
    summary = "Verify membership",
    responses(
        (status = 200, description = "Verification result", body = VerifyMemberResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn verify_member(State(state): State<AppState>, Json(request): Json<VerifyMemberRequest>) -> Result<Json<VerifyMemberResponse>> {
    let email = request.email.trim();
    if email.is_empty() {
        return Ok(Json(VerifyMemberResponse { valid: false }));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let valid = Members::new(&mut conn).email_is_member(email).await?;
    Ok(Json(VerifyMemberResponse { valid }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::members::{ExpiryResponse, MemberDetailResponse, MemberResponse, RenewalPreferencesResponse, VerifyMemberResponse};
    use crate::db::handlers::{Members, Repository, Revenue};
    use crate::db::models::members::DepositStatus;
    use crate::test_utils::{
        admin_auth_header, create_test_app, create_test_apple_account, create_test_member, create_test_member_with,
        create_test_youtube_account,
    };
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_list_with_details(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let (name, value) = admin_auth_header();

        let response = app
            .post("/api/members")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "youtube_account_id": slot.id,
                "nickname": "kim",
                "email": "kim@example.com",
                "name": "Kim Minsu",
                "payment_date": "2025-03-31",
                "deposit_status": "pending"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let details: Vec<MemberDetailResponse> = app
            .get("/api/members/all?search=MINSU")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].youtube_email, "family@gmail.com");
        assert_eq!(details[0].apple_email, "owner@icloud.com");

        let none: Vec<MemberDetailResponse> = app.get("/api/members/all?search=lee").add_header(name, value).await.json();
        assert!(none.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_completing_deposit_records_one_month(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let member = create_test_member_with(&pool, slot.id, "m@example.com", date, DepositStatus::Pending).await;
        let (name, value) = admin_auth_header();

        for _ in 0..2 {
            let updated: MemberResponse = app
                .patch(&format!("/api/members/{}/deposit-status", member.id))
                .add_header(name.clone(), value.clone())
                .json(&json!({ "status": "completed" }))
                .await
                .json();
            assert_eq!(updated.deposit_status, DepositStatus::Completed);
        }

        // The second call was not a transition
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(Revenue::new(&mut conn).total().await.unwrap(), 4_000);

        app.patch(&format!("/api/members/{}/deposit-status", uuid::Uuid::new_v4()))
            .add_header(name, value)
            .json(&json!({ "status": "completed" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_bulk_deposit_status(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let a = create_test_member(&pool, slot.id, "a@example.com").await;
        let b = create_test_member(&pool, slot.id, "b@example.com").await;
        let (name, value) = admin_auth_header();

        let updated: Vec<MemberResponse> = app
            .post("/api/members/bulk-deposit-status")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "member_ids": [a.id, b.id], "status": "failed" }))
            .await
            .json();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|m| m.deposit_status == DepositStatus::Failed));

        app.post("/api/members/bulk-deposit-status")
            .add_header(name, value)
            .json(&json!({ "member_ids": [], "status": "failed" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_completion_records_revenue(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let pending = create_test_member_with(&pool, slot.id, "p@example.com", date, DepositStatus::Pending).await;
        let failed = create_test_member_with(&pool, slot.id, "f@example.com", date, DepositStatus::Failed).await;
        let paid = create_test_member_with(&pool, slot.id, "c@example.com", date, DepositStatus::Completed).await;
        let (name, value) = admin_auth_header();

        for _ in 0..2 {
            let updated: Vec<MemberResponse> = app
                .post("/api/members/bulk-deposit-status")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "member_ids": [pending.id, failed.id, paid.id], "status": "completed" }))
                .await
                .json();
            assert_eq!(updated.len(), 3);
        }

        // Two transitions on the first call, none on the repeat
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(Revenue::new(&mut conn).total().await.unwrap(), 8_000);
    }

    #[sqlx::test]
    async fn test_opting_out_clears_renewal_details(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let member = create_test_member(&pool, slot.id, "leaving@gmail.com").await;

        app.put("/api/members/renewal")
            .json(&json!({ "email": "leaving@gmail.com", "will_renew": true, "renew_months": 3, "is_auto_payment": true, "renewal_message": "see you" }))
            .await
            .assert_status_ok();

        let saved: RenewalPreferencesResponse = app
            .put("/api/members/renewal")
            .json(&json!({ "email": "leaving@gmail.com", "will_renew": false, "is_auto_payment": true, "renewal_message": "bye" }))
            .await
            .json();
        assert!(!saved.members[0].will_renew);
        assert!(!saved.members[0].is_auto_payment);
        assert_eq!(saved.members[0].renew_months, None);

        let mut conn = pool.acquire().await.unwrap();
        let stored = Members::new(&mut conn).get_by_id(member.id).await.unwrap().unwrap();
        assert_eq!(stored.renewal_message, None);
        assert!(!stored.is_auto_payment);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_expiry_and_renewal_flow(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        create_test_member_with(&pool, slot.id, "customer@gmail.com", date, DepositStatus::Completed).await;

        let expiry: ExpiryResponse = app.get("/api/members/expiry?email=customer").await.json();
        assert_eq!(expiry.expiry_date, date);
        assert!(!expiry.will_renew);

        app.get("/api/members/expiry?email=nobody@gmail.com")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.put("/api/members/renewal")
            .json(&json!({ "email": "customer@gmail.com", "will_renew": true }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let saved: RenewalPreferencesResponse = app
            .put("/api/members/renewal")
            .json(&json!({ "email": "customer@gmail.com", "will_renew": true, "renew_months": 6, "renewal_message": "thanks" }))
            .await
            .json();
        assert_eq!(saved.updated_count, 1);
        assert_eq!(saved.members[0].renew_months, Some(6));

        app.put("/api/members/renewal")
            .json(&json!({ "email": "nobody@gmail.com", "will_renew": false }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_verify_is_case_and_space_insensitive(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        create_test_member(&pool, slot.id, "member@example.com").await;

        let found: VerifyMemberResponse = app
            .post("/api/members/verify")
            .json(&json!({ "email": "  Member@Example.com " }))
            .await
            .json();
        assert!(found.valid);

        let missing: VerifyMemberResponse = app
            .post("/api/members/verify")
            .json(&json!({ "email": "stranger@example.com" }))
            .await
            .json();
        assert!(!missing.valid);
    }
}
