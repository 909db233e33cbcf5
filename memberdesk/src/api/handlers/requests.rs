use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        requests::{
            ListRequestsQuery, MemberRequestCreate, MemberRequestResponse, MemberRequestUpdate, RegisterRequest, RegisterResponse,
            RequestStatusUpdate,
        },
    },
    auth::AdminSession,
    billing::{add_months, date_in_offset},
    db::{
        handlers::{MemberRequests, Members, Repository, Revenue, YoutubeAccounts, member_requests::MemberRequestFilter},
        models::{
            member_requests::{AccountType, MemberRequestCreateDBRequest, MemberRequestUpdateDBRequest, RequestStatus},
            members::{DepositStatus, MemberCreateDBRequest},
            revenue::RevenueRecordCreateDBRequest,
        },
    },
    errors::{Error, Result},
    types::{RequestId, abbrev_uuid},
};

/// Nickname given to members registered from an application, until the admin sets one
const PENDING_NICKNAME: &str = "pending";

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn already_registered() -> Error {
    Error::Conflict {
        message: "This application has already been registered".to_string(),
    }
}

/// Submit a membership application
#[utoipa::path(
    post,
    path = "/requests",
    request_body = MemberRequestCreate,
    tag = "requests",
    summary = "Apply for a family slot",
    responses(
        (status = 201, description = "Application received", body = MemberRequestResponse),
        (status = 400, description = "Invalid input or email already applied"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(create): Json<MemberRequestCreate>,
) -> Result<(StatusCode, Json<MemberRequestResponse>)> {
    create.validate()?;

    let email = create.email;
    let kakao_id = non_empty(create.kakao_id);
    let phone = non_empty(create.phone);

    if email.is_none() && create.account_type != AccountType::Admin {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }
    if kakao_id.is_none() && phone.is_none() {
        return Err(Error::BadRequest {
            message: "Either a Kakao ID or a phone number is required".to_string(),
        });
    }
    if create.months.is_some_and(|m| m < 1) {
        return Err(Error::BadRequest {
            message: "Months must be at least 1".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = MemberRequests::new(&mut conn);

    if let Some(email) = &email {
        if repo.email_exists(email).await? {
            return Err(Error::BadRequest {
                message: "This email has already applied".to_string(),
            });
        }
    }

    let request = repo
        .create(&MemberRequestCreateDBRequest {
            email,
            kakao_id,
            phone,
            referral_email: non_empty(create.referral_email),
            months: create.months,
            depositor_name: non_empty(create.depositor_name),
            plan_type: create.plan_type,
            account_type: create.account_type,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent application for the same email
            e if e.is_unique_violation_on("member_requests_email_unique") => Error::BadRequest {
                message: "This email has already applied".to_string(),
            },
            e => Error::Database(e),
        })?;

    info!(request_id = %abbrev_uuid(&request.id), "New membership application");

    if let Some(email) = state.email.new_request_notification(&request) {
        state.email.spawn_send(vec![email]);
    }

    Ok((StatusCode::CREATED, Json(request.into())))
}

/// List applications
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    summary = "List applications",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Paginated applications, newest first", body = PaginatedResponse<MemberRequestResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
    _: AdminSession,
) -> Result<Json<PaginatedResponse<MemberRequestResponse>>> {
    let page = query.pagination.params();
    let filter = MemberRequestFilter::new(page.0, page.1).with_status(query.status);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = MemberRequests::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let requests = repo.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        requests.into_iter().map(Into::into).collect(),
        total_count,
        page,
    )))
}

/// Approve or reject an application
#[utoipa::path(
    patch,
    path = "/requests/{id}/status",
    request_body = RequestStatusUpdate,
    tag = "requests",
    summary = "Approve or reject",
    params(("id" = uuid::Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Status updated", body = MemberRequestResponse),
        (status = 400, description = "Status must be approved or rejected"),
        (status = 404, description = "Application not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    _: AdminSession,
    Json(update): Json<RequestStatusUpdate>,
) -> Result<Json<MemberRequestResponse>> {
    if update.status == RequestStatus::Pending {
        return Err(Error::BadRequest {
            message: "Status must be approved or rejected".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let request = MemberRequests::new(&mut conn).set_status(id, update.status).await?;

    Ok(Json(request.into()))
}

/// Edit an application's payment details
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    request_body = MemberRequestUpdate,
    tag = "requests",
    summary = "Edit application",
    params(("id" = uuid::Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application updated", body = MemberRequestResponse),
        (status = 404, description = "Application not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    _: AdminSession,
    Json(update): Json<MemberRequestUpdate>,
) -> Result<Json<MemberRequestResponse>> {
    if update.months.is_some_and(|m| m < 1) {
        return Err(Error::BadRequest {
            message: "Months must be at least 1".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let request = MemberRequests::new(&mut conn)
        .update(
            id,
            &MemberRequestUpdateDBRequest {
                months: update.months,
                depositor_name: update.depositor_name,
                status: None,
            },
        )
        .await?;

    Ok(Json(request.into()))
}

/// Delete an application
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    summary = "Delete application",
    params(("id" = uuid::Uuid, Path, description = "Application ID")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_request(State(state): State<AppState>, Path(id): Path<RequestId>, _: AdminSession) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if MemberRequests::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Request".to_string(),
            id: id.to_string(),
        })
    }
}

/// Register an approved applicant as a member of a family slot.
///
/// The member's paid period starts on the application date and runs for the months applied for.
/// The member row and its ledger entry are written in one transaction.
#[utoipa::path(
    post,
    path = "/requests/{id}/register",
    request_body = RegisterRequest,
    tag = "requests",
    summary = "Register approved applicant",
    params(("id" = uuid::Uuid, Path, description = "Application ID")),
    responses(
        (status = 201, description = "Member created", body = RegisterResponse),
        (status = 400, description = "Application is not approved"),
        (status = 404, description = "Application or YouTube account not found"),
        (status = 409, description = "Application already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn register_request(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    _: AdminSession,
    Json(register): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let request = MemberRequests::new(&mut tx).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Request".to_string(),
        id: id.to_string(),
    })?;

    if request.status != RequestStatus::Approved {
        return Err(Error::BadRequest {
            message: "Only approved requests can be registered".to_string(),
        });
    }
    if request.is_registered {
        return Err(already_registered());
    }

    YoutubeAccounts::new(&mut tx)
        .get_by_id(register.youtube_account_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "YouTube account".to_string(),
            id: register.youtube_account_id.to_string(),
        })?;

    let months = request.months.unwrap_or(1).max(1);
    let last_payment_date = date_in_offset(request.created_at, state.config.billing.utc_offset_hours);
    let payment_date = add_months(last_payment_date, months);

    let member = Members::new(&mut tx)
        .create(&MemberCreateDBRequest {
            youtube_account_id: register.youtube_account_id,
            request_id: Some(request.id),
            nickname: PENDING_NICKNAME.to_string(),
            email: request.email.clone(),
            name: request.depositor_name.clone().unwrap_or_else(|| "unknown".to_string()),
            last_payment_date: Some(last_payment_date),
            payment_date,
            deposit_status: DepositStatus::Completed,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration of the same application
            e if e.is_unique_violation_on("members_request_id_unique") => already_registered(),
            e => Error::Database(e),
        })?;

    let record = Revenue::new(&mut tx)
        .record(&RevenueRecordCreateDBRequest::payment(
            member.id,
            months,
            state.config.billing.price_per_member_month,
            format!("New member registration ({months} months)"),
        ))
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(
        request_id = %abbrev_uuid(&request.id),
        member_id = %abbrev_uuid(&member.id),
        months,
        "Registered member from application"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            member_id: member.id,
            last_payment_date,
            payment_date,
            amount: record.amount,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        pagination::PaginatedResponse,
        requests::{MemberRequestResponse, RegisterResponse},
    };
    use crate::db::handlers::{Members, Repository, Revenue, members::MemberFilter};
    use crate::db::models::member_requests::RequestStatus;
    use crate::test_utils::{admin_auth_header, create_test_app, create_test_apple_account, create_test_youtube_account};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    async fn apply(app: &TestServer, email: &str) -> MemberRequestResponse {
        let response = app
            .post("/api/requests")
            .json(&json!({ "email": email, "kakao_id": "kakao123", "months": 3, "depositor_name": "Kim" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_rejected(pool: PgPool) {
        let app = create_test_app(pool).await;
        apply(&app, "dup@example.com").await;

        let response = app
            .post("/api/requests")
            .json(&json!({ "email": "dup@example.com", "phone": "010-0000-0000" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("already applied"));
    }

    #[sqlx::test]
    async fn test_validation(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/requests")
            .json(&json!({ "email": "not-an-email", "kakao_id": "k" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["error"], "Invalid email address");

        let padded: MemberRequestResponse = app
            .post("/api/requests")
            .json(&json!({ "email": "  padded@example.com ", "kakao_id": "k" }))
            .await
            .json();
        assert_eq!(padded.email, "padded@example.com");

        app.post("/api/requests")
            .json(&json!({ "email": "ok@example.com" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.post("/api/requests")
            .json(&json!({ "kakao_id": "k" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_admin_application_without_email(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/requests")
            .json(&json!({ "phone": "010-1111-2222", "account_type": "admin" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let request: MemberRequestResponse = response.json();
        assert_eq!(request.email, format!("admin_account_{}@placeholder.local", request.id));
    }

    #[sqlx::test]
    async fn test_listing_requires_admin(pool: PgPool) {
        let app = create_test_app(pool).await;
        apply(&app, "a@example.com").await;

        app.get("/api/requests").await.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = admin_auth_header();
        let response = app.get("/api/requests?status=pending&limit=5").add_header(name, value).await;
        response.assert_status_ok();
        let page: PaginatedResponse<MemberRequestResponse> = response.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.limit, 5);
        assert!(!page.data[0].is_registered);
    }

    #[sqlx::test]
    async fn test_status_update_rejects_pending(pool: PgPool) {
        let app = create_test_app(pool).await;
        let request = apply(&app, "a@example.com").await;
        let (name, value) = admin_auth_header();

        app.patch(&format!("/api/requests/{}/status", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "pending" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.patch(&format!("/api/requests/{}/status", uuid::Uuid::new_v4()))
            .add_header(name, value)
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_approve_then_register_creates_one_member(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let request = apply(&app, "new@example.com").await;
        let (name, value) = admin_auth_header();

        // Not approved yet
        app.post(&format!("/api/requests/{}/register", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "youtube_account_id": slot.id }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let approved: MemberRequestResponse = app
            .patch(&format!("/api/requests/{}/status", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "approved" }))
            .await
            .json();
        assert_eq!(approved.status, RequestStatus::Approved);

        // Unknown slot
        app.post(&format!("/api/requests/{}/register", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "youtube_account_id": uuid::Uuid::new_v4() }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = app
            .post(&format!("/api/requests/{}/register", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "youtube_account_id": slot.id }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let registered: RegisterResponse = response.json();
        assert_eq!(registered.amount, 12_000);
        assert_eq!(registered.payment_date, crate::billing::add_months(registered.last_payment_date, 3));

        let mut conn = pool.acquire().await.unwrap();
        let members = Members::new(&mut conn)
            .list(&MemberFilter {
                youtube_account_id: Some(slot.id),
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].request_id, Some(request.id));
        assert_eq!(members[0].name, "Kim");
        assert_eq!(Revenue::new(&mut conn).total().await.unwrap(), 12_000);

        let page: PaginatedResponse<MemberRequestResponse> = app.get("/api/requests").add_header(name, value).await.json();
        assert!(page.data[0].is_registered);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_registering_twice_is_a_conflict(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        let request = apply(&app, "twice@example.com").await;
        let (name, value) = admin_auth_header();

        app.patch(&format!("/api/requests/{}/status", request.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status_ok();

        let register = || {
            app.post(&format!("/api/requests/{}/register", request.id))
                .add_header(name.clone(), value.clone())
                .json(&json!({ "youtube_account_id": slot.id }))
        };
        register().await.assert_status(StatusCode::CREATED);
        register().await.assert_status(StatusCode::CONFLICT);

        let mut conn = pool.acquire().await.unwrap();
        let members = Members::new(&mut conn)
            .list(&MemberFilter {
                youtube_account_id: Some(slot.id),
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(Revenue::new(&mut conn).total().await.unwrap(), 12_000);
    }

    #[sqlx::test]
    async fn test_delete_request(pool: PgPool) {
        let app = create_test_app(pool).await;
        let request = apply(&app, "a@example.com").await;
        let (name, value) = admin_auth_header();

        app.delete(&format!("/api/requests/{}", request.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.delete(&format!("/api/requests/{}", request.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
