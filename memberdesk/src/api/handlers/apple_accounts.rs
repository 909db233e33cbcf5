use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    AppState,
    api::models::accounts::{AppleAccountCreate, AppleAccountDeleteResponse, AppleAccountResponse, AppleAccountUpdate, CreditUpdate},
    auth::AdminSession,
    db::{
        handlers::{AppleAccounts, Repository, apple_accounts::AppleAccountFilter},
        models::apple_accounts::{AppleAccountCreateDBRequest, AppleAccountUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{AppleAccountId, abbrev_uuid},
};

fn not_found(id: AppleAccountId) -> Error {
    Error::NotFound {
        resource: "Apple account".to_string(),
        id: id.to_string(),
    }
}

/// List Apple accounts
#[utoipa::path(
    get,
    path = "/apple-accounts",
    tag = "accounts",
    summary = "List Apple accounts",
    responses(
        (status = 200, description = "Apple accounts, newest first", body = Vec<AppleAccountResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_apple_accounts(State(state): State<AppState>, _: AdminSession) -> Result<Json<Vec<AppleAccountResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let accounts = AppleAccounts::new(&mut conn).list(&AppleAccountFilter).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Create an Apple account
#[utoipa::path(
    post,
    path = "/apple-accounts",
    request_body = AppleAccountCreate,
    tag = "accounts",
    summary = "Create Apple account",
    responses(
        (status = 201, description = "Apple account created", body = AppleAccountResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already used"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_apple_account(
    State(state): State<AppState>,
    _: AdminSession,
    Json(create): Json<AppleAccountCreate>,
) -> Result<(StatusCode, Json<AppleAccountResponse>)> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = AppleAccounts::new(&mut conn)
        .create(&AppleAccountCreateDBRequest {
            apple_email: create.apple_email,
            remaining_credit: create.remaining_credit,
            memo: create.memo,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Replace an Apple account's details
#[utoipa::path(
    put,
    path = "/apple-accounts/{id}",
    request_body = AppleAccountUpdate,
    tag = "accounts",
    summary = "Update Apple account",
    params(("id" = uuid::Uuid, Path, description = "Apple account ID")),
    responses(
        (status = 200, description = "Apple account updated", body = AppleAccountResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Apple account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_apple_account(
    State(state): State<AppState>,
    Path(id): Path<AppleAccountId>,
    _: AdminSession,
    Json(update): Json<AppleAccountUpdate>,
) -> Result<Json<AppleAccountResponse>> {
    update.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = AppleAccounts::new(&mut conn)
        .update(
            id,
            &AppleAccountUpdateDBRequest {
                apple_email: update.apple_email,
                remaining_credit: update.remaining_credit,
                memo: update.memo,
            },
        )
        .await?;

    Ok(Json(account.into()))
}

/// Set the credit left on an Apple account
#[utoipa::path(
    patch,
    path = "/apple-accounts/{id}/credit",
    request_body = CreditUpdate,
    tag = "accounts",
    summary = "Update credit",
    params(("id" = uuid::Uuid, Path, description = "Apple account ID")),
    responses(
        (status = 200, description = "Credit updated", body = AppleAccountResponse),
        (status = 400, description = "Negative credit"),
        (status = 404, description = "Apple account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_credit(
    State(state): State<AppState>,
    Path(id): Path<AppleAccountId>,
    _: AdminSession,
    Json(update): Json<CreditUpdate>,
) -> Result<Json<AppleAccountResponse>> {
    update.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = AppleAccounts::new(&mut conn).set_credit(id, update.remaining_credit).await?;
    Ok(Json(account.into()))
}

/// Delete an Apple account with its YouTube accounts and their members
#[utoipa::path(
    delete,
    path = "/apple-accounts/{id}",
    tag = "accounts",
    summary = "Delete Apple account",
    params(("id" = uuid::Uuid, Path, description = "Apple account ID")),
    responses(
        (status = 200, description = "Apple account and dependents deleted", body = AppleAccountDeleteResponse),
        (status = 404, description = "Apple account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_apple_account(
    State(state): State<AppState>,
    Path(id): Path<AppleAccountId>,
    _: AdminSession,
) -> Result<Json<AppleAccountDeleteResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let deletion = AppleAccounts::new(&mut tx).delete_cascade(id).await?.ok_or_else(|| not_found(id))?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(
        apple_account_id = %abbrev_uuid(&id),
        youtube_accounts = deletion.youtube_accounts,
        members = deletion.members,
        "Deleted Apple account"
    );

    Ok(Json(deletion.into()))
}
