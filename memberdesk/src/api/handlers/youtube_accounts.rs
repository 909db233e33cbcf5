use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    api::models::accounts::{ListYoutubeAccountsQuery, YoutubeAccountCreate, YoutubeAccountResponse, YoutubeAccountUpdate},
    auth::AdminSession,
    db::{
        handlers::{AppleAccounts, Repository, YoutubeAccounts, youtube_accounts::YoutubeAccountFilter},
        models::youtube_accounts::{YoutubeAccountCreateDBRequest, YoutubeAccountUpdateDBRequest},
    },
    errors::{Error, Result},
    types::YoutubeAccountId,
};

/// List YouTube accounts
#[utoipa::path(
    get,
    path = "/youtube-accounts",
    tag = "accounts",
    summary = "List YouTube accounts",
    params(ListYoutubeAccountsQuery),
    responses(
        (status = 200, description = "YouTube accounts, newest first", body = Vec<YoutubeAccountResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_youtube_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListYoutubeAccountsQuery>,
    _: AdminSession,
) -> Result<Json<Vec<YoutubeAccountResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let accounts = YoutubeAccounts::new(&mut conn)
        .list(&YoutubeAccountFilter {
            apple_account_id: query.apple_account_id,
        })
        .await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Create a YouTube family account under an Apple account
#[utoipa::path(
    post,
    path = "/youtube-accounts",
    request_body = YoutubeAccountCreate,
    tag = "accounts",
    summary = "Create YouTube account",
    responses(
        (status = 201, description = "YouTube account created", body = YoutubeAccountResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Apple account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_youtube_account(
    State(state): State<AppState>,
    _: AdminSession,
    Json(create): Json<YoutubeAccountCreate>,
) -> Result<(StatusCode, Json<YoutubeAccountResponse>)> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    AppleAccounts::new(&mut conn)
        .get_by_id(create.apple_account_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Apple account".to_string(),
            id: create.apple_account_id.to_string(),
        })?;

    let account = YoutubeAccounts::new(&mut conn)
        .create(&YoutubeAccountCreateDBRequest {
            apple_account_id: create.apple_account_id,
            youtube_email: create.youtube_email,
            nickname: create.nickname,
            renewal_date: create.renewal_date,
            memo: create.memo,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Replace a YouTube account's details
#[utoipa::path(
    put,
    path = "/youtube-accounts/{id}",
    request_body = YoutubeAccountUpdate,
    tag = "accounts",
    summary = "Update YouTube account",
    params(("id" = uuid::Uuid, Path, description = "YouTube account ID")),
    responses(
        (status = 200, description = "YouTube account updated", body = YoutubeAccountResponse),
        (status = 404, description = "YouTube account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_youtube_account(
    State(state): State<AppState>,
    Path(id): Path<YoutubeAccountId>,
    _: AdminSession,
    Json(update): Json<YoutubeAccountUpdate>,
) -> Result<Json<YoutubeAccountResponse>> {
    update.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = YoutubeAccounts::new(&mut conn)
        .update(
            id,
            &YoutubeAccountUpdateDBRequest {
                youtube_email: update.youtube_email,
                nickname: update.nickname,
                renewal_date: update.renewal_date,
                memo: update.memo,
            },
        )
        .await?;

    Ok(Json(account.into()))
}

/// Delete a YouTube account and the members in it
#[utoipa::path(
    delete,
    path = "/youtube-accounts/{id}",
    tag = "accounts",
    summary = "Delete YouTube account",
    params(("id" = uuid::Uuid, Path, description = "YouTube account ID")),
    responses(
        (status = 204, description = "YouTube account deleted"),
        (status = 404, description = "YouTube account not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_youtube_account(
    State(state): State<AppState>,
    Path(id): Path<YoutubeAccountId>,
    _: AdminSession,
) -> Result<StatusCode> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if !YoutubeAccounts::new(&mut tx).delete(id).await? {
        return Err(Error::NotFound {
            resource: "YouTube account".to_string(),
            id: id.to_string(),
        });
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(StatusCode::NO_CONTENT)
}
