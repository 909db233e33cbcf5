use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::auth::{AuthResponse, LoginInfo, LoginRequest, LogoutResponse},
    auth::{
        password,
        session::{self, SessionClaims, SessionRole},
    },
    db::handlers::AdminCredentials,
    errors::{Error, Result},
};

/// Login as the administrator
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    summary = "Admin login",
    responses(
        (status = 200, description = "Login successful", body = LoginInfo),
        (status = 401, description = "Invalid password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<AuthResponse<LoginInfo>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let hash = AdminCredentials::new(&mut conn)
        .password_hash()
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Admin login is not configured".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password;
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid password".to_string()),
        });
    }

    let token = session::create_session_token(&SessionClaims::admin(&state.config), &state.config)?;
    let cookie = session::session_cookie(&token, &state.config);

    Ok(AuthResponse {
        body: LoginInfo {
            token,
            role: SessionRole::Admin,
        },
        cookie,
    })
}

/// Logout (clear the session cookie)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    summary = "Logout",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> AuthResponse<LogoutResponse> {
    AuthResponse {
        body: LogoutResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::clear_session_cookie(&state.config),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::auth::LoginInfo;
    use crate::test_utils::{TEST_ADMIN_PASSWORD, create_test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_sets_cookie_and_grants_admin_access(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/auth/login").json(&json!({ "password": TEST_ADMIN_PASSWORD })).await;
        response.assert_status_ok();

        let cookie = response.header("set-cookie");
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("memberdesk_session="));
        assert!(cookie.contains("HttpOnly"));

        let info: LoginInfo = response.json();
        app.get("/api/apple-accounts")
            .add_header("authorization", format!("Bearer {}", info.token))
            .await
            .assert_status_ok();
    }

    #[sqlx::test]
    async fn test_wrong_password_is_rejected(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/auth/login").json(&json!({ "password": "guess" })).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["error"], "Invalid password");
    }

    #[sqlx::test]
    async fn test_logout_clears_cookie(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/auth/logout").await;
        response.assert_status_ok();
        assert!(response.header("set-cookie").to_str().unwrap().contains("Max-Age=0"));
    }
}
