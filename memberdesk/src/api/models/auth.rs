//! Admin login and logout bodies.

use axum::{
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::session::SessionRole;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub password: String,
}

/// Session issued on login. Also set as an HttpOnly cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub token: String,
    pub role: SessionRole,
}

/// Response carrying a JSON body and a `Set-Cookie` header
pub struct AuthResponse<T> {
    pub body: T,
    pub cookie: String,
}

impl<T: Serialize> IntoResponse for AuthResponse<T> {
    fn into_response(self) -> Response {
        ([(header::SET_COOKIE, self.cookie)], Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}
