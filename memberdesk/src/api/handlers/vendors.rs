use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    AppState,
    api::models::{
        auth::AuthResponse,
        vendors::{VendorCreate, VendorLogin, VendorLoginResponse, VendorResponse, VendorUpdate},
    },
    auth::{
        AdminSession,
        session::{self, SessionClaims, SessionRole},
    },
    db::{
        errors::DbError,
        handlers::{Repository, Vendors, vendors::VendorFilter},
        models::vendors::{VendorCreateDBRequest, VendorUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{VendorId, abbrev_uuid},
};

fn duplicate_email(e: DbError) -> Error {
    if e.is_unique_violation_on("vendors_email_unique") {
        Error::BadRequest {
            message: "A vendor with this email already exists".to_string(),
        }
    } else {
        Error::Database(e)
    }
}

/// List all vendors
#[utoipa::path(
    get,
    path = "/vendors",
    tag = "vendors",
    summary = "List vendors",
    responses(
        (status = 200, description = "Vendors", body = Vec<VendorResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_vendors(State(state): State<AppState>, _: AdminSession) -> Result<Json<Vec<VendorResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let vendors = Vendors::new(&mut conn).list(&VendorFilter::default()).await?;
    Ok(Json(vendors.into_iter().map(Into::into).collect()))
}

/// Register a ticket vendor
#[utoipa::path(
    post,
    path = "/vendors",
    request_body = VendorCreate,
    tag = "vendors",
    summary = "Create vendor",
    responses(
        (status = 201, description = "Vendor created", body = VendorResponse),
        (status = 400, description = "Missing fields or email already used"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_vendor(
    State(state): State<AppState>,
    _: AdminSession,
    Json(create): Json<VendorCreate>,
) -> Result<(StatusCode, Json<VendorResponse>)> {
    let name = create.name.trim();
    let email = create.email.trim();
    let phone = create.phone.trim();

    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(Error::BadRequest {
            message: "Name, email and phone are required".to_string(),
        });
    }
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let vendor = Vendors::new(&mut conn)
        .create(&VendorCreateDBRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        })
        .await
        .map_err(duplicate_email)?;

    info!(vendor_id = %abbrev_uuid(&vendor.id), "Vendor created");
    Ok((StatusCode::CREATED, Json(vendor.into())))
}

/// Update some of a vendor's fields
#[utoipa::path(
    patch,
    path = "/vendors/{id}",
    request_body = VendorUpdate,
    tag = "vendors",
    summary = "Update vendor",
    params(("id" = uuid::Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor updated", body = VendorResponse),
        (status = 400, description = "No fields given"),
        (status = 404, description = "Vendor not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<VendorId>,
    _: AdminSession,
    Json(update): Json<VendorUpdate>,
) -> Result<Json<VendorResponse>> {
    update.validate()?;

    let request = VendorUpdateDBRequest {
        name: update.name.map(|s| s.trim().to_string()),
        email: update.email,
        phone: update.phone.map(|s| s.trim().to_string()),
        is_active: update.is_active,
    };

    if request.is_empty() {
        return Err(Error::BadRequest {
            message: "No fields to update".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let vendor = Vendors::new(&mut conn).update(id, &request).await.map_err(duplicate_email)?;
    Ok(Json(vendor.into()))
}

#[utoipa::path(
    delete,
    path = "/vendors/{id}",
    tag = "vendors",
    summary = "Delete vendor",
    params(("id" = uuid::Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 404, description = "Vendor not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_vendor(State(state): State<AppState>, Path(id): Path<VendorId>, _: AdminSession) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Vendors::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Vendor".to_string(),
            id: id.to_string(),
        })
    }
}

/// Start a vendor session by email
#[utoipa::path(
    post,
    path = "/vendors/login",
    request_body = VendorLogin,
    tag = "vendors",
    summary = "Vendor login",
    responses(
        (status = 200, description = "Vendor session issued", body = VendorLoginResponse),
        (status = 403, description = "Vendor is inactive"),
        (status = 404, description = "Unknown vendor"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn vendor_login(State(state): State<AppState>, Json(login): Json<VendorLogin>) -> Result<AuthResponse<VendorLoginResponse>> {
    let email = login.email.trim();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let vendor = Vendors::new(&mut conn).get_by_email(email).await?.ok_or_else(|| Error::NotFound {
        resource: "Vendor".to_string(),
        id: email.to_string(),
    })?;

    if !vendor.is_active {
        return Err(Error::Forbidden {
            message: "This vendor account is inactive".to_string(),
        });
    }

    let claims = SessionClaims::new(vendor.id, vendor.email.clone(), SessionRole::Vendor, &state.config);
    let token = session::create_session_token(&claims, &state.config)?;
    let cookie = session::session_cookie(&token, &state.config);

    info!(vendor_id = %abbrev_uuid(&vendor.id), "Vendor logged in");

    Ok(AuthResponse {
        body: VendorLoginResponse {
            token,
            vendor: vendor.into(),
        },
        cookie,
    })
}

#[cfg(test)]
mod tests {
    use crate::api::models::vendors::{VendorLoginResponse, VendorResponse};
    use crate::test_utils::{admin_auth_header, create_test_app, create_test_vendor};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_duplicate_email(pool: PgPool) {
        let app = create_test_app(pool).await;
        let (name, value) = admin_auth_header();
        let body = json!({ "name": "Seoul Tickets", "email": "seoul@vendor.kr", "phone": "010-1234-5678" });

        let response = app.post("/api/vendors").add_header(name.clone(), value.clone()).json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let vendor: VendorResponse = response.json();
        assert!(vendor.is_active);

        app.post("/api/vendors")
            .add_header(name.clone(), value.clone())
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.post("/api/vendors")
            .add_header(name, value)
            .json(&json!({ "name": "No phone", "email": "x@vendor.kr", "phone": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_partial_update(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let vendor = create_test_vendor(&pool, "v@vendor.kr").await;
        let (name, value) = admin_auth_header();

        app.patch(&format!("/api/vendors/{}", vendor.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let updated: VendorResponse = app
            .patch(&format!("/api/vendors/{}", vendor.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "is_active": false }))
            .await
            .json();
        assert!(!updated.is_active);
        assert_eq!(updated.name, vendor.name);

        app.patch(&format!("/api/vendors/{}", uuid::Uuid::new_v4()))
            .add_header(name, value)
            .json(&json!({ "name": "ghost" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_vendor_login(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let vendor = create_test_vendor(&pool, "v@vendor.kr").await;
        let (name, value) = admin_auth_header();

        let response = app.post("/api/vendors/login").json(&json!({ "email": "V@Vendor.kr" })).await;
        response.assert_status_ok();
        let login: VendorLoginResponse = response.json();
        assert_eq!(login.vendor.id, vendor.id);

        // A vendor session is not an admin session
        app.get("/api/vendors")
            .add_header("authorization", format!("Bearer {}", login.token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.post("/api/vendors/login")
            .json(&json!({ "email": "nobody@vendor.kr" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.patch(&format!("/api/vendors/{}", vendor.id))
            .add_header(name, value)
            .json(&json!({ "is_active": false }))
            .await
            .assert_status_ok();

        app.post("/api/vendors/login")
            .json(&json!({ "email": "v@vendor.kr" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
