use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use crate::{
    AppState,
    api::models::reviews::{ReviewCreate, ReviewResponse},
    db::{
        handlers::{Members, Reviews},
        models::reviews::ReviewCreateDBRequest,
    },
    errors::{Error, Result},
    types::abbrev_uuid,
};

/// List reviews, newest first
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    summary = "List reviews",
    responses(
        (status = 200, description = "Reviews", body = Vec<ReviewResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<ReviewResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let reviews = Reviews::new(&mut conn).list().await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

/// Post a review. The email must belong to a member and may review only once.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = ReviewCreate,
    tag = "reviews",
    summary = "Create review",
    responses(
        (status = 201, description = "Review posted", body = ReviewResponse),
        (status = 400, description = "Missing fields or rating out of range"),
        (status = 403, description = "Email does not belong to a member"),
        (status = 409, description = "This email has already posted a review"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_review(State(state): State<AppState>, Json(create): Json<ReviewCreate>) -> Result<(StatusCode, Json<ReviewResponse>)> {
    let email = create.email.trim();
    let name = create.name.trim();
    let comment = create.comment.trim();

    if email.is_empty() || name.is_empty() || comment.is_empty() {
        return Err(Error::BadRequest {
            message: "Email, name, rating and comment are required".to_string(),
        });
    }
    if !(1..=5).contains(&create.rating) {
        return Err(Error::BadRequest {
            message: "Rating must be between 1 and 5".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Members::new(&mut conn).email_is_member(email).await? {
        return Err(Error::Forbidden {
            message: "Only members can leave a review".to_string(),
        });
    }

    let review = Reviews::new(&mut conn)
        .create(&ReviewCreateDBRequest {
            email: email.to_string(),
            name: name.to_string(),
            rating: create.rating,
            comment: comment.to_string(),
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation_on("reviews_email_unique") {
                Error::Conflict {
                    message: "A review has already been submitted for this email".to_string(),
                }
            } else {
                Error::Database(e)
            }
        })?;

    info!(review_id = %abbrev_uuid(&review.id), rating = review.rating, "Review posted");
    Ok((StatusCode::CREATED, Json(review.into())))
}

#[cfg(test)]
mod tests {
    use crate::api::models::reviews::ReviewResponse;
    use crate::test_utils::{create_test_app, create_test_apple_account, create_test_member, create_test_youtube_account};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_member_can_review_once(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        create_test_member(&pool, slot.id, "member@example.com").await;

        let body = json!({ "email": " Member@Example.com ", "name": "Kim", "rating": 5, "comment": "Great" });
        let response = app.post("/api/reviews").json(&body).await;
        response.assert_status(StatusCode::CREATED);

        app.post("/api/reviews").json(&body).await.assert_status(StatusCode::CONFLICT);

        let reviews: Vec<ReviewResponse> = app.get("/api/reviews").await.json();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 5);

        // Email stays private
        let raw: serde_json::Value = app.get("/api/reviews").await.json();
        assert!(raw[0].get("email").is_none());
    }

    #[sqlx::test]
    async fn test_review_validation(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let apple = create_test_apple_account(&pool, "owner@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "family@gmail.com").await;
        create_test_member(&pool, slot.id, "member@example.com").await;

        app.post("/api/reviews")
            .json(&json!({ "email": "member@example.com", "name": "Kim", "rating": 6, "comment": "Too good" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.post("/api/reviews")
            .json(&json!({ "email": "member@example.com", "name": "", "rating": 4, "comment": "ok" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.post("/api/reviews")
            .json(&json!({ "email": "stranger@example.com", "name": "Lee", "rating": 4, "comment": "ok" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
