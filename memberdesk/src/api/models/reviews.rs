//! API request/response models for customer reviews.

use crate::db::models::reviews::ReviewDBResponse;
use crate::types::ReviewId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A review. Only members can post, once per email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewCreate {
    pub email: String,
    pub name: String,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReviewId,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewDBResponse> for ReviewResponse {
    fn from(db: ReviewDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            rating: db.rating,
            comment: db.comment,
            created_at: db.created_at,
        }
    }
}
