use crate::types::ReviewId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a review
#[derive(Debug, Clone)]
pub struct ReviewCreateDBRequest {
    pub email: String,
    pub name: String,
    pub rating: i32,
    pub comment: String,
}

/// Database response for a review
#[derive(Debug, Clone, FromRow)]
pub struct ReviewDBResponse {
    pub id: ReviewId,
    pub email: String,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
