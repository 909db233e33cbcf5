use crate::db::errors::Result;
use crate::db::models::reviews::{ReviewCreateDBRequest, ReviewDBResponse};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Reviews<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reviews<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(rating = request.rating), err)]
    pub async fn create(&mut self, request: &ReviewCreateDBRequest) -> Result<ReviewDBResponse> {
        let review = sqlx::query_as::<_, ReviewDBResponse>(
            "INSERT INTO reviews (email, name, rating, comment) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&request.email)
        .bind(&request.name)
        .bind(request.rating)
        .bind(&request.comment)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(review)
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<ReviewDBResponse>> {
        let rows = sqlx::query_as::<_, ReviewDBResponse>("SELECT * FROM reviews ORDER BY created_at DESC")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }
}
