//! Database repository for family slots.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::youtube_accounts::{YoutubeAccountCreateDBRequest, YoutubeAccountDBResponse, YoutubeAccountUpdateDBRequest};
use crate::types::{abbrev_uuid, AppleAccountId, YoutubeAccountId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing family slots
#[derive(Debug, Clone, Default)]
pub struct YoutubeAccountFilter {
    pub apple_account_id: Option<AppleAccountId>,
}

pub struct YoutubeAccounts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> YoutubeAccounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM youtube_accounts")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for YoutubeAccounts<'c> {
    type CreateRequest = YoutubeAccountCreateDBRequest;
    type UpdateRequest = YoutubeAccountUpdateDBRequest;
    type Response = YoutubeAccountDBResponse;
    type Id = YoutubeAccountId;
    type Filter = YoutubeAccountFilter;

    #[instrument(skip(self, request), fields(apple_account_id = %abbrev_uuid(&request.apple_account_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let account = sqlx::query_as::<_, YoutubeAccountDBResponse>(
            r#"
            INSERT INTO youtube_accounts (apple_account_id, youtube_email, nickname, renewal_date, memo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.apple_account_id)
        .bind(&request.youtube_email)
        .bind(&request.nickname)
        .bind(request.renewal_date)
        .bind(&request.memo)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(account)
    }

    #[instrument(skip(self), fields(youtube_account_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let account = sqlx::query_as::<_, YoutubeAccountDBResponse>("SELECT * FROM youtube_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(account)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, YoutubeAccountDBResponse>("SELECT * FROM youtube_accounts WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, filter), fields(apple_account_id = ?filter.apple_account_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, YoutubeAccountDBResponse>(
            "SELECT * FROM youtube_accounts WHERE ($1::uuid IS NULL OR apple_account_id = $1) ORDER BY created_at DESC",
        )
        .bind(filter.apple_account_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Delete the slot and the members assigned to it
    #[instrument(skip(self), fields(youtube_account_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        sqlx::query("DELETE FROM members WHERE youtube_account_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        let result = sqlx::query("DELETE FROM youtube_accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(youtube_account_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let account = sqlx::query_as::<_, YoutubeAccountDBResponse>(
            r#"
            UPDATE youtube_accounts SET
                youtube_email = $2,
                nickname = $3,
                renewal_date = $4,
                memo = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.youtube_email)
        .bind(&request.nickname)
        .bind(request.renewal_date)
        .bind(&request.memo)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_apple_account, create_test_member, create_test_youtube_account};
    use chrono::NaiveDate;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_list_filters_by_apple_account(pool: PgPool) {
        let first = create_test_apple_account(&pool, "first@icloud.com").await;
        let second = create_test_apple_account(&pool, "second@icloud.com").await;
        create_test_youtube_account(&pool, first.id, "a@gmail.com").await;
        create_test_youtube_account(&pool, first.id, "b@gmail.com").await;
        create_test_youtube_account(&pool, second.id, "c@gmail.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = YoutubeAccounts::new(&mut conn);

        let under_first = repo
            .list(&YoutubeAccountFilter {
                apple_account_id: Some(first.id),
            })
            .await
            .unwrap();
        assert_eq!(under_first.len(), 2);
        assert!(under_first.iter().all(|a| a.apple_account_id == first.id));

        assert_eq!(repo.list(&YoutubeAccountFilter::default()).await.unwrap().len(), 3);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[sqlx::test]
    async fn test_create_under_missing_apple_account_fails(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let err = YoutubeAccounts::new(&mut conn)
            .create(&YoutubeAccountCreateDBRequest {
                apple_account_id: uuid::Uuid::new_v4(),
                youtube_email: "orphan@gmail.com".to_string(),
                nickname: None,
                renewal_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                memo: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    async fn test_delete_takes_members_with_it(pool: PgPool) {
        let apple = create_test_apple_account(&pool, "host@icloud.com").await;
        let slot = create_test_youtube_account(&pool, apple.id, "slot@gmail.com").await;
        create_test_member(&pool, slot.id, "member@example.com").await;

        let mut tx = pool.begin().await.unwrap();
        assert!(YoutubeAccounts::new(&mut tx).delete(slot.id).await.unwrap());
        tx.commit().await.unwrap();

        let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members").fetch_one(&pool).await.unwrap();
        assert_eq!(members, 0);
    }
}
