//! Database repository for Apple accounts.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::apple_accounts::{
    AppleAccountCreateDBRequest, AppleAccountDBResponse, AppleAccountDeletion, AppleAccountUpdateDBRequest,
};
use crate::types::{abbrev_uuid, AppleAccountId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Filter for listing Apple accounts
#[derive(Debug, Clone, Default)]
pub struct AppleAccountFilter;

pub struct AppleAccounts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AppleAccounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(apple_account_id = %abbrev_uuid(&id)), err)]
    pub async fn set_credit(&mut self, id: AppleAccountId, remaining_credit: i32) -> Result<AppleAccountDBResponse> {
        let account = sqlx::query_as::<_, AppleAccountDBResponse>(
            "UPDATE apple_accounts SET remaining_credit = $2, last_updated = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(remaining_credit)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(account)
    }

    /// Remove the account together with its family slots and their members.
    ///
    /// Rows are removed leaf first. Run this on a transaction so a failure part way leaves
    /// nothing deleted. Returns `None` when the account does not exist.
    #[instrument(skip(self), fields(apple_account_id = %abbrev_uuid(&id)), err)]
    pub async fn delete_cascade(&mut self, id: AppleAccountId) -> Result<Option<AppleAccountDeletion>> {
        let members = sqlx::query(
            "DELETE FROM members WHERE youtube_account_id IN (SELECT id FROM youtube_accounts WHERE apple_account_id = $1)",
        )
        .bind(id)
        .execute(&mut *self.db)
        .await?
        .rows_affected();

        let youtube_accounts = sqlx::query("DELETE FROM youtube_accounts WHERE apple_account_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM apple_accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Ok(None);
        }

        debug!(youtube_accounts, members, "Deleted Apple account with dependents");
        Ok(Some(AppleAccountDeletion { youtube_accounts, members }))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for AppleAccounts<'c> {
    type CreateRequest = AppleAccountCreateDBRequest;
    type UpdateRequest = AppleAccountUpdateDBRequest;
    type Response = AppleAccountDBResponse;
    type Id = AppleAccountId;
    type Filter = AppleAccountFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let account = sqlx::query_as::<_, AppleAccountDBResponse>(
            "INSERT INTO apple_accounts (apple_email, remaining_credit, memo) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.apple_email)
        .bind(request.remaining_credit)
        .bind(&request.memo)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(account)
    }

    #[instrument(skip(self), fields(apple_account_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let account = sqlx::query_as::<_, AppleAccountDBResponse>("SELECT * FROM apple_accounts WHERE id = $1")
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

        let rows = sqlx::query_as::<_, AppleAccountDBResponse>("SELECT * FROM apple_accounts WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, AppleAccountDBResponse>("SELECT * FROM apple_accounts ORDER BY created_at DESC")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    /// Cascading delete, see [`AppleAccounts::delete_cascade`]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        Ok(self.delete_cascade(id).await?.is_some())
    }

    #[instrument(skip(self, request), fields(apple_account_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let account = sqlx::query_as::<_, AppleAccountDBResponse>(
            r#"
            UPDATE apple_accounts SET
                apple_email = $2,
                remaining_credit = $3,
                memo = $4,
                last_updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.apple_email)
        .bind(request.remaining_credit)
        .bind(&request.memo)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(account)
    }
}
