//! Database repository for vendors.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::vendors::{VendorCreateDBRequest, VendorDBResponse, VendorUpdateDBRequest};
use crate::types::{abbrev_uuid, VendorId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing vendors
#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    pub active_only: bool,
}

pub struct Vendors<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Vendors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<VendorDBResponse>> {
        let vendor = sqlx::query_as::<_, VendorDBResponse>("SELECT * FROM vendors WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(vendor)
    }

    /// Resolve a referral code to a vendor. Codes that are not UUIDs match nothing.
    #[instrument(skip(self), err)]
    pub async fn find_by_referral_code(&mut self, code: &str) -> Result<Option<VendorDBResponse>> {
        match code.trim().parse::<VendorId>() {
            Ok(id) => self.get_by_id(id).await,
            Err(_) => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Vendors<'c> {
    type CreateRequest = VendorCreateDBRequest;
    type UpdateRequest = VendorUpdateDBRequest;
    type Response = VendorDBResponse;
    type Id = VendorId;
    type Filter = VendorFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let vendor = sqlx::query_as::<_, VendorDBResponse>("INSERT INTO vendors (name, email, phone) VALUES ($1, $2, $3) RETURNING *")
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.phone)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(vendor)
    }

    #[instrument(skip(self), fields(vendor_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let vendor = sqlx::query_as::<_, VendorDBResponse>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(vendor)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, VendorDBResponse>("SELECT * FROM vendors WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows.into_iter().map(|v| (v.id, v)).collect())
    }

    #[instrument(skip(self, filter), fields(active_only = filter.active_only), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, VendorDBResponse>("SELECT * FROM vendors WHERE (NOT $1 OR is_active) ORDER BY created_at DESC")
            .bind(filter.active_only)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(vendor_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(vendor_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let vendor = sqlx::query_as::<_, VendorDBResponse>(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(vendor)
    }
}
