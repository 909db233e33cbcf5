//! Database repository for membership applications.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::member_requests::{
    MemberRequestCreateDBRequest, MemberRequestDBResponse, MemberRequestUpdateDBRequest, RequestStatus, RequestStatusCounts,
};
use crate::types::{abbrev_uuid, RequestId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const SELECT_REQUEST: &str = r#"
    SELECT mr.*, EXISTS (SELECT 1 FROM members m WHERE m.request_id = mr.id) AS is_registered
    FROM member_requests mr
"#;

/// Email stored for admin-type applications submitted without one
pub fn placeholder_email(id: RequestId) -> String {
    format!("admin_account_{}@placeholder.local", id)
}

/// Filter for listing applications
#[derive(Debug, Clone)]
pub struct MemberRequestFilter {
    pub status: Option<RequestStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl MemberRequestFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { status: None, skip, limit }
    }

    pub fn with_status(mut self, status: Option<RequestStatus>) -> Self {
        self.status = status;
        self
    }
}

pub struct MemberRequests<'c> {
    db: &'c mut PgConnection,
}

impl<'c> MemberRequests<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Whether any application already uses this email
    #[instrument(skip(self, email), err)]
    pub async fn email_exists(&mut self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM member_requests WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(exists)
    }

    /// Total matching `filter`, ignoring skip and limit
    #[instrument(skip(self), err)]
    pub async fn count(&mut self, filter: &MemberRequestFilter) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member_requests WHERE ($1::text IS NULL OR status = $1)")
            .bind(filter.status)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }

    #[instrument(skip(self), err)]
    pub async fn status_counts(&mut self) -> Result<RequestStatusCounts> {
        let counts = sqlx::query_as::<_, RequestStatusCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM member_requests
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;
        Ok(counts)
    }

    #[instrument(skip(self), fields(request_id = %abbrev_uuid(&id)), err)]
    pub async fn set_status(&mut self, id: RequestId, status: RequestStatus) -> Result<MemberRequestDBResponse> {
        self.update(
            id,
            &MemberRequestUpdateDBRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for MemberRequests<'c> {
    type CreateRequest = MemberRequestCreateDBRequest;
    type UpdateRequest = MemberRequestUpdateDBRequest;
    type Response = MemberRequestDBResponse;
    type Id = RequestId;
    type Filter = MemberRequestFilter;

    #[instrument(skip(self, request), fields(account_type = ?request.account_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        let email = request.email.clone().unwrap_or_else(|| placeholder_email(id));

        let created = sqlx::query_as::<_, MemberRequestDBResponse>(
            r#"
            INSERT INTO member_requests (id, email, kakao_id, phone, referral_email, months, depositor_name, plan_type, account_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *, FALSE AS is_registered
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(&request.kakao_id)
        .bind(&request.phone)
        .bind(&request.referral_email)
        .bind(request.months)
        .bind(&request.depositor_name)
        .bind(request.plan_type)
        .bind(request.account_type)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(created)
    }

    #[instrument(skip(self), fields(request_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let query = format!("{SELECT_REQUEST} WHERE mr.id = $1");
        let request = sqlx::query_as::<_, MemberRequestDBResponse>(&query)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(request)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!("{SELECT_REQUEST} WHERE mr.id = ANY($1)");
        let rows = sqlx::query_as::<_, MemberRequestDBResponse>(&query)
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.id, r)).collect())
    }

    #[instrument(skip(self, filter), fields(status = ?filter.status, limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!(
            "{SELECT_REQUEST} WHERE ($1::text IS NULL OR mr.status = $1) ORDER BY mr.created_at DESC OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, MemberRequestDBResponse>(&query)
            .bind(filter.status)
            .bind(filter.skip)
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(request_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM member_requests WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(request_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let updated = sqlx::query_as::<_, MemberRequestDBResponse>(
            r#"
            UPDATE member_requests mr SET
                months = COALESCE($2, months),
                depositor_name = COALESCE($3, depositor_name),
                status = COALESCE($4, status)
            WHERE mr.id = $1
            RETURNING mr.*, EXISTS (SELECT 1 FROM members m WHERE m.request_id = mr.id) AS is_registered
            "#,
        )
        .bind(id)
        .bind(request.months)
        .bind(&request.depositor_name)
        .bind(request.status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(updated)
    }
}
