//! Database repository for members.
//!
//! Besides plain CRUD this holds the billing-side updates: deposit status changes, customer
//! renewal preferences, renewal approval, the cron expiry reset and the monthly renewal sweep
//! (see [`crate::billing::sweep_target`] for the date rule).

use crate::billing::{add_months, first_of_month, previous_month, sweep_target};
use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::members::{
    DepositStatus, ExpiredMember, MemberCreateDBRequest, MemberDBResponse, MemberDetailDBResponse, MemberUpdateDBRequest,
    RenewalPreferencesDBRequest, RenewalSweepEntry,
};
use crate::types::{abbrev_uuid, MemberId, YoutubeAccountId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const SELECT_MEMBER_DETAIL: &str = r#"
    SELECT m.*, y.youtube_email, y.nickname AS youtube_nickname, a.apple_email
    FROM members m
    JOIN youtube_accounts y ON y.id = m.youtube_account_id
    JOIN apple_accounts a ON a.id = y.apple_account_id
"#;

/// Filter for listing members
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub youtube_account_id: Option<YoutubeAccountId>,
}

/// Result of a deposit status change
#[derive(Debug, Clone)]
pub struct DepositStatusChange {
    pub previous: DepositStatus,
    pub member: MemberDBResponse,
}

impl DepositStatusChange {
    /// Whether this change marks a new payment as received
    pub fn completed_payment(&self) -> bool {
        self.previous != DepositStatus::Completed && self.member.deposit_status == DepositStatus::Completed
    }
}

/// Result of approving a renewal request
#[derive(Debug, Clone)]
pub struct RenewalApproval {
    pub months: i32,
    pub member: MemberDBResponse,
}

#[derive(Debug, FromRow)]
struct SweepCandidate {
    id: MemberId,
    name: String,
    email: String,
    payment_date: NaiveDate,
    deposit_status: DepositStatus,
}

pub struct Members<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Members<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members").fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Members created strictly before `cutoff`
    #[instrument(skip(self), err)]
    pub async fn count_created_before(&mut self, cutoff: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE created_at < $1")
            .bind(cutoff)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// All members with their slot and Apple account, optionally matching a case-insensitive
    /// search on name or email
    #[instrument(skip(self), err)]
    pub async fn list_with_details(&mut self, search: Option<&str>) -> Result<Vec<MemberDetailDBResponse>> {
        let query = format!(
            "{SELECT_MEMBER_DETAIL} WHERE ($1::text IS NULL OR m.name ILIKE '%' || $1 || '%' OR m.email ILIKE '%' || $1 || '%') \
             ORDER BY m.created_at DESC"
        );
        let rows = sqlx::query_as::<_, MemberDetailDBResponse>(&query)
            .bind(search)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    /// Members who asked to renew, soonest due first
    #[instrument(skip(self), err)]
    pub async fn list_renewal_requests(&mut self, search: Option<&str>) -> Result<Vec<MemberDetailDBResponse>> {
        let query = format!(
            "{SELECT_MEMBER_DETAIL} WHERE m.will_renew \
             AND ($1::text IS NULL OR m.name ILIKE '%' || $1 || '%' OR m.email ILIKE '%' || $1 || '%') \
             ORDER BY m.payment_date ASC"
        );
        let rows = sqlx::query_as::<_, MemberDetailDBResponse>(&query)
            .bind(search)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    /// Whether any member has this email, ignoring case and surrounding whitespace
    #[instrument(skip(self, email), err)]
    pub async fn email_is_member(&mut self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM members WHERE LOWER(TRIM(email)) = LOWER(TRIM($1)))")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(exists)
    }

    /// Look a member up by full email, or by the local part alone (`id` matches `id@...`).
    ///
    /// When several rows match, the one with the latest payment date wins.
    #[instrument(skip(self, email_or_id), err)]
    pub async fn find_for_expiry(&mut self, email_or_id: &str) -> Result<Option<MemberDBResponse>> {
        let needle = email_or_id.trim();
        let query = if needle.contains('@') {
            "SELECT * FROM members WHERE email = $1 ORDER BY payment_date DESC LIMIT 1"
        } else {
            "SELECT * FROM members WHERE split_part(email, '@', 1) = $1 ORDER BY payment_date DESC LIMIT 1"
        };
        let member = sqlx::query_as::<_, MemberDBResponse>(query)
            .bind(needle)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(member)
    }

    /// Store renewal preferences on every member row with `email`
    #[instrument(skip(self, email, prefs), fields(will_renew = prefs.will_renew), err)]
    pub async fn update_renewal_preferences(&mut self, email: &str, prefs: &RenewalPreferencesDBRequest) -> Result<Vec<MemberDBResponse>> {
        let rows = sqlx::query_as::<_, MemberDBResponse>(
            r#"
            UPDATE members SET
                will_renew = $2,
                renew_months = $3,
                is_auto_payment = $4,
                renewal_message = $5
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email.trim())
        .bind(prefs.will_renew)
        .bind(prefs.renew_months)
        .bind(prefs.is_auto_payment)
        .bind(&prefs.renewal_message)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Set the deposit status and report the status it replaced
    #[instrument(skip(self), fields(member_id = %abbrev_uuid(&id), status = status.as_str()), err)]
    pub async fn set_deposit_status(&mut self, id: MemberId, status: DepositStatus) -> Result<DepositStatusChange> {
        let previous: DepositStatus = sqlx::query_scalar("SELECT deposit_status FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        let member = sqlx::query_as::<_, MemberDBResponse>("UPDATE members SET deposit_status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(status)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(DepositStatusChange { previous, member })
    }

    /// Set the status of every listed member, reporting each row's previous status.
    ///
    /// Rows are locked in id order before the update. Call inside a transaction so the ledger
    /// rows for completed payments commit together with the status change.
    #[instrument(skip(self, ids), fields(count = ids.len(), status = status.as_str()), err)]
    pub async fn bulk_set_deposit_status(&mut self, ids: &[MemberId], status: DepositStatus) -> Result<Vec<DepositStatusChange>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let previous: HashMap<MemberId, DepositStatus> =
            sqlx::query_as::<_, (MemberId, DepositStatus)>("SELECT id, deposit_status FROM members WHERE id = ANY($1) ORDER BY id FOR UPDATE")
                .bind(ids)
                .fetch_all(&mut *self.db)
                .await?
                .into_iter()
                .collect();

        let rows = sqlx::query_as::<_, MemberDBResponse>("UPDATE members SET deposit_status = $2 WHERE id = ANY($1) RETURNING *")
            .bind(ids)
            .bind(status)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|member| DepositStatusChange {
                previous: previous.get(&member.id).copied().unwrap_or(member.deposit_status),
                member,
            })
            .collect())
    }

    /// Extend a member who asked to renew by their requested months and clear the request
    #[instrument(skip(self), fields(member_id = %abbrev_uuid(&id)), err)]
    pub async fn approve_renewal(&mut self, id: MemberId, today: NaiveDate) -> Result<RenewalApproval> {
        let current = sqlx::query_as::<_, MemberDBResponse>("SELECT * FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        let months = current.renew_months.unwrap_or(1).max(1);
        let next_payment_date = add_months(current.payment_date, months);

        let member = sqlx::query_as::<_, MemberDBResponse>(
            r#"
            UPDATE members SET
                payment_date = $2,
                last_payment_date = $3,
                will_renew = FALSE,
                renew_months = NULL,
                renewal_message = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next_payment_date)
        .bind(today)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(RenewalApproval { months, member })
    }

    /// Reset completed members whose paid period has run out back to pending
    #[instrument(skip(self), err)]
    pub async fn expire_due(&mut self, today: NaiveDate) -> Result<Vec<ExpiredMember>> {
        let expired = sqlx::query_as::<_, ExpiredMember>(
            r#"
            UPDATE members SET deposit_status = 'pending'
            WHERE payment_date <= $1 AND deposit_status = 'completed'
            RETURNING id, name, email, payment_date
            "#,
        )
        .bind(today)
        .fetch_all(&mut *self.db)
        .await?;

        if !expired.is_empty() {
            info!(count = expired.len(), "Reset expired members to pending");
        }
        Ok(expired)
    }

    /// Members the monthly sweep would move on `today`, without writing anything
    #[instrument(skip(self), err)]
    pub async fn renewal_candidates(&mut self, today: NaiveDate) -> Result<Vec<RenewalSweepEntry>> {
        let (prev_year, prev_month) = previous_month(today);
        let Some(window_start) = NaiveDate::from_ymd_opt(prev_year, prev_month, 1) else {
            return Ok(Vec::new());
        };
        let window_end = first_of_month(today);

        let candidates = sqlx::query_as::<_, SweepCandidate>(
            r#"
            SELECT id, name, email, payment_date, deposit_status
            FROM members
            WHERE payment_date >= $1 AND payment_date < $2 AND deposit_status <> 'completed'
            ORDER BY payment_date, id
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(candidates
            .into_iter()
            .filter_map(|c| {
                sweep_target(c.payment_date, today).map(|new_payment_date| RenewalSweepEntry {
                    id: c.id,
                    name: c.name,
                    email: c.email,
                    previous_payment_date: c.payment_date,
                    previous_status: c.deposit_status,
                    new_payment_date,
                })
            })
            .collect())
    }

    /// Apply the monthly sweep: move each due member's payment date into the current month
    /// and mark the period pending. Run on a transaction.
    #[instrument(skip(self), err)]
    pub async fn renewal_sweep(&mut self, today: NaiveDate) -> Result<Vec<RenewalSweepEntry>> {
        let entries = self.renewal_candidates(today).await?;

        for entry in &entries {
            sqlx::query("UPDATE members SET payment_date = $2, deposit_status = 'pending' WHERE id = $1")
                .bind(entry.id)
                .bind(entry.new_payment_date)
                .execute(&mut *self.db)
                .await?;
            debug!(
                member_id = %abbrev_uuid(&entry.id),
                from = %entry.previous_payment_date,
                to = %entry.new_payment_date,
                "Advanced payment date"
            );
        }

        info!(count = entries.len(), %today, "Monthly renewal sweep applied");
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Members<'c> {
    type CreateRequest = MemberCreateDBRequest;
    type UpdateRequest = MemberUpdateDBRequest;
    type Response = MemberDBResponse;
    type Id = MemberId;
    type Filter = MemberFilter;

    #[instrument(skip(self, request), fields(youtube_account_id = %abbrev_uuid(&request.youtube_account_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let member = sqlx::query_as::<_, MemberDBResponse>(
            r#"
            INSERT INTO members (youtube_account_id, request_id, nickname, email, name, last_payment_date, payment_date, deposit_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.youtube_account_id)
        .bind(request.request_id)
        .bind(&request.nickname)
        .bind(&request.email)
        .bind(&request.name)
        .bind(request.last_payment_date)
        .bind(request.payment_date)
        .bind(request.deposit_status)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(member)
    }

    #[instrument(skip(self), fields(member_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let member = sqlx::query_as::<_, MemberDBResponse>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(member)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, MemberDBResponse>("SELECT * FROM members WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows.into_iter().map(|m| (m.id, m)).collect())
    }

    #[instrument(skip(self, filter), fields(youtube_account_id = ?filter.youtube_account_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, MemberDBResponse>(
            "SELECT * FROM members WHERE ($1::uuid IS NULL OR youtube_account_id = $1) ORDER BY created_at DESC",
        )
        .bind(filter.youtube_account_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(member_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(member_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let member = sqlx::query_as::<_, MemberDBResponse>(
            r#"
            UPDATE members SET
                youtube_account_id = $2,
                nickname = $3,
                email = $4,
                name = $5,
                last_payment_date = $6,
                payment_date = $7,
                deposit_status = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.youtube_account_id)
        .bind(&request.nickname)
        .bind(&request.email)
        .bind(&request.name)
        .bind(request.last_payment_date)
        .bind(request.payment_date)
        .bind(request.deposit_status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_apple_account, create_test_member_with, create_test_youtube_account};
    use sqlx::PgPool;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn slot(pool: &PgPool) -> YoutubeAccountId {
        let apple = create_test_apple_account(pool, "host@icloud.com").await;
        create_test_youtube_account(pool, apple.id, "slot@gmail.com").await.id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sweep_clamps_to_end_of_february(pool: PgPool) {
        let slot = slot(&pool).await;
        let member = create_test_member_with(&pool, slot, "jan31@example.com", d(2025, 1, 31), DepositStatus::Pending).await;

        let mut tx = pool.begin().await.unwrap();
        let swept = Members::new(&mut tx).renewal_sweep(d(2025, 2, 28)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].id, member.id);
        assert_eq!(swept[0].new_payment_date, d(2025, 2, 28));

        let mut conn = pool.acquire().await.unwrap();
        let reloaded = Members::new(&mut conn).get_by_id(member.id).await.unwrap().unwrap();
        assert_eq!(reloaded.payment_date, d(2025, 2, 28));
        assert_eq!(reloaded.deposit_status, DepositStatus::Pending);
    }

    #[sqlx::test]
    async fn test_second_sweep_is_a_no_op(pool: PgPool) {
        let slot = slot(&pool).await;
        create_test_member_with(&pool, slot, "a@example.com", d(2025, 1, 10), DepositStatus::Failed).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Members::new(&mut conn);
        assert_eq!(repo.renewal_sweep(d(2025, 2, 15)).await.unwrap().len(), 1);
        assert!(repo.renewal_sweep(d(2025, 2, 15)).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_sweep_skips_completed_and_not_yet_due(pool: PgPool) {
        let slot = slot(&pool).await;
        create_test_member_with(&pool, slot, "paid@example.com", d(2025, 1, 5), DepositStatus::Completed).await;
        create_test_member_with(&pool, slot, "later@example.com", d(2025, 1, 20), DepositStatus::Pending).await;
        create_test_member_with(&pool, slot, "old@example.com", d(2024, 12, 5), DepositStatus::Pending).await;
        let due = create_test_member_with(&pool, slot, "due@example.com", d(2025, 1, 9), DepositStatus::Pending).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Members::new(&mut conn);

        let preview = repo.renewal_candidates(d(2025, 2, 10)).await.unwrap();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].id, due.id);
        assert_eq!(preview[0].previous_status, DepositStatus::Pending);

        // Preview writes nothing
        let unchanged = repo.get_by_id(due.id).await.unwrap().unwrap();
        assert_eq!(unchanged.payment_date, d(2025, 1, 9));
    }

    #[sqlx::test]
    async fn test_deposit_status_change_reports_completion(pool: PgPool) {
        let slot = slot(&pool).await;
        let member = create_test_member_with(&pool, slot, "pay@example.com", d(2025, 3, 1), DepositStatus::Pending).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Members::new(&mut conn);

        let change = repo.set_deposit_status(member.id, DepositStatus::Completed).await.unwrap();
        assert!(change.completed_payment());

        let again = repo.set_deposit_status(member.id, DepositStatus::Completed).await.unwrap();
        assert!(!again.completed_payment());

        let missing = repo.set_deposit_status(uuid::Uuid::new_v4(), DepositStatus::Failed).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    async fn test_expire_due_resets_completed_members(pool: PgPool) {
        let slot = slot(&pool).await;
        let lapsed = create_test_member_with(&pool, slot, "lapsed@example.com", d(2025, 3, 1), DepositStatus::Completed).await;
        create_test_member_with(&pool, slot, "future@example.com", d(2025, 4, 1), DepositStatus::Completed).await;

        let mut conn = pool.acquire().await.unwrap();
        let expired = Members::new(&mut conn).expire_due(d(2025, 3, 1)).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, lapsed.id);
    }

    #[sqlx::test]
    async fn test_renewal_preferences_and_approval(pool: PgPool) {
        let slot = slot(&pool).await;
        let member = create_test_member_with(&pool, slot, "renew@example.com", d(2025, 1, 31), DepositStatus::Completed).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Members::new(&mut conn);

        let updated = repo
            .update_renewal_preferences(
                "renew@example.com",
                &RenewalPreferencesDBRequest {
                    will_renew: true,
                    renew_months: Some(3),
                    is_auto_payment: false,
                    renewal_message: Some("same slot please".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let requests = repo.list_renewal_requests(Some("RENEW")).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].apple_email, "host@icloud.com");

        let approval = repo.approve_renewal(member.id, d(2025, 1, 25)).await.unwrap();
        assert_eq!(approval.months, 3);
        assert_eq!(approval.member.payment_date, d(2025, 4, 30));
        assert_eq!(approval.member.last_payment_date, Some(d(2025, 1, 25)));
        assert!(!approval.member.will_renew);
        assert_eq!(approval.member.renew_months, None);
        assert!(repo.list_renewal_requests(None).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_one_member_per_application(pool: PgPool) {
        use crate::db::handlers::MemberRequests;
        use crate::db::models::member_requests::MemberRequestCreateDBRequest;

        let slot = slot(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let request = MemberRequests::new(&mut conn)
            .create(&MemberRequestCreateDBRequest {
                email: Some("applicant@example.com".to_string()),
                phone: Some("010-0000-0000".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let member = MemberCreateDBRequest {
            youtube_account_id: slot,
            request_id: Some(request.id),
            nickname: "pending".to_string(),
            email: "applicant@example.com".to_string(),
            name: "Kim".to_string(),
            last_payment_date: None,
            payment_date: d(2025, 5, 1),
            deposit_status: DepositStatus::Completed,
        };
        let mut repo = Members::new(&mut conn);
        repo.create(&member).await.unwrap();

        let err = repo.create(&member).await.unwrap_err();
        assert!(err.is_unique_violation_on("members_request_id_unique"));

        // Members added by hand carry no application and are unaffected
        let manual = MemberCreateDBRequest { request_id: None, ..member };
        repo.create(&manual).await.unwrap();
        repo.create(&manual).await.unwrap();
    }

    #[sqlx::test]
    async fn test_bulk_status_reports_previous_status(pool: PgPool) {
        let slot = slot(&pool).await;
        let pending = create_test_member_with(&pool, slot, "p@example.com", d(2025, 5, 1), DepositStatus::Pending).await;
        let paid = create_test_member_with(&pool, slot, "c@example.com", d(2025, 5, 1), DepositStatus::Completed).await;

        let mut conn = pool.acquire().await.unwrap();
        let changes = Members::new(&mut conn)
            .bulk_set_deposit_status(&[pending.id, paid.id, uuid::Uuid::new_v4()], DepositStatus::Completed)
            .await
            .unwrap();

        assert_eq!(changes.len(), 2);
        let newly_paid: Vec<_> = changes.iter().filter(|c| c.completed_payment()).map(|c| c.member.id).collect();
        assert_eq!(newly_paid, vec![pending.id]);
    }

    #[sqlx::test]
    async fn test_lookup_by_email_or_local_part(pool: PgPool) {
        let slot = slot(&pool).await;
        create_test_member_with(&pool, slot, "lookup@example.com", d(2025, 5, 1), DepositStatus::Completed).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Members::new(&mut conn);

        assert!(repo.find_for_expiry("lookup@example.com").await.unwrap().is_some());
        assert!(repo.find_for_expiry("lookup").await.unwrap().is_some());
        assert!(repo.find_for_expiry("look").await.unwrap().is_none());

        // LIKE metacharacters in a bare id are matched literally
        assert!(repo.find_for_expiry("l_okup").await.unwrap().is_none());
        assert!(repo.find_for_expiry("%").await.unwrap().is_none());
        assert!(repo.email_is_member("  LOOKUP@example.com ").await.unwrap());
        assert!(!repo.email_is_member("stranger@example.com").await.unwrap());
    }
}
