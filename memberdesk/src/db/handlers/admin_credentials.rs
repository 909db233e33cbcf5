//! Storage for the single administrator password hash.

use crate::db::errors::Result;
use sqlx::PgConnection;
use tracing::instrument;

pub struct AdminCredentials<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AdminCredentials<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The stored argon2 hash, if one has been seeded
    #[instrument(skip(self), err)]
    pub async fn password_hash(&mut self) -> Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password_hash FROM admin_credentials WHERE singleton")
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(hash)
    }

    /// Insert or replace the hash
    #[instrument(skip_all, err)]
    pub async fn set_password_hash(&mut self, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_credentials (singleton, password_hash)
            VALUES (TRUE, $1)
            ON CONFLICT (singleton) DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
            "#,
        )
        .bind(password_hash)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }
}
