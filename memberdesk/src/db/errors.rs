use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Whether this is a unique violation on the named constraint
    pub fn is_unique_violation_on(&self, name: &str) -> bool {
        matches!(self, DbError::UniqueViolation { constraint: Some(c), .. } if c == name)
    }
}

/// Constraint name, table and message of a failed statement
fn constraint_parts(db_err: &dyn sqlx::error::DatabaseError) -> (Option<String>, Option<String>, String) {
    (
        db_err.constraint().map(str::to_string),
        db_err.table().map(str::to_string),
        db_err.message().to_string(),
    )
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return match err {
                sqlx::Error::RowNotFound => DbError::NotFound,
                other => DbError::Other(other.into()),
            };
        };

        let (constraint, table, message) = constraint_parts(db_err.as_ref());
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => DbError::UniqueViolation { constraint, table, message },
            sqlx::error::ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { constraint, table, message },
            sqlx::error::ErrorKind::CheckViolation => DbError::CheckViolation { constraint, table, message },
            // Not-null violations and everything else are bugs, not client input problems
            _ => DbError::Other(err.into()),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
