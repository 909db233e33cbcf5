//! `skip`/`limit` paging for the application list.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Page size when the client gives none. Large enough for one screen of the admin table.
pub const DEFAULT_LIMIT: i64 = 50;

pub const MAX_LIMIT: i64 = 200;

/// Offset paging taken from the query string.
///
/// Query values arrive as strings, so both fields go through `DisplayFromStr` when flattened into
/// another query struct.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Rows to skip (default 0)
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Page size (default 50, at most 200)
    #[param(default = 50, minimum = 1, maximum = 200)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl Pagination {
    /// `(skip, limit)` ready for `OFFSET`/`LIMIT`. Negative skips become 0 and the limit is
    /// clamped into `1..=MAX_LIMIT`.
    pub fn params(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (skip, limit)
    }
}

/// One page of rows plus the unpaged total.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, (skip, limit): (i64, i64)) -> Self {
        Self {
            data,
            total_count,
            skip,
            limit,
        }
    }
}
