//! Responses of the scheduled maintenance endpoints.

use crate::db::models::members::ExpiredMember;
use crate::types::MemberId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiredMemberResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub payment_date: NaiveDate,
}

impl From<ExpiredMember> for ExpiredMemberResponse {
    fn from(member: ExpiredMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email,
            payment_date: member.payment_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiredMembersResponse {
    pub date: NaiveDate,
    pub updated_count: usize,
    pub updated_members: Vec<ExpiredMemberResponse>,
}

/// Month-end snapshot written by the cron job
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenueRecorded {
    pub year: i32,
    pub month: u32,
    pub member_count: i64,
    pub revenue: i64,
}
