//! Referral resolution and commission rates for movie bookings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Referral code that marks a booking as coming from the admin's own link.
pub const ADMIN_REFERRAL_CODE: &str = "admin";

/// Source of a booking referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReferralType {
    Admin,
    Vendor,
}

impl ReferralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
        }
    }
}

impl std::str::FromStr for ReferralType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            _ => Err(format!("Unknown referral type: {}", s)),
        }
    }
}

/// Classify a referral code.
///
/// `vendor_exists` reports whether the code matches a vendor row. Unknown codes resolve to
/// `None`, the same as no code at all.
pub fn resolve_referral(code: Option<&str>, vendor_exists: bool) -> Option<ReferralType> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => None,
        Some(ADMIN_REFERRAL_CODE) => Some(ReferralType::Admin),
        Some(_) if vendor_exists => Some(ReferralType::Vendor),
        Some(_) => None,
    }
}

/// Share of the ticket price kept as commission.
pub fn commission_rate(referral: Option<ReferralType>) -> Decimal {
    match referral {
        Some(ReferralType::Vendor) => Decimal::ONE,
        Some(ReferralType::Admin) | None => Decimal::new(10, 2),
    }
}

/// Commission owed on a booking with the given final ticket price.
pub fn commission_for(referral: Option<ReferralType>, total_price: Decimal) -> Decimal {
    (total_price * commission_rate(referral)).round_dp(2)
}
