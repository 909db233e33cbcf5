//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`RequestId`]: membership application
//! - [`AppleAccountId`], [`YoutubeAccountId`]: the account hierarchy
//! - [`MemberId`]: paying customer
//! - [`VendorId`], [`BookingId`]: movie booking side

use uuid::Uuid;

// Type aliases for IDs
pub type RequestId = Uuid;
pub type AppleAccountId = Uuid;
pub type YoutubeAccountId = Uuid;
pub type MemberId = Uuid;
pub type RevenueRecordId = Uuid;
pub type VendorId = Uuid;
pub type BookingId = Uuid;
pub type ReviewId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
