//! Shopdash core types: the account dashboard summary and how it is shaped
//! from the commerce backend's raw response.

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod format;
pub mod raw;
pub mod status;
pub mod transform;

pub use format::Locale;
pub use status::StatusType;
pub use transform::{transform, TransformContext};

/// Preview window sizes. The summary query asks for exactly this many edges
/// and the transformer never keeps more.
pub const ADDRESS_PREVIEW: usize = 1;
pub const ORDER_PREVIEW: usize = 3;
pub const WISHLIST_PREVIEW: usize = 3;

/// Number of steps counted towards account completion.
pub const COMPLETION_STEPS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreview {
    pub id: String,
    pub order_number: String,
    /// Locale-formatted order date.
    pub date: String,
    /// Currency-formatted order total.
    pub total: String,
    /// Status label as reported by the backend.
    pub status: String,
    pub status_type: StatusType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPreview {
    pub full_name: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistPreview {
    pub id: String,
    pub name: String,
    pub item_count: u64,
    pub is_public: bool,
    /// Stubbed to the transform time; the backend exposes no modification date.
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrdersSummary {
    /// Most recent first, in source order. At most [`ORDER_PREVIEW`] entries.
    pub recent: Vec<OrderPreview>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressesSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<AddressPreview>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WishlistsSummary {
    pub recent: Vec<WishlistPreview>,
    pub total_count: u64,
    /// Sum of item counts over `recent` only, not the whole collection.
    pub total_items: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub has_completed_profile: bool,
    pub has_addresses: bool,
    pub has_orders: bool,
    pub completion_percentage: u8,
}

impl AccountStatus {
    pub fn from_steps(has_completed_profile: bool, has_addresses: bool, has_orders: bool) -> Self {
        let done = [has_completed_profile, has_addresses, has_orders]
            .iter()
            .filter(|s| **s)
            .count() as u32;
        Self {
            has_completed_profile,
            has_addresses,
            has_orders,
            completion_percentage: completion_percentage(done),
        }
    }

    pub fn completed_steps(&self) -> u32 {
        [self.has_completed_profile, self.has_addresses, self.has_orders]
            .iter()
            .filter(|s| **s)
            .count() as u32
    }

    pub fn remaining_steps(&self) -> u32 {
        COMPLETION_STEPS - self.completed_steps()
    }
}

/// `round(100 * done / 3)`, clamped to the step count.
pub fn completion_percentage(done: u32) -> u8 {
    let done = done.min(COMPLETION_STEPS) as f64;
    (done * 100.0 / COMPLETION_STEPS as f64).round() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Flat, UI-ready account dashboard aggregate. Immutable once built; a
/// refresh replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub orders_summary: OrdersSummary,
    pub addresses_summary: AddressesSummary,
    pub wishlists_summary: WishlistsSummary,
    pub account_status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<CustomerInfo>,
}

impl DashboardSummary {
    /// Zeroed summary served to anonymous visitors and in place of failed fetches.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Customer session access token. Debug output is redacted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// `None` for blank tokens: an empty session is the anonymous state.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

pub mod prelude {
    pub use super::{
        AccountStatus, AddressPreview, AddressesSummary, Credential, CustomerInfo, DashboardSummary, Locale,
        OrderPreview, OrdersSummary, StatusType, TransformContext, WishlistPreview,
        WishlistsSummary,
    };
}
