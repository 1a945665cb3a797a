//! Pure shaping of the raw `customer` payload into a [`DashboardSummary`].

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};

use crate::format::{format_currency, format_date, parse_amount, Locale};
use crate::raw::{RawAddress, RawCustomer, RawOrder, RawWishlist};
use crate::{
    AccountStatus, AddressPreview, AddressesSummary, CustomerInfo, DashboardSummary, OrderPreview,
    OrdersSummary, StatusType, WishlistPreview, WishlistsSummary, ADDRESS_PREVIEW, ORDER_PREVIEW,
    WISHLIST_PREVIEW,
};

/// Inputs the transform needs besides the payload. `now` is the only clock
/// the transform reads.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext {
    pub locale: Locale,
    pub now: DateTime<Utc>,
}

impl TransformContext {
    pub fn new(locale: Locale) -> Self {
        Self { locale, now: Utc::now() }
    }
}

pub fn transform(raw: &RawCustomer, cx: &TransformContext) -> DashboardSummary {
    let first_name = present(raw.first_name.as_deref());
    let last_name = present(raw.last_name.as_deref());
    let email = present(raw.email());

    let customer_info = match (first_name, last_name, email) {
        (Some(f), Some(l), Some(e)) => Some(CustomerInfo {
            first_name: f.to_string(),
            last_name: l.to_string(),
            email: e.to_string(),
        }),
        _ => None,
    };

    let orders_summary = OrdersSummary {
        recent: raw
            .orders
            .nodes()
            .take(ORDER_PREVIEW)
            .map(|o| order_preview(o, cx.locale))
            .collect(),
        total_count: raw.orders.total_count,
    };

    let addresses_summary = AddressesSummary {
        primary: raw.addresses.nodes().take(ADDRESS_PREVIEW).next().map(address_preview),
        total_count: raw.addresses.total_count,
    };

    let recent_wishlists: Vec<WishlistPreview> = raw
        .wishlists
        .nodes()
        .take(WISHLIST_PREVIEW)
        .map(|w| wishlist_preview(w, cx.now))
        .collect();
    let wishlists_summary = WishlistsSummary {
        total_items: recent_wishlists.iter().map(|w| w.item_count).sum(),
        recent: recent_wishlists,
        total_count: raw.wishlists.total_count,
    };

    let account_status = AccountStatus::from_steps(
        customer_info.is_some(),
        addresses_summary.total_count > 0,
        orders_summary.total_count > 0,
    );

    DashboardSummary {
        orders_summary,
        addresses_summary,
        wishlists_summary,
        account_status,
        customer_info,
    }
}

// Identity fields count when set and not "", whitespace included; values are kept as sent.
fn present(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn order_preview(o: &RawOrder, locale: Locale) -> OrderPreview {
    let status = o.status.clone().unwrap_or_else(|| "Pending".to_string());
    let total = match &o.total_price {
        Some(m) => match parse_amount(&m.amount) {
            Some(amount) => format_currency(amount, &m.currency_code, locale),
            None => format!("{} {}", m.amount, m.currency_code),
        },
        None => String::new(),
    };
    OrderPreview {
        id: o.id.clone(),
        order_number: o
            .number
            .map(|n| n.to_string())
            .unwrap_or_else(|| id_tail(&o.id).to_string()),
        date: o
            .processed_at
            .as_deref()
            .map(|d| format_date(d, locale))
            .unwrap_or_default(),
        total,
        status_type: StatusType::classify(&status),
        status,
    }
}

// "gid://shop/Order/1001" -> "1001"
fn id_tail(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

fn address_preview(a: &RawAddress) -> AddressPreview {
    let full_name = [a.first_name.as_deref(), a.last_name.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect::<Vec<_>>()
        .join(" ");
    AddressPreview {
        full_name,
        address_line1: a.address1.clone().unwrap_or_default(),
        city: a.city.clone().unwrap_or_default(),
        state: a.province.clone().unwrap_or_default(),
        zip_code: a.zip.clone().unwrap_or_default(),
    }
}

fn wishlist_preview(w: &RawWishlist, now: DateTime<Utc>) -> WishlistPreview {
    WishlistPreview {
        id: w.id.clone(),
        name: w.name.clone().unwrap_or_default(),
        item_count: w.items.total_count,
        is_public: w.is_public,
        // TODO: source from the backend once wishlists expose an updatedAt field.
        last_modified: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cx() -> TransformContext {
        TransformContext { locale: Locale::EnUs, now: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }
    }

    fn customer(v: serde_json::Value) -> RawCustomer {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn shapes_orders_with_status_money_and_date() {
        let raw = customer(serde_json::json!({
            "orders": { "totalCount": 1, "edges": [ { "node": {
                "id": "gid://shop/Order/77", "number": 1001,
                "processedAt": "2024-05-02T09:30:00Z", "status": "In Transit",
                "totalPrice": { "amount": "49.9", "currencyCode": "EUR" }
            } } ] }
        }));
        let s = transform(&raw, &TransformContext { locale: Locale::DeDe, ..cx() });
        let o = &s.orders_summary.recent[0];
        assert_eq!(o.order_number, "1001");
        assert_eq!(o.date, "2.5.2024");
        assert_eq!(o.total, "49,90\u{a0}€");
        assert_eq!(o.status, "In Transit");
        assert_eq!(o.status_type, StatusType::Shipped);
    }

    #[test]
    fn order_number_falls_back_to_id_tail() {
        let raw = customer(serde_json::json!({
            "orders": { "totalCount": 1, "edges": [ { "node": { "id": "gid://shop/Order/42" } } ] }
        }));
        let s = transform(&raw, &cx());
        assert_eq!(s.orders_summary.recent[0].order_number, "42");
        assert_eq!(s.orders_summary.recent[0].status_type, StatusType::Pending);
    }

    #[test]
    fn whitespace_only_name_still_counts() {
        let raw = customer(serde_json::json!({
            "firstName": "Ada", "lastName": " ", "emailAddress": { "emailAddress": "ada@example.com" }
        }));
        let s = transform(&raw, &cx());
        assert!(s.account_status.has_completed_profile);
        let info = s.customer_info.unwrap();
        assert_eq!(info.last_name, " ");
        assert_eq!(info.first_name, "Ada");
    }

    #[test]
    fn empty_string_name_is_not_complete() {
        let raw = customer(serde_json::json!({
            "firstName": "", "lastName": "Lovelace", "emailAddress": { "emailAddress": "ada@example.com" }
        }));
        let s = transform(&raw, &cx());
        assert!(!s.account_status.has_completed_profile);
        assert!(s.customer_info.is_none());
    }

    #[test]
    fn wishlist_items_are_summed_over_preview_only() {
        let raw = customer(serde_json::json!({
            "wishlists": { "totalCount": 5, "edges": [
                { "node": { "id": "w1", "name": "A", "isPublic": true,  "items": { "totalCount": 2 } } },
                { "node": { "id": "w2", "name": "B", "isPublic": false, "items": { "totalCount": 3 } } },
                { "node": { "id": "w3", "name": "C", "isPublic": false, "items": { "totalCount": 4 } } },
                { "node": { "id": "w4", "name": "D", "isPublic": false, "items": { "totalCount": 100 } } }
            ] }
        }));
        let s = transform(&raw, &cx());
        assert_eq!(s.wishlists_summary.recent.len(), 3);
        assert_eq!(s.wishlists_summary.total_items, 9);
        assert_eq!(s.wishlists_summary.total_count, 5);
        assert!(s.wishlists_summary.recent[0].is_public);
        assert_eq!(s.wishlists_summary.recent[0].last_modified, cx().now);
    }

    #[test]
    fn primary_address_is_first_edge() {
        let raw = customer(serde_json::json!({
            "addresses": { "totalCount": 2, "edges": [
                { "node": { "firstName": "Ada", "lastName": "Lovelace", "address1": "1 Main St",
                            "city": "Springfield", "province": "IL", "zip": "62701" } },
                { "node": { "firstName": "Other", "city": "Elsewhere" } }
            ] }
        }));
        let s = transform(&raw, &cx());
        let p = s.addresses_summary.primary.unwrap();
        assert_eq!(p.full_name, "Ada Lovelace");
        assert_eq!(p.city, "Springfield");
        assert_eq!(p.state, "IL");
        assert_eq!(p.zip_code, "62701");
        assert!(s.account_status.has_addresses);
    }
}
