#![forbid(unsafe_code)]

use askama::Template;
use shopdash_core::{DashboardSummary, OrderPreview, StatusType, WishlistPreview};

/// Badge colour for an order status.
pub fn status_color(status: StatusType) -> &'static str {
    match status {
        StatusType::Pending => "amber",
        StatusType::Processing => "blue",
        StatusType::Shipped => "indigo",
        StatusType::Delivered => "green",
        StatusType::Cancelled => "red",
    }
}

#[derive(Template)]
#[template(path = "skeleton.html")]
struct SkeletonTemplate {
    name: &'static str,
    rows: usize,
}

pub fn skeleton(name: &'static str, rows: usize) -> askama::Result<String> {
    SkeletonTemplate { name, rows }.render()
}

#[derive(Template)]
#[template(path = "section_error.html")]
struct SectionErrorTemplate;

pub fn section_error() -> askama::Result<String> {
    SectionErrorTemplate.render()
}

struct StatCard {
    href: &'static str,
    value: String,
    label: &'static str,
}

#[derive(Template)]
#[template(path = "stat_cards.html")]
struct StatCardsTemplate {
    cards: [StatCard; 4],
}

pub fn stat_cards(s: &DashboardSummary) -> askama::Result<String> {
    let cards = [
        StatCard { href: "/account/orders", value: s.orders_summary.total_count.to_string(), label: "Orders" },
        StatCard { href: "/account/addresses", value: s.addresses_summary.total_count.to_string(), label: "Addresses" },
        StatCard { href: "/account/wishlists", value: s.wishlists_summary.total_count.to_string(), label: "Wishlists" },
        StatCard {
            href: "/account/settings",
            value: format!("{}%", s.account_status.completion_percentage),
            label: "Profile complete",
        },
    ];
    StatCardsTemplate { cards }.render()
}

struct OrderRow<'a> {
    order_number: &'a str,
    date: &'a str,
    total: &'a str,
    status: &'a str,
    status_type: StatusType,
    color: &'static str,
}

impl<'a> From<&'a OrderPreview> for OrderRow<'a> {
    fn from(o: &'a OrderPreview) -> Self {
        Self {
            order_number: &o.order_number,
            date: &o.date,
            total: &o.total,
            status: &o.status,
            status_type: o.status_type,
            color: status_color(o.status_type),
        }
    }
}

#[derive(Template)]
#[template(path = "recent_orders.html")]
struct RecentOrdersTemplate<'a> {
    orders: Vec<OrderRow<'a>>,
    total: u64,
}

pub fn recent_orders(s: &DashboardSummary) -> askama::Result<String> {
    let orders = s.orders_summary.recent.iter().map(OrderRow::from).collect();
    RecentOrdersTemplate { orders, total: s.orders_summary.total_count }.render()
}

struct ChecklistItem {
    label: &'static str,
    done: bool,
}

#[derive(Template)]
#[template(path = "account_status.html")]
struct AccountStatusTemplate<'a> {
    email: Option<&'a str>,
    percent: u8,
    checklist: [ChecklistItem; 3],
}

pub fn account_status(s: &DashboardSummary) -> askama::Result<String> {
    let st = &s.account_status;
    AccountStatusTemplate {
        email: s.customer_info.as_ref().map(|c| c.email.as_str()).filter(|e| !e.is_empty()),
        percent: st.completion_percentage,
        checklist: [
            ChecklistItem { label: "Complete your profile", done: st.has_completed_profile },
            ChecklistItem { label: "Add a shipping address", done: st.has_addresses },
            ChecklistItem { label: "Place your first order", done: st.has_orders },
        ],
    }
    .render()
}

#[derive(Template)]
#[template(path = "wishlists.html")]
struct WishlistsTemplate<'a> {
    wishlists: &'a [WishlistPreview],
}

/// Wishlist preview cards; renders nothing at all when there are none.
pub fn wishlists(s: &DashboardSummary) -> askama::Result<String> {
    let recent = &s.wishlists_summary.recent;
    if recent.is_empty() {
        return Ok(String::new());
    }
    WishlistsTemplate { wishlists: recent }.render()
}
