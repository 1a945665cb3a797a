#![forbid(unsafe_code)]

use askama::Template;
use shopdash_core::DashboardSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BadgeSource {
    None,
    Orders,
    Addresses,
    Wishlists,
    Settings,
}

// Fixed account sections, in display order.
const SECTIONS: &[(&str, &str, BadgeSource)] = &[
    ("Dashboard", "/account", BadgeSource::None),
    ("Orders", "/account/orders", BadgeSource::Orders),
    ("Addresses", "/account/addresses", BadgeSource::Addresses),
    ("Wishlists", "/account/wishlists", BadgeSource::Wishlists),
    ("Settings", "/account/settings", BadgeSource::Settings),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub count: u64,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
    pub badge: Option<Badge>,
}

#[derive(Template)]
#[template(path = "sidebar.html")]
struct SidebarTemplate<'a> {
    links: &'a [NavLink],
}

fn badge(source: BadgeSource, s: &DashboardSummary) -> Option<Badge> {
    match source {
        BadgeSource::None => None,
        BadgeSource::Orders => Some(Badge {
            count: s.orders_summary.total_count,
            preview: match s.orders_summary.recent.first() {
                Some(o) => format!("Latest: #{}", o.order_number),
                None => "No orders yet".to_string(),
            },
        }),
        BadgeSource::Addresses => Some(Badge {
            count: s.addresses_summary.total_count,
            preview: match &s.addresses_summary.primary {
                Some(a) if !a.state.is_empty() => format!("{}, {}", a.city, a.state),
                Some(a) => a.city.clone(),
                None => "No saved addresses".to_string(),
            },
        }),
        BadgeSource::Wishlists => Some(Badge {
            count: s.wishlists_summary.total_count,
            preview: format!("{} items saved", s.wishlists_summary.total_items),
        }),
        BadgeSource::Settings => Some(Badge {
            count: s.account_status.remaining_steps() as u64,
            preview: format!("{}% complete", s.account_status.completion_percentage),
        }),
    }
}

/// Sidebar links for `current_path`, with badges only when a summary is at hand.
pub fn nav_links(summary: Option<&DashboardSummary>, current_path: &str) -> Vec<NavLink> {
    SECTIONS
        .iter()
        .map(|&(label, href, source)| NavLink {
            label,
            href,
            active: href == current_path,
            badge: summary.and_then(|s| badge(source, s)),
        })
        .collect()
}

pub fn render_sidebar(summary: Option<&DashboardSummary>, current_path: &str) -> askama::Result<String> {
    let links = nav_links(summary, current_path);
    SidebarTemplate { links: &links }.render()
}
