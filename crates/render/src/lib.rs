//! Shopdash page rendering.
//!
//! Every section is a pure function of the summary's [`Phase`]: a skeleton
//! while loading, the section body once resolved, an error notice if the
//! accessor failed. [`page_stream`] sends the shell first and then one slot
//! replacement per section as it settles.

#![forbid(unsafe_code)]

use std::sync::Arc;

use askama::Template;
use futures::future;
use futures::stream::{self, BoxStream, FuturesUnordered, StreamExt};
pub use shopdash_api::{Deferred, Phase};
use shopdash_core::{DashboardSummary, Locale};
use tracing::{debug, warn};

pub mod components;
pub mod nav;

/// Independently settling regions of the account page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Sidebar,
    StatCards,
    RecentOrders,
    AccountStatus,
    Wishlists,
}

impl Section {
    pub const ALL: [Section; 5] =
        [Section::Sidebar, Section::StatCards, Section::RecentOrders, Section::AccountStatus, Section::Wishlists];

    /// `data-slot` name in the page markup.
    pub const fn slot(self) -> &'static str {
        match self {
            Self::Sidebar => "sidebar",
            Self::StatCards => "stat-cards",
            Self::RecentOrders => "recent-orders",
            Self::AccountStatus => "account-status",
            Self::Wishlists => "wishlists",
        }
    }

    const fn skeleton_rows(self) -> usize {
        match self {
            Self::Sidebar => 5,
            Self::StatCards => 4,
            Self::RecentOrders => shopdash_core::ORDER_PREVIEW,
            Self::AccountStatus => 3,
            Self::Wishlists => shopdash_core::WISHLIST_PREVIEW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    /// Path of the page being rendered; marks the active sidebar link.
    pub current_path: String,
    pub locale: Locale,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self { title: "My account".to_string(), current_path: "/account".to_string(), locale: Locale::EnUs }
    }
}

/// Render one section for the given phase.
pub fn render_section(section: Section, phase: &Phase<DashboardSummary>, meta: &PageMeta) -> askama::Result<String> {
    match (section, phase) {
        (Section::Sidebar, Phase::Resolved(s)) => nav::render_sidebar(Some(s.as_ref()), &meta.current_path),
        // Links stay usable without a summary; only the badges are missing.
        (Section::Sidebar, _) => nav::render_sidebar(None, &meta.current_path),
        (_, Phase::Loading) => components::skeleton(section.slot(), section.skeleton_rows()),
        (_, Phase::Failed(_)) => components::section_error(),
        (Section::StatCards, Phase::Resolved(s)) => components::stat_cards(s),
        (Section::RecentOrders, Phase::Resolved(s)) => components::recent_orders(s),
        (Section::AccountStatus, Phase::Resolved(s)) => components::account_status(s),
        (Section::Wishlists, Phase::Resolved(s)) => components::wishlists(s),
    }
}

struct Slot {
    name: &'static str,
    html: String,
}

#[derive(Template)]
#[template(path = "shell.html")]
struct ShellTemplate<'a> {
    lang: &'static str,
    title: &'a str,
    sidebar: String,
    slots: Vec<Slot>,
}

#[derive(Template)]
#[template(path = "slot_update.html")]
struct SlotUpdateTemplate<'a> {
    name: &'static str,
    html: &'a str,
}

/// Closes what the shell opens.
pub const PAGE_CLOSE: &str = "</body>\n</html>\n";

/// Page head, sidebar and every main section rendered for `phase`. The
/// document is left open for slot updates; finish it with [`PAGE_CLOSE`].
pub fn render_shell(meta: &PageMeta, phase: &Phase<DashboardSummary>) -> askama::Result<String> {
    let sidebar = render_section(Section::Sidebar, phase, meta)?;
    let slots = Section::ALL[1..]
        .iter()
        .map(|&section| Ok(Slot { name: section.slot(), html: render_section(section, phase, meta)? }))
        .collect::<askama::Result<Vec<_>>>()?;
    ShellTemplate { lang: meta.locale.tag(), title: &meta.title, sidebar, slots }.render()
}

/// `<template data-slot=…>` chunk replacing one section's placeholder.
pub fn slot_update(section: Section, html: &str) -> askama::Result<String> {
    SlotUpdateTemplate { name: section.slot(), html }.render()
}

/// Whole page as a chunk stream.
///
/// The shell comes first, rendered from the deferred's current phase. If
/// that phase is still loading, each section then waits on its own
/// subscriber and yields a slot update as soon as it settles, without
/// waiting for its siblings. A deferred that is cancelled or dropped before
/// resolving produces no updates. The stream always ends with [`PAGE_CLOSE`].
pub fn page_stream(meta: PageMeta, deferred: &Deferred<DashboardSummary>) -> BoxStream<'static, askama::Result<String>> {
    let initial = deferred.phase();
    let shell = stream::once(future::ready(render_shell(&meta, &initial)));
    let close = stream::once(future::ready(Ok(PAGE_CLOSE.to_string())));
    if !initial.is_loading() {
        return shell.chain(close).boxed();
    }

    let meta = Arc::new(meta);
    let updates: FuturesUnordered<_> = Section::ALL
        .into_iter()
        .map(|section| {
            let mut sub = deferred.subscribe();
            let meta = meta.clone();
            async move {
                let Some(phase) = sub.settled().await else {
                    debug!(slot = section.slot(), "render: deferred cancelled; slot left as skeleton");
                    return None;
                };
                if let Phase::Failed(msg) = &phase {
                    warn!(slot = section.slot(), error = %msg, "render: section failed to load");
                }
                Some(render_section(section, &phase, &meta).and_then(|html| slot_update(section, &html)))
            }
        })
        .collect();
    shell.chain(updates.filter_map(future::ready)).chain(close).boxed()
}
