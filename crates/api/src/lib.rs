//! Shopdash public API façade.
//!
//! Front ends (page renderer, CLI) depend on the [`DashboardApi`] trait and
//! never see the cache tiers or the remote source behind it.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use shopdash_core::raw::RawCustomer;
use shopdash_core::{transform, Credential, DashboardSummary, Locale, TransformContext};
use shopdash_source::{GraphqlSource, SummarySource};
use shopdash_store::{Memo, TtlCache};
use tracing::{debug, info, warn};
use uuid::Uuid;

mod config;
mod deferred;

pub use config::Config;
pub use deferred::{Deferred, Phase, Subscriber};

/// API errors. The summary path swallows fetch failures, so these reach
/// callers only when the accessor itself breaks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum DashboardError {
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Invalidation tags attached to cached summaries. Mutation flows (order
/// placement, address or wishlist edits) invalidate by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheTag {
    Customer,
    AccountDashboard,
}

impl CacheTag {
    pub const ALL: [CacheTag; 2] = [CacheTag::Customer, CacheTag::AccountDashboard];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::AccountDashboard => "account-dashboard",
        }
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheTag {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DashboardError::Config(format!("unknown cache tag: {}", s)))
    }
}

type SummaryResult = DashboardResult<Arc<DashboardSummary>>;

/// Everything one page render needs: who is asking, how to format, and the
/// request-scoped memo that keeps the render to a single fetch.
pub struct RequestContext {
    pub request_id: Uuid,
    pub credential: Option<Credential>,
    pub locale: Locale,
    memo: Memo<Credential, SummaryResult>,
}

impl RequestContext {
    pub fn new(credential: Option<Credential>, locale: Locale) -> Self {
        Self { request_id: Uuid::new_v4(), credential, locale, memo: Memo::new() }
    }

    pub fn anonymous(locale: Locale) -> Self {
        Self::new(None, locale)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// Declarative dashboard API surface.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// Summary for the request's customer. Anonymous requests and failed
    /// fetches both resolve to the zeroed summary.
    async fn dashboard_summary(&self, cx: &RequestContext) -> SummaryResult;

    /// Drop cached summaries carrying `tag`; returns how many were dropped.
    fn invalidate(&self, tag: CacheTag) -> usize;
}

/// Start resolving the request's summary without waiting for it.
pub fn defer_summary(api: Arc<dyn DashboardApi>, cx: Arc<RequestContext>) -> Deferred<DashboardSummary> {
    Deferred::spawn(async move { api.dashboard_summary(&cx).await })
}

// ----------------- In-process implementation -----------------

type CacheKey = (Credential, Locale);

/// In-process implementation: request memo in front of the shared TTL
/// cache in front of the remote source.
pub struct InProcApi {
    source: Arc<dyn SummarySource>,
    cache: Arc<TtlCache<CacheKey, DashboardSummary>>,
}

impl InProcApi {
    pub fn new(source: Arc<dyn SummarySource>, cache_ttl: Duration) -> Self {
        Self { source, cache: Arc::new(TtlCache::new(cache_ttl)) }
    }

    /// Build the GraphQL-backed API from configuration.
    pub fn from_config(cfg: &Config) -> DashboardResult<Self> {
        let endpoint = cfg
            .endpoint
            .clone()
            .ok_or_else(|| DashboardError::Config("SHOPDASH_ENDPOINT is not set".into()))?;
        let source = GraphqlSource::new(endpoint, cfg.request_timeout).map_err(Self::map_err)?;
        Ok(Self::new(Arc::new(source), cfg.cache_ttl))
    }

    fn map_err(e: anyhow::Error) -> DashboardError {
        DashboardError::Internal(format!("{:#}", e))
    }

    /// Entries held by the shared cache; expired ones count until swept.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    async fn fetch(source: &dyn SummarySource, credential: &Credential, locale: Locale) -> anyhow::Result<DashboardSummary> {
        let raw: RawCustomer = source.fetch_summary(credential).await?;
        Ok(transform(&raw, &TransformContext::new(locale)))
    }

    async fn load(
        source: Arc<dyn SummarySource>,
        cache: Arc<TtlCache<CacheKey, DashboardSummary>>,
        credential: Credential,
        locale: Locale,
    ) -> Arc<DashboardSummary> {
        let key = (credential, locale);
        if let Some(hit) = cache.get(&key) {
            counter!("dashboard_cache_hit_total", 1u64);
            debug!("api: summary served from cache");
            return hit;
        }
        counter!("dashboard_cache_miss_total", 1u64);
        let ticket = cache.ticket();
        let t0 = Instant::now();
        counter!("dashboard_fetch_total", 1u64);
        match Self::fetch(source.as_ref(), &key.0, locale).await {
            Ok(summary) => {
                histogram!("dashboard_fetch_ms", t0.elapsed().as_secs_f64() * 1000.0);
                let summary = Arc::new(summary);
                let tags = CacheTag::ALL.map(CacheTag::as_str);
                if !cache.insert(ticket, key, summary.clone(), &tags) {
                    debug!("api: summary invalidated mid-fetch; not cached");
                }
                summary
            }
            Err(e) => {
                counter!("dashboard_fetch_failed_total", 1u64);
                warn!(error = %format!("{:#}", e), took_ms = %t0.elapsed().as_millis(), "api: summary fetch failed; serving empty summary");
                Arc::new(DashboardSummary::empty())
            }
        }
    }
}

#[async_trait::async_trait]
impl DashboardApi for InProcApi {
    async fn dashboard_summary(&self, cx: &RequestContext) -> SummaryResult {
        let Some(credential) = cx.credential.clone() else {
            counter!("dashboard_anonymous_total", 1u64);
            debug!(request = %cx.request_id, "api: anonymous request; empty summary");
            return Ok(Arc::new(DashboardSummary::empty()));
        };
        let t0 = Instant::now();
        let source = self.source.clone();
        let cache = self.cache.clone();
        let locale = cx.locale;
        let shared = cx.memo.get_or_start(credential.clone(), move || async move {
            Ok(Self::load(source, cache, credential, locale).await)
        });
        let res = shared.await;
        info!(request = %cx.request_id, took_ms = %t0.elapsed().as_millis(), "api: summary ready");
        res
    }

    fn invalidate(&self, tag: CacheTag) -> usize {
        let removed = self.cache.invalidate_tag(tag.as_str());
        counter!("dashboard_invalidations_total", 1u64);
        info!(tag = %tag, removed, "api: cache invalidated");
        removed
    }
}

// ----------------- Mock implementation -----------------

/// Simple in-memory mock implementation for tests and front-end work.
pub struct MockApi {
    pub summary: DashboardSummary,
    pub fail: Option<DashboardError>,
    pub delay: Option<Duration>,
    calls: AtomicUsize,
}

impl Default for MockApi {
    fn default() -> Self {
        Self { summary: DashboardSummary::empty(), fail: None, delay: None, calls: AtomicUsize::new(0) }
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(summary: DashboardSummary) -> Self {
        Self { summary, ..Self::default() }
    }

    /// Every call fails with `err`.
    pub fn failing(err: DashboardError) -> Self {
        Self { fail: Some(err), ..Self::default() }
    }

    /// Sleep for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DashboardApi for MockApi {
    async fn dashboard_summary(&self, cx: &RequestContext) -> SummaryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if let Some(e) = &self.fail {
            return Err(e.clone());
        }
        if !cx.is_authenticated() {
            return Ok(Arc::new(DashboardSummary::empty()));
        }
        Ok(Arc::new(self.summary.clone()))
    }

    fn invalidate(&self, _tag: CacheTag) -> usize {
        0
    }
}
