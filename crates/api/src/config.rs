#![forbid(unsafe_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shopdash_core::Locale;

use crate::{DashboardError, DashboardResult};

/// Runtime configuration, read from `SHOPDASH_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL endpoint of the commerce backend.
    pub endpoint: Option<String>,
    /// Shared cache window.
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub locale: Locale,
    /// Prometheus listener address (host:port), if any.
    pub metrics_addr: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            locale: Locale::EnUs,
            metrics_addr: None,
        }
    }
}

impl Config {
    pub fn from_env() -> DashboardResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> DashboardResult<Self> {
        let d = Self::default();
        let secs = |k: &str, dflt: Duration| get(k).and_then(|s| s.parse::<u64>().ok()).map(Duration::from_secs).unwrap_or(dflt);
        let locale = match get("SHOPDASH_LOCALE") {
            Some(s) => s.parse().map_err(|e| DashboardError::Config(format!("SHOPDASH_LOCALE: {}", e)))?,
            None => d.locale,
        };
        Ok(Self {
            endpoint: get("SHOPDASH_ENDPOINT").filter(|s| !s.trim().is_empty()),
            cache_ttl: secs("SHOPDASH_CACHE_TTL_SECS", d.cache_ttl),
            request_timeout: secs("SHOPDASH_TIMEOUT_SECS", d.request_timeout),
            locale,
            metrics_addr: get("SHOPDASH_METRICS_ADDR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_to_five_minute_window() {
        let c = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.cache_ttl, Duration::from_secs(300));
        assert_eq!(c.locale, Locale::EnUs);
        assert!(c.endpoint.is_none());
    }

    #[test]
    fn reads_overrides() {
        let c = Config::from_lookup(lookup(&[
            ("SHOPDASH_ENDPOINT", "https://shop.example/graphql"),
            ("SHOPDASH_CACHE_TTL_SECS", "60"),
            ("SHOPDASH_LOCALE", "de-DE"),
        ]))
        .unwrap();
        assert_eq!(c.endpoint.as_deref(), Some("https://shop.example/graphql"));
        assert_eq!(c.cache_ttl, Duration::from_secs(60));
        assert_eq!(c.locale, Locale::DeDe);
    }

    #[test]
    fn bad_numbers_fall_back_but_bad_locale_fails() {
        let c = Config::from_lookup(lookup(&[("SHOPDASH_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(c.request_timeout, Duration::from_secs(10));
        let err = Config::from_lookup(lookup(&[("SHOPDASH_LOCALE", "tlh")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
