//! Shopdash source – the one bounded read against the commerce backend.
//!
//! The query asks for collection totals plus a small preview window of each
//! collection; full lists belong to their own views.

#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;
use shopdash_core::raw::RawCustomer;
use shopdash_core::{Credential, ADDRESS_PREVIEW, ORDER_PREVIEW, WISHLIST_PREVIEW};
use tracing::{debug, info, warn};

/// GraphQL document for the dashboard summary. The field selection is
/// versioned with the backend schema.
pub fn summary_query() -> String {
    format!(
        r#"query DashboardSummary {{
  customer {{
    firstName
    lastName
    emailAddress {{ emailAddress }}
    addresses(first: {ADDRESS_PREVIEW}) {{
      totalCount
      edges {{ node {{ firstName lastName address1 city province zip }} }}
    }}
    orders(first: {ORDER_PREVIEW}, sortKey: PROCESSED_AT, reverse: true) {{
      totalCount
      edges {{ node {{ id number processedAt status totalPrice {{ amount currencyCode }} }} }}
    }}
    wishlists(first: {WISHLIST_PREVIEW}) {{
      totalCount
      edges {{ node {{ id name isPublic items {{ totalCount }} }} }}
    }}
  }}
}}"#
    )
}

/// Where raw summaries come from.
#[async_trait::async_trait]
pub trait SummarySource: Send + Sync {
    /// Issue the bounded summary read for one customer. Any failure is a
    /// single opaque error; callers substitute a safe default.
    async fn fetch_summary(&self, credential: &Credential) -> Result<RawCustomer>;
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<SummaryData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    #[serde(default)]
    customer: Option<RawCustomer>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Decode a GraphQL response body into the `customer` payload.
pub fn decode_response(body: &[u8]) -> Result<RawCustomer> {
    let resp: GraphqlResponse = serde_json::from_slice(body).context("decoding summary response")?;
    if !resp.errors.is_empty() {
        let msgs: Vec<&str> = resp.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(anyhow!("graphql errors: {}", msgs.join("; ")));
    }
    resp.data
        .and_then(|d| d.customer)
        .ok_or_else(|| anyhow!("response carried no customer"))
}

/// HTTP implementation posting the summary query to a GraphQL endpoint.
pub struct GraphqlSource {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait::async_trait]
impl SummarySource for GraphqlSource {
    async fn fetch_summary(&self, credential: &Credential) -> Result<RawCustomer> {
        let t0 = Instant::now();
        debug!(endpoint = %self.endpoint, "source: summary query start");
        let body = serde_json::json!({ "query": summary_query(), "variables": {} });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("posting summary query to {}", self.endpoint))?;
        let status = resp.status();
        let bytes = resp.bytes().await.context("reading summary response body")?;
        histogram!("source_query_ms", t0.elapsed().as_secs_f64() * 1000.0);
        if !status.is_success() {
            counter!("source_query_failed_total", 1u64);
            warn!(%status, "source: summary query rejected");
            return Err(anyhow!("summary query failed with http {}", status));
        }
        let customer = decode_response(&bytes).inspect_err(|_| {
            counter!("source_query_failed_total", 1u64);
        })?;
        info!(
            orders = customer.orders.total_count,
            addresses = customer.addresses.total_count,
            wishlists = customer.wishlists.total_count,
            took_ms = %t0.elapsed().as_millis(),
            "source: summary query ok"
        );
        Ok(customer)
    }
}

/// Serves a recorded response body; used for offline runs and demos.
pub struct FixtureSource {
    customer: RawCustomer,
}

impl FixtureSource {
    pub fn from_body(body: &[u8]) -> Result<Self> {
        Ok(Self { customer: decode_response(body)? })
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let body = std::fs::read(path).with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_body(&body)
    }
}

#[async_trait::async_trait]
impl SummarySource for FixtureSource {
    async fn fetch_summary(&self, _credential: &Credential) -> Result<RawCustomer> {
        Ok(self.customer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_preview_bounds() {
        let q = summary_query();
        assert!(q.contains("addresses(first: 1)"));
        assert!(q.contains("orders(first: 3"));
        assert!(q.contains("wishlists(first: 3)"));
        assert!(q.contains("totalCount"));
    }

    #[test]
    fn graphql_errors_fail_the_fetch() {
        let body = br#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"again"}]}"#;
        let err = decode_response(body).unwrap_err();
        assert_eq!(err.to_string(), "graphql errors: Unauthorized; again");
    }

    #[test]
    fn missing_customer_is_an_error() {
        let err = decode_response(br#"{"data":{"customer":null}}"#).unwrap_err();
        assert!(err.to_string().contains("no customer"));
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(decode_response(b"<html>").is_err());
    }
}
