#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use shopdash_api::{defer_summary, DashboardApi, DashboardError, Deferred, MockApi, Phase, RequestContext};
use shopdash_core::{AccountStatus, Credential, DashboardSummary, Locale};

fn summary() -> DashboardSummary {
    DashboardSummary { account_status: AccountStatus::from_steps(true, true, false), ..DashboardSummary::empty() }
}

fn cx() -> Arc<RequestContext> {
    Arc::new(RequestContext::new(Credential::new("alice"), Locale::EnUs))
}

#[tokio::test(start_paused = true)]
async fn subscribers_fan_out_to_the_same_value() {
    let api: Arc<dyn DashboardApi> =
        Arc::new(MockApi::with_summary(summary()).delayed(Duration::from_millis(500)));
    let deferred = defer_summary(api, cx());
    let mut subs: Vec<_> = (0..3).map(|_| deferred.subscribe()).collect();
    assert!(subs.iter().all(|s| s.phase().is_loading()));

    let mut got = Vec::new();
    for s in subs.iter_mut() {
        match s.settled().await {
            Some(Phase::Resolved(v)) => got.push(v),
            other => panic!("unexpected phase: {other:?}"),
        }
    }
    assert_eq!(got[0].account_status.completion_percentage, 67);
    assert!(got.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[tokio::test]
async fn rejected_accessor_becomes_failed_phase() {
    let api: Arc<dyn DashboardApi> =
        Arc::new(MockApi::failing(DashboardError::Internal("backend down".into())));
    let deferred = defer_summary(api, cx());
    let mut sub = deferred.subscribe();
    match sub.settled().await {
        Some(Phase::Failed(msg)) => assert!(msg.contains("backend down")),
        other => panic!("unexpected phase: {other:?}"),
    }
}

#[tokio::test]
async fn empty_summary_is_resolved_not_failed() {
    let api: Arc<dyn DashboardApi> = Arc::new(MockApi::default());
    let deferred = defer_summary(api, Arc::new(RequestContext::anonymous(Locale::EnUs)));
    let phase = deferred.subscribe().settled().await.unwrap();
    assert!(phase.resolved().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelled_deferred_gives_no_update() {
    let api: Arc<dyn DashboardApi> =
        Arc::new(MockApi::with_summary(summary()).delayed(Duration::from_secs(5)));
    let deferred = defer_summary(api, cx());
    let mut sub = deferred.subscribe();
    deferred.cancel();
    assert!(sub.settled().await.is_none());
    assert!(sub.phase().is_loading());
}

#[tokio::test]
async fn panicking_producer_fails() {
    let deferred: Deferred<u8> = Deferred::spawn(async {
        if true {
            panic!("transform bug");
        }
        Ok(Arc::new(1u8))
    });
    let phase = deferred.subscribe().settled().await.unwrap();
    assert!(matches!(phase, Phase::Failed(_)));
}

#[tokio::test]
async fn ready_value_settles_immediately() {
    let deferred = Deferred::ready(Arc::new(summary()));
    let mut sub = deferred.subscribe();
    drop(deferred);
    let phase = sub.settled().await.unwrap();
    assert_eq!(phase.resolved().unwrap().account_status.completion_percentage, 67);
}
