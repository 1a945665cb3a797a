#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shopdash_store::Memo;

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_run() {
    let memo: Arc<Memo<String, Arc<String>>> = Arc::new(Memo::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let memo = memo.clone();
        let runs = runs.clone();
        handles.push(tokio::spawn(async move {
            memo.get_or_start("alice".to_string(), move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Arc::new("summary".to_string())
            })
            .await
        }));
    }
    let mut values = Vec::new();
    for h in handles {
        values.push(h.await.unwrap());
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[tokio::test]
async fn abandoned_awaiter_does_not_restart() {
    let memo: Memo<u8, u8> = Memo::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let r = runs.clone();
    let first = memo.get_or_start(1, move || async move {
        r.fetch_add(1, Ordering::SeqCst);
        5
    });
    drop(first);
    let r = runs.clone();
    let v = memo
        .get_or_start(1, move || async move {
            r.fetch_add(1, Ordering::SeqCst);
            9
        })
        .await;
    assert_eq!(v, 5);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
