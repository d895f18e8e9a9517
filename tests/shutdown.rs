//! Shutdown trigger tests.

use kafka_simple_client::shutdown::{wait, Signals, Trigger};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_session_end_releases_waiter() {
    let mut signals = Signals::new().unwrap();
    let shutdown = CancellationToken::new();

    let session = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _done = shutdown.drop_guard();
        })
    };

    let trigger = tokio::time::timeout(Duration::from_secs(5), wait(&mut signals, &shutdown))
        .await
        .expect("waiter should return once the session ends")
        .unwrap();

    assert_eq!(trigger, Trigger::SessionEnded);
    session.await.unwrap();
}
