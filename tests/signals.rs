//! Signal handling test.
//!
//! Kept in its own test binary: the raised signal reaches every listener in the process.
#![cfg(unix)]

use kafka_simple_client::shutdown::{wait, Signals, Trigger};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_hangup_signal_cancels_shutdown() {
    let mut signals = Signals::new().unwrap();
    let shutdown = CancellationToken::new();

    // SAFETY: raising a signal whose handler was installed above.
    let raised = unsafe { libc::raise(libc::SIGHUP) };
    assert_eq!(raised, 0);

    let trigger = tokio::time::timeout(Duration::from_secs(5), wait(&mut signals, &shutdown))
        .await
        .expect("signal should be observed")
        .unwrap();

    assert_eq!(trigger, Trigger::Signal("SIGHUP"));
    assert!(shutdown.is_cancelled());
}
