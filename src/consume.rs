//! Consumer read loop.

use crate::prompt::{write_line, DIVIDER};
use crate::retry::RetryPolicy;
use colored::Colorize;
use kafka_client::MessageSource;
use std::io;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Pull messages and print their values until `shutdown` is cancelled.
///
/// Read errors never end the loop: each one is logged and followed by the
/// policy's delay before the next attempt.
pub async fn run_consumer<S, W>(
    source: &mut S,
    retry: &RetryPolicy,
    out: &mut W,
    shutdown: &CancellationToken,
) -> io::Result<()>
where
    S: MessageSource + ?Sized,
    W: AsyncWrite + Unpin,
{
    let mut failures: u32 = 0;
    loop {
        write_line(out, DIVIDER.blue()).await?;

        let pulled = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            pulled = source.pull() => pulled,
        };

        match pulled {
            Ok(message) => {
                failures = 0;
                write_line(out, message.value_lossy()).await?;
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                let delay = retry.delay(failures);
                warn!(
                    failures,
                    "Reading failed! Retry in {:.1}s (Error: {e})",
                    delay.as_secs_f64()
                );
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
