//! Producer write loop.

use crate::prompt::{write_line, InputLines, DIVIDER, SENT_DIVIDER};
use colored::Colorize;
use kafka_client::MessageSink;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Outcome of a producer session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProduceSummary {
    pub sent: u64,
    pub failed: u64,
}

/// Push every input line as one message until input ends or `shutdown` is cancelled.
///
/// Lines are pushed as raw bytes, whatever their encoding.
/// A failed push is logged and the line is dropped; the loop carries on with
/// the next line. `acknowledged` selects the separator printed after a
/// successful push.
pub async fn run_producer<S, R, W>(
    sink: &mut S,
    lines: &mut InputLines<R>,
    out: &mut W,
    push_timeout: Duration,
    acknowledged: bool,
    shutdown: &CancellationToken,
) -> io::Result<ProduceSummary>
where
    S: MessageSink + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ProduceSummary::default();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let pushed = tokio::select! {
            _ = shutdown.cancelled() => break,
            pushed = sink.push(None, &line, push_timeout) => pushed,
        };

        match pushed {
            Ok(()) => {
                summary.sent += 1;
                let separator = if acknowledged { SENT_DIVIDER } else { DIVIDER };
                write_line(out, separator.blue()).await?;
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    "Writing failed! (Error: {e}) (Msg: {})",
                    String::from_utf8_lossy(&line)
                );
            }
        }
    }
    Ok(summary)
}
