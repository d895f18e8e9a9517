//! One interactive session: pick a mode, collect parameters, run the loop.

use crate::consume::run_consumer;
use crate::mode::{self, Mode};
use crate::produce::run_producer;
use crate::prompt::{Prompt, DIVIDER};
use crate::retry::RetryPolicy;
use crate::ConnectionOpts;
use anyhow::Context;
use colored::Colorize;
use kafka_client::{
    Consumer, ConsumerConfig, Delivery, Producer, ProducerConfig, WRITE_TIMEOUT,
};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything the session needs besides the terminal.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `-c/--consumer` was given
    pub consumer: bool,
    /// `-p/--producer` was given
    pub producer: bool,
    pub connection: ConnectionOpts,
    pub retry: RetryPolicy,
    pub write_timeout: Duration,
    /// Per-push bound; zero means unbounded
    pub push_timeout: Duration,
    pub delivery: Delivery,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            consumer: false,
            producer: false,
            connection: ConnectionOpts::default(),
            retry: RetryPolicy::default(),
            write_timeout: WRITE_TIMEOUT,
            push_timeout: Duration::ZERO,
            delivery: Delivery::Sync,
        }
    }
}

/// Run a session until its loop ends, input closes, or `shutdown` is cancelled.
///
/// `shutdown` is cancelled when this returns, so whoever waits on it learns
/// that the session is over. Client construction failures are returned as errors.
pub async fn run<R, W>(
    settings: Settings,
    mut prompt: Prompt<R, W>,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let _done = shutdown.clone().drop_guard();

    let selected = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        selected = mode::select_mode(settings.consumer, settings.producer, &mut prompt) => {
            selected?
        }
    };
    let Some(mode) = selected else {
        info!("Input closed before a mode was selected");
        return Ok(());
    };
    info!("Running as {mode}");

    match mode {
        Mode::Consumer => consume(&settings, prompt, &shutdown).await,
        Mode::Producer => produce(&settings, prompt, &shutdown).await,
    }
}

async fn consume<R, W>(
    settings: &Settings,
    mut prompt: Prompt<R, W>,
    shutdown: &CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let collected = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        collected = mode::collect_consumer_params(&mut prompt, &settings.connection) => collected?,
    };
    let Some(params) = collected else {
        info!("Input closed before consumer parameters were complete");
        return Ok(());
    };

    let config = ConsumerConfig::new(params.brokers, params.topic, params.group_id);
    let mut consumer = match Consumer::new(config) {
        Ok(consumer) => consumer,
        Err(e) => {
            prompt.say("Failed to create consumer.".red()).await?;
            return Err(e).context("Failed to create consumer");
        }
    };
    prompt.say("Kafka consumer is running...".yellow()).await?;

    let (_, mut out) = prompt.into_parts();
    let looped = run_consumer(&mut consumer, &settings.retry, &mut out, shutdown).await;
    let closed = consumer.close();
    looped.context("Failed to write consumed message")?;
    closed.context("Failed to close consumer")?;
    Ok(())
}

async fn produce<R, W>(
    settings: &Settings,
    mut prompt: Prompt<R, W>,
    shutdown: &CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let collected = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        collected = mode::collect_producer_params(&mut prompt, &settings.connection) => collected?,
    };
    let Some(params) = collected else {
        info!("Input closed before producer parameters were complete");
        return Ok(());
    };

    let mut config = ProducerConfig::new(params.brokers, params.topic);
    config.delivery = settings.delivery;
    config.write_timeout = settings.write_timeout;
    let mut producer = match Producer::new(config) {
        Ok(producer) => producer,
        Err(e) => {
            prompt.say("Failed to create producer.".red()).await?;
            return Err(e).context("Failed to create producer");
        }
    };
    prompt
        .say("Kafka producer is running... Input your messages.".yellow())
        .await?;
    prompt.say(DIVIDER.blue()).await?;

    let acknowledged = producer.delivery() == Delivery::Sync;
    let (mut lines, mut out) = prompt.into_parts();
    let looped = run_producer(
        &mut producer,
        &mut lines,
        &mut out,
        settings.push_timeout,
        acknowledged,
        shutdown,
    )
    .await;
    let closed = producer.close();
    let summary = looped.context("Failed to read message input")?;
    closed.context("Failed to close producer")?;
    info!(
        "Producer finished: {} sent, {} failed",
        summary.sent, summary.failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_brokers_fail_consumer_creation() {
        let prompt = Prompt::new(&b"1\n\nevents\ncli-group\n"[..], Vec::new());
        let shutdown = CancellationToken::new();

        let err = run(Settings::default(), prompt, shutdown.clone())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to create consumer"));
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_missing_brokers_fail_producer_creation() {
        let settings = Settings {
            producer: true,
            ..Settings::default()
        };
        let prompt = Prompt::new(&b"\nevents\n"[..], Vec::new());

        let err = run(settings, prompt, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to create producer"));
    }

    #[tokio::test]
    async fn test_end_of_input_ends_session() {
        let prompt = Prompt::new(&b"9\n"[..], Vec::new());
        let shutdown = CancellationToken::new();

        run(Settings::default(), prompt, shutdown.clone())
            .await
            .unwrap();

        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_waiting_prompt() {
        // Writer half stays open, so the menu would wait forever.
        let (_writer, reader) = tokio::io::duplex(64);
        let prompt = Prompt::new(tokio::io::BufReader::new(reader), Vec::new());
        let shutdown = CancellationToken::new();

        let session = tokio::spawn(run(Settings::default(), prompt, shutdown.clone()));
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), session)
            .await
            .expect("session should stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }
}
