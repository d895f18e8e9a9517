//! Command-line interface for kafka-simple-client
//!
//! # Usage Examples
//!
//! ```bash
//! # Interactive: choose consumer or producer from the menu
//! kafka-simple-client
//!
//! # Consumer, prompting for brokers, topic and group id
//! kafka-simple-client -c
//!
//! # Producer with brokers from the environment and async delivery
//! KAFKA_BROKERS=kafka-1:9092,kafka-2:9092 kafka-simple-client -p --topic events --async
//!
//! # Consumer backing off from 1s up to 1m while the cluster is unreachable
//! kafka-simple-client -c --retry-interval 1s --retry-multiplier 2 --retry-max-interval 1m
//! ```

use clap::Parser;
use colored::Colorize;
use kafka_simple_client::prompt::Prompt;
use kafka_simple_client::session::{self, Settings};
use kafka_simple_client::shutdown::{self, Signals, Trigger};
use kafka_simple_client::{ConnectionOpts, ProducerOpts, RetryOpts};
use std::time::Duration;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// How long the session gets to close its client after shutdown starts.
const CLOSE_GRACE: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "kafka-simple-client")]
#[command(about = "Consume from or produce to a Kafka topic from the terminal")]
#[command(long_about = None)]
struct Cli {
    /// Run as a consumer
    #[arg(short = 'c', long)]
    consumer: bool,

    /// Run as a producer
    #[arg(short = 'p', long)]
    producer: bool,

    #[command(flatten)]
    connection: ConnectionOpts,

    #[command(flatten)]
    retry: RetryOpts,

    #[command(flatten)]
    producer_opts: ProducerOpts,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings {
            consumer: self.consumer,
            producer: self.producer,
            connection: self.connection.clone(),
            retry: self.retry.policy()?,
            write_timeout: self.producer_opts.write_timeout,
            push_timeout: self.producer_opts.push_timeout,
            delivery: self.producer_opts.delivery(),
        })
    }
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", format!("Error: {e:#}").red());
            1
        }
    };
    println!("{}", "\nProgram exited.".red());
    // A stdin read may still be parked on a blocking thread; don't wait for it.
    std::process::exit(code);
}

async fn run() -> anyhow::Result<()> {
    // Diagnostics go to stderr, stdout carries prompts and messages
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    println!("{}", "kafka-simple-client".blue());

    let mut signals = Signals::new()?;
    let shutdown = CancellationToken::new();
    let prompt = Prompt::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let session = tokio::spawn(session::run(settings, prompt, shutdown.clone()));

    match shutdown::wait(&mut signals, &shutdown).await? {
        Trigger::Signal(name) => tracing::info!("Received {name}, shutting down"),
        Trigger::SessionEnded => tracing::debug!("Session ended"),
    }

    match tokio::time::timeout(CLOSE_GRACE, session).await {
        Ok(joined) => joined?,
        Err(_) => {
            tracing::warn!("Client did not close within {CLOSE_GRACE:?}");
            Ok(())
        }
    }
}
