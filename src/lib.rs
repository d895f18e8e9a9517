//! Interactive Kafka client for the terminal.
//!
//! Acts as either a consumer, printing every message value of a topic, or a
//! producer, publishing every line typed on stdin. Brokers, topic and group id
//! are asked for interactively unless given on the command line.
//!
//! # CLI Usage
//!
//! ```bash
//! # Pick the mode from a menu, answer the prompts
//! kafka-simple-client
//!
//! # Consume with everything preset
//! kafka-simple-client -c --brokers localhost:9092 --topic events --group-id cli
//!
//! # Produce lines from a file, giving up on any single write after 2 seconds
//! kafka-simple-client -p --brokers localhost:9092 --topic events --push-timeout 2s < lines.txt
//! ```
//!
//! Message framing, partitioning, rebalancing and delivery are handled by
//! librdkafka through the `kafka-client` crate.

use clap::Args;
use std::time::Duration;

pub mod config;
pub mod consume;
pub mod mode;
pub mod produce;
pub mod prompt;
pub mod retry;
pub mod session;
pub mod shutdown;

use config::parse_duration;
use kafka_client::Delivery;
use retry::RetryPolicy;

/// Connection parameters that skip the matching prompt when given.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionOpts {
    /// Kafka broker addresses (comma-separated, e.g. "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", value_delimiter = ',')]
    pub brokers: Vec<String>,

    /// Topic to consume from or produce to
    #[arg(long, env = "KAFKA_TOPIC")]
    pub topic: Option<String>,

    /// Consumer group ID (consumer only; empty reads partition 0 without a group)
    #[arg(long, env = "KAFKA_GROUP_ID")]
    pub group_id: Option<String>,
}

/// How the consumer waits between failed reads.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct RetryOpts {
    /// Delay after a failed read
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub retry_interval: Duration,

    /// Factor applied to the delay after each further consecutive failure
    #[arg(long, default_value_t = 1.0)]
    pub retry_multiplier: f64,

    /// Upper bound for the delay
    #[arg(long, default_value = "5m", value_parser = parse_duration)]
    pub retry_max_interval: Duration,
}

impl RetryOpts {
    pub fn policy(&self) -> anyhow::Result<RetryPolicy> {
        RetryPolicy::new(
            self.retry_interval,
            self.retry_multiplier,
            self.retry_max_interval,
        )
    }
}

/// Producer delivery options.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct ProducerOpts {
    /// Time a message may take to be acknowledged, retries included
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub write_timeout: Duration,

    /// Bound for each single write; 0 waits as long as delivery takes
    #[arg(long, default_value = "0", value_parser = parse_duration)]
    pub push_timeout: Duration,

    /// Return as soon as a message is queued instead of waiting for the acknowledgment
    #[arg(long = "async")]
    pub async_delivery: bool,
}

impl ProducerOpts {
    pub fn delivery(&self) -> Delivery {
        if self.async_delivery {
            Delivery::Async
        } else {
            Delivery::Sync
        }
    }
}
