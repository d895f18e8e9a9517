//! Thin Kafka client used by `kafka-simple-client`.
//!
//! Wraps one rdkafka consumer or producer behind a minimal interface:
//!
//! - [`Consumer::pull`] waits for the next message of a topic
//! - [`Producer::push`] writes one message, optionally bounded by a per-call timeout
//! - `close` releases the connection and can only be called once
//!
//! Partitioning, rebalancing, acknowledgments and client-side retries are
//! left to librdkafka.
//!
//! The run loops are written against [`MessageSource`] and [`MessageSink`]
//! rather than the concrete wrappers, so they can be driven without a broker.

use async_trait::async_trait;
use std::time::Duration;

pub mod consumer;
pub mod error;
pub mod message;
pub mod producer;

pub use consumer::{Consumer, ConsumerConfig, MAX_FETCH_BYTES, MIN_FETCH_BYTES, REBALANCE_TIMEOUT};
pub use error::{Error, Result};
pub use message::Message;
pub use producer::{Delivery, Producer, ProducerConfig, PushWait, WRITE_TIMEOUT};

/// Something messages can be pulled from, one at a time.
#[async_trait]
pub trait MessageSource: Send {
    async fn pull(&mut self) -> Result<Message>;
}

/// Something messages can be pushed to, one at a time.
#[async_trait]
pub trait MessageSink: Send {
    /// `timeout` of zero means the call is not bounded.
    async fn push(&mut self, key: Option<&[u8]>, value: &[u8], timeout: Duration) -> Result<()>;
}

/// Join broker addresses into librdkafka's `bootstrap.servers` form.
pub(crate) fn bootstrap_servers(brokers: &[String]) -> Result<String> {
    if brokers.is_empty() {
        return Err(Error::InvalidConfig(
            "at least one broker address is required".to_string(),
        ));
    }
    if let Some(blank) = brokers.iter().position(|b| b.trim().is_empty()) {
        return Err(Error::InvalidConfig(format!(
            "broker address #{} is empty",
            blank + 1
        )));
    }
    Ok(brokers.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_servers_keeps_order() {
        let brokers = vec!["b:9092".to_string(), "a:9092".to_string()];
        assert_eq!(bootstrap_servers(&brokers).unwrap(), "b:9092,a:9092");
    }

    #[test]
    fn test_bootstrap_servers_rejects_blank_entries() {
        let brokers = vec!["a:9092".to_string(), "  ".to_string()];
        let err = bootstrap_servers(&brokers).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: broker address #2 is empty"
        );
    }
}
