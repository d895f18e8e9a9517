use crate::error::{Error, Result};
use crate::message::Message;
use crate::{bootstrap_servers, MessageSource};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as RdkafkaConsumer, StreamConsumer as RdkafkaStreamConsumer};
use rdkafka::{Offset, TopicPartitionList};
use std::time::Duration;
use tracing::{debug, info};

/// Smallest amount of data the broker should return for a fetch request.
pub const MIN_FETCH_BYTES: usize = 1;
/// Largest amount of data the broker should return for a fetch request (2 MiB).
pub const MAX_FETCH_BYTES: usize = 1 << 21;
pub const WATCH_PARTITION_CHANGES: bool = true;
/// How often topic metadata is refreshed while partition changes are watched.
pub const PARTITION_WATCH_INTERVAL: Duration = Duration::from_secs(5);
pub const REBALANCE_TIMEOUT: Duration = Duration::from_secs(30);

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for Kafka consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Kafka broker addresses (`host:port`)
    pub brokers: Vec<String>,
    /// Topic to consume from
    pub topic: String,
    /// Consumer group ID
    ///
    /// When empty, the consumer is not part of a group: it reads partition 0
    /// from the beginning and never commits offsets.
    pub group_id: String,
    pub min_bytes: usize,
    pub max_bytes: usize,
    /// Refresh topic metadata periodically so new partitions are picked up
    pub watch_partition_changes: bool,
    /// Time the group coordinator waits for members to rejoin during a rebalance
    ///
    /// librdkafka sends `max.poll.interval.ms` as the JoinGroup rebalance timeout.
    pub rebalance_timeout: Duration,
}

impl ConsumerConfig {
    pub fn new(
        brokers: Vec<String>,
        topic: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            brokers,
            topic: topic.into(),
            group_id: group_id.into(),
            min_bytes: MIN_FETCH_BYTES,
            max_bytes: MAX_FETCH_BYTES,
            watch_partition_changes: WATCH_PARTITION_CHANGES,
            rebalance_timeout: REBALANCE_TIMEOUT,
        }
    }

    fn has_group(&self) -> bool {
        !self.group_id.is_empty()
    }

    /// Build the librdkafka configuration for this consumer.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let servers = bootstrap_servers(&self.brokers)?;
        if self.topic.is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }

        let metadata_refresh = if self.watch_partition_changes {
            PARTITION_WATCH_INTERVAL.as_millis().to_string()
        } else {
            "-1".to_string()
        };
        let session_timeout = SESSION_TIMEOUT.min(self.rebalance_timeout);

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", servers)
            .set("fetch.min.bytes", self.min_bytes.to_string())
            .set("fetch.max.bytes", self.max_bytes.to_string())
            .set("topic.metadata.refresh.interval.ms", metadata_refresh)
            .set(
                "max.poll.interval.ms",
                self.rebalance_timeout.as_millis().to_string(),
            )
            .set("session.timeout.ms", session_timeout.as_millis().to_string())
            .set("auto.offset.reset", "earliest")
            .set("enable.partition.eof", "false");

        if self.has_group() {
            config
                .set("group.id", &self.group_id)
                .set("enable.auto.commit", "true");
        } else {
            config.set("enable.auto.commit", "false");
        }

        Ok(config)
    }
}

/// Kafka consumer reading one message at a time
pub struct Consumer {
    inner: RdkafkaStreamConsumer,
    grouped: bool,
}

impl Consumer {
    /// Create a new Kafka consumer and join its group (or assign partition 0).
    pub fn new(config: ConsumerConfig) -> Result<Self> {
        let inner: RdkafkaStreamConsumer = config
            .client_config()?
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        if config.has_group() {
            inner
                .subscribe(&[&config.topic])
                .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;
            info!(
                "Subscribed to topic '{}' as group '{}'",
                config.topic, config.group_id
            );
        } else {
            let mut tpl = TopicPartitionList::new();
            tpl.add_partition_offset(&config.topic, 0, Offset::Beginning)
                .map_err(|e| Error::Consumer(format!("Failed to add partition offset: {e}")))?;
            inner
                .assign(&tpl)
                .map_err(|e| Error::Consumer(format!("Failed to assign partition: {e}")))?;
            info!("Assigned partition 0 of topic '{}'", config.topic);
        }

        Ok(Self {
            inner,
            grouped: config.has_group(),
        })
    }

    /// Wait for the next message.
    ///
    /// Network, rebalance and broker errors are returned as they are.
    pub async fn pull(&self) -> Result<Message> {
        let msg = self.inner.recv().await?;
        let message = Message::from(&msg);
        debug!(
            "Received message at {}[{}]@{}",
            message.topic, message.partition, message.offset
        );
        Ok(message)
    }

    /// Leave the group (or drop the assignment) and release the connection.
    pub fn close(self) -> Result<()> {
        if self.grouped {
            self.inner.unsubscribe();
        } else {
            self.inner.unassign()?;
        }
        debug!("Consumer closed");
        Ok(())
    }
}

#[async_trait]
impl MessageSource for Consumer {
    async fn pull(&mut self) -> Result<Message> {
        Consumer::pull(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConsumerConfig {
        ConsumerConfig::new(
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()],
            "events",
            "cli-group",
        )
    }

    #[test]
    fn test_default_fetch_and_group_settings() {
        let client_config = config().client_config().unwrap();

        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(client_config.get("fetch.min.bytes"), Some("1"));
        assert_eq!(client_config.get("fetch.max.bytes"), Some("2097152"));
        assert_eq!(client_config.get("max.poll.interval.ms"), Some("30000"));
        assert_eq!(
            client_config.get("topic.metadata.refresh.interval.ms"),
            Some("5000")
        );
        assert_eq!(client_config.get("group.id"), Some("cli-group"));
        assert_eq!(client_config.get("enable.auto.commit"), Some("true"));
    }

    #[test]
    fn test_constants_match_expected_values() {
        let config = config();
        assert_eq!(config.min_bytes, 1);
        assert_eq!(config.max_bytes, 2_097_152);
        assert!(config.watch_partition_changes);
        assert_eq!(config.rebalance_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_session_timeout_never_exceeds_rebalance_timeout() {
        let mut config = config();
        config.rebalance_timeout = Duration::from_secs(4);

        let client_config = config.client_config().unwrap();
        assert_eq!(client_config.get("session.timeout.ms"), Some("4000"));
        assert_eq!(client_config.get("max.poll.interval.ms"), Some("4000"));
    }

    #[test]
    fn test_partition_watch_disabled() {
        let mut config = config();
        config.watch_partition_changes = false;

        let client_config = config.client_config().unwrap();
        assert_eq!(
            client_config.get("topic.metadata.refresh.interval.ms"),
            Some("-1")
        );
    }

    #[test]
    fn test_empty_group_id_disables_commits() {
        let config = ConsumerConfig::new(vec!["localhost:9092".to_string()], "events", "");

        let client_config = config.client_config().unwrap();
        assert_eq!(client_config.get("group.id"), None);
        assert_eq!(client_config.get("enable.auto.commit"), Some("false"));
    }

    #[test]
    fn test_empty_broker_list_is_rejected() {
        let config = ConsumerConfig::new(Vec::new(), "events", "cli-group");

        assert!(matches!(
            config.client_config(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(Consumer::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_topic_is_rejected() {
        let config = ConsumerConfig::new(vec!["localhost:9092".to_string()], "", "cli-group");

        assert!(matches!(
            config.client_config(),
            Err(Error::InvalidConfig(_))
        ));
    }
}
