use crate::error::{Error, Result};
use crate::{bootstrap_servers, MessageSink};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as RdkafkaProducer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, warn};

/// Default time a message may take to be acknowledged.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// When `push` returns relative to the broker acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Wait for the broker to acknowledge every message.
    #[default]
    Sync,
    /// Return once the message is queued; failures are only logged.
    Async,
}

/// Configuration for Kafka producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Kafka broker addresses (`host:port`)
    pub brokers: Vec<String>,
    /// Topic every message is written to
    pub topic: String,
    pub delivery: Delivery,
    /// Upper bound for delivering a message, retries included
    pub write_timeout: Duration,
}

impl ProducerConfig {
    pub fn new(brokers: Vec<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers,
            topic: topic.into(),
            delivery: Delivery::default(),
            write_timeout: WRITE_TIMEOUT,
        }
    }

    /// Build the librdkafka configuration for this producer.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let servers = bootstrap_servers(&self.brokers)?;
        if self.topic.is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }
        if self.write_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "write timeout must be greater than zero".to_string(),
            ));
        }

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", servers)
            .set(
                "message.timeout.ms",
                self.write_timeout.as_millis().to_string(),
            )
            .set("acks", "all");

        if self.delivery == Delivery::Sync {
            // Nothing to batch with while waiting on each acknowledgment.
            config.set("linger.ms", "0");
        }

        Ok(config)
    }
}

/// How long a single `push` may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushWait {
    /// Wait as long as delivery takes (bounded by the write timeout).
    Unbounded,
    /// Give up on the call after exactly this long.
    Bounded(Duration),
}

impl PushWait {
    /// A zero override means no per-call bound.
    pub fn from_override(timeout: Duration) -> Self {
        if timeout.is_zero() {
            PushWait::Unbounded
        } else {
            PushWait::Bounded(timeout)
        }
    }
}

/// Kafka producer writing to a single topic
pub struct Producer {
    inner: FutureProducer,
    topic: String,
    delivery: Delivery,
    write_timeout: Duration,
}

impl Producer {
    /// Create a new Kafka producer
    pub fn new(config: ProducerConfig) -> Result<Self> {
        let inner: FutureProducer = config
            .client_config()?
            .create()
            .map_err(|e| Error::Producer(format!("Failed to create producer: {e}")))?;

        Ok(Self {
            inner,
            topic: config.topic,
            delivery: config.delivery,
            write_timeout: config.write_timeout,
        })
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Write one message.
    ///
    /// A non-zero `timeout` bounds this call only; the bound is dropped when
    /// the call returns.
    pub async fn push(&self, key: Option<&[u8]>, value: &[u8], timeout: Duration) -> Result<()> {
        match PushWait::from_override(timeout) {
            PushWait::Unbounded => self.send(key, value, Timeout::Never).await,
            PushWait::Bounded(limit) => {
                tokio::time::timeout(limit, self.send(key, value, Timeout::After(limit)))
                    .await
                    .map_err(|_| Error::Timeout(limit))?
            }
        }
    }

    async fn send(&self, key: Option<&[u8]>, value: &[u8], queue_timeout: Timeout) -> Result<()> {
        let mut record: FutureRecord<'_, [u8], [u8]> = FutureRecord::to(&self.topic).payload(value);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.delivery {
            Delivery::Sync => {
                let (partition, offset) = self
                    .inner
                    .send(record, queue_timeout)
                    .await
                    .map_err(|(err, _)| err)?;
                debug!("Delivered message to {}[{partition}]@{offset}", self.topic);
            }
            Delivery::Async => {
                let delivery = self.inner.send_result(record).map_err(|(err, _)| err)?;
                let topic = self.topic.clone();
                tokio::spawn(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            debug!("Delivered message to {topic}[{partition}]@{offset}");
                        }
                        Ok(Err((err, _))) => warn!("Delivery to '{topic}' failed: {err}"),
                        Err(_) => warn!("Delivery to '{topic}' was cancelled"),
                    }
                });
            }
        }

        Ok(())
    }

    /// Flush queued messages and release the connection.
    pub fn close(self) -> Result<()> {
        self.inner.flush(self.write_timeout)?;
        debug!("Producer closed");
        Ok(())
    }
}

#[async_trait]
impl MessageSink for Producer {
    async fn push(&mut self, key: Option<&[u8]>, value: &[u8], timeout: Duration) -> Result<()> {
        Producer::push(self, key, value, timeout).await
    }
}
