//! Kafka message type shared by the consumer wrapper and the run loops.

use chrono::{DateTime, Utc};
use rdkafka::message::{BorrowedMessage, Message as RdkafkaMessage};

/// A message read from a Kafka topic.
///
/// Owns its key and value so it can outlive the consumer's internal buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Message value. An absent payload is read as an empty value.
    pub value: Vec<u8>,
    /// Broker or producer timestamp (if available)
    pub timestamp: Option<DateTime<Utc>>,
    /// Kafka topic name
    pub topic: String,
    /// Kafka partition number
    pub partition: i32,
    /// Kafka offset within the partition
    pub offset: i64,
}

impl Message {
    /// Value decoded as UTF-8, replacing invalid sequences.
    pub fn value_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

impl<'a> From<&BorrowedMessage<'a>> for Message {
    fn from(msg: &BorrowedMessage<'a>) -> Self {
        Self {
            key: msg.key().map(|k| k.to_vec()),
            value: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
            timestamp: msg
                .timestamp()
                .to_millis()
                .and_then(DateTime::from_timestamp_millis),
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lossy_replaces_invalid_utf8() {
        let message = Message {
            key: None,
            value: vec![b'h', b'i', 0xff],
            timestamp: None,
            topic: "events".to_string(),
            partition: 0,
            offset: 7,
        };

        assert_eq!(message.value_lossy(), "hi\u{fffd}");
    }
}
