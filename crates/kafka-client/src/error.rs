use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Producer error: {0}")]
    Producer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
