//! Mode selection and connection parameter collection.

use crate::prompt::{Prompt, DIVIDER, RULE};
use crate::ConnectionOpts;
use colored::Colorize;
use std::fmt;
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Consumer,
    Producer,
}

impl Mode {
    /// Mode requested on the command line, if exactly one flag is set.
    pub fn from_flags(consumer: bool, producer: bool) -> Option<Mode> {
        match (consumer, producer) {
            (true, false) => Some(Mode::Consumer),
            (false, true) => Some(Mode::Producer),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Consumer => write!(f, "consumer"),
            Mode::Producer => write!(f, "producer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerParams {
    pub brokers: Vec<String>,
    pub topic: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerParams {
    pub brokers: Vec<String>,
    pub topic: String,
}

/// Resolve the mode from the flags, falling back to the numbered menu.
///
/// The menu repeats until `1` or `2` is entered. Returns `None` if input ends first.
pub async fn select_mode<R, W>(
    consumer: bool,
    producer: bool,
    prompt: &mut Prompt<R, W>,
) -> io::Result<Option<Mode>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(mode) = Mode::from_flags(consumer, producer) {
        return Ok(Some(mode));
    }

    prompt
        .say("Please specify the flag: \n  either -c (consumer) or -p (producer)".red())
        .await?;
    loop {
        prompt
            .say("You can also select the mode by entering the number here:".cyan())
            .await?;
        prompt.say("  [1] Consumer\t[2] Producer".cyan()).await?;

        let Some(answer) = prompt.read_line().await? else {
            return Ok(None);
        };
        match answer.as_str() {
            "1" => return Ok(Some(Mode::Consumer)),
            "2" => return Ok(Some(Mode::Producer)),
            _ => prompt.say("Invalid input.".red()).await?,
        }
    }
}

/// Collect brokers, topic and group id, skipping anything already preset.
pub async fn collect_consumer_params<R, W>(
    prompt: &mut Prompt<R, W>,
    preset: &ConnectionOpts,
) -> io::Result<Option<ConsumerParams>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    prompt.say("Launching kafka consumer...".yellow()).await?;
    let Some((brokers, topic)) = collect_common(prompt, preset).await? else {
        return Ok(None);
    };
    prompt.say(DIVIDER.cyan()).await?;
    let Some(group_id) = field(prompt, "Group ID", preset.group_id.as_deref()).await? else {
        return Ok(None);
    };
    prompt.say(RULE.cyan()).await?;

    Ok(Some(ConsumerParams {
        brokers,
        topic,
        group_id,
    }))
}

/// Collect brokers and topic, skipping anything already preset.
pub async fn collect_producer_params<R, W>(
    prompt: &mut Prompt<R, W>,
    preset: &ConnectionOpts,
) -> io::Result<Option<ProducerParams>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    prompt.say("Launching kafka producer...".yellow()).await?;
    let Some((brokers, topic)) = collect_common(prompt, preset).await? else {
        return Ok(None);
    };
    prompt.say(RULE.cyan()).await?;

    Ok(Some(ProducerParams { brokers, topic }))
}

async fn collect_common<R, W>(
    prompt: &mut Prompt<R, W>,
    preset: &ConnectionOpts,
) -> io::Result<Option<(Vec<String>, String)>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    prompt.say(RULE.cyan()).await?;
    let Some(brokers) = brokers(prompt, &preset.brokers).await? else {
        return Ok(None);
    };
    prompt.say(DIVIDER.cyan()).await?;
    let Some(topic) = field(prompt, "Topic", preset.topic.as_deref()).await? else {
        return Ok(None);
    };
    Ok(Some((brokers, topic)))
}

async fn brokers<R, W>(
    prompt: &mut Prompt<R, W>,
    preset: &[String],
) -> io::Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !preset.is_empty() {
        for (i, broker) in preset.iter().enumerate() {
            prompt
                .say(format!("{}{broker}", format!("Broker [{}]: ", i + 1).cyan()))
                .await?;
        }
        return Ok(Some(preset.to_vec()));
    }

    prompt
        .say("(Press RETURN if there is no more to add)".cyan())
        .await?;
    let mut brokers = Vec::new();
    loop {
        let label = format!("Broker [{}]: ", brokers.len() + 1);
        match prompt.ask(label.cyan()).await? {
            None => return Ok(None),
            Some(input) if input.is_empty() => return Ok(Some(brokers)),
            Some(input) => brokers.push(input),
        }
    }
}

async fn field<R, W>(
    prompt: &mut Prompt<R, W>,
    name: &str,
    preset: Option<&str>,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let label = format!("{name}: ");
    match preset {
        Some(value) => {
            prompt.say(format!("{}{value}", label.cyan())).await?;
            Ok(Some(value.to_string()))
        }
        None => prompt.ask(label.cyan()).await,
    }
}
