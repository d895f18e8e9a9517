//! Line-based terminal prompt.
//!
//! Reads answers from any async buffered reader and writes prompts to any
//! async writer, so the interactive flow can be driven from byte slices in
//! tests and from stdin/stdout in the binary.

use std::fmt::Display;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Split};

pub const RULE: &str = "==================================================";
pub const DIVIDER: &str = "--------------------------------------------------";
pub const SENT_DIVIDER: &str = "-----------------------Sent-----------------------";

/// Newline-separated input kept as raw bytes.
///
/// A trailing `\r` is removed from each line. Invalid UTF-8 is passed through
/// untouched.
pub struct InputLines<R> {
    inner: Split<R>,
}

impl<R> InputLines<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(input: R) -> Self {
        Self {
            inner: input.split(b'\n'),
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    pub async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let Some(mut line) = self.inner.next_segment().await? else {
            return Ok(None);
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

pub struct Prompt<R, W> {
    lines: InputLines<R>,
    out: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: InputLines::new(input),
            out,
        }
    }

    /// Print one line.
    pub async fn say(&mut self, text: impl Display) -> io::Result<()> {
        write_line(&mut self.out, text).await
    }

    /// Read one line with surrounding whitespace removed.
    ///
    /// Returns `None` at end of input. Bytes that are not valid UTF-8 are
    /// replaced rather than rejected.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Print `label` without a newline and read the answer.
    pub async fn ask(&mut self, label: impl Display) -> io::Result<Option<String>> {
        self.out.write_all(label.to_string().as_bytes()).await?;
        self.out.flush().await?;
        self.read_line().await
    }

    /// Give back the remaining input and the output, e.g. for the producer loop.
    pub fn into_parts(self) -> (InputLines<R>, W) {
        (self.lines, self.out)
    }
}

pub(crate) async fn write_line<W>(out: &mut W, text: impl Display) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(format!("{text}\n").as_bytes()).await?;
    out.flush().await
}
