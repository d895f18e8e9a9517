//! Process termination signals.

use std::io;
use tokio_util::sync::CancellationToken;

/// What ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A termination signal, by name.
    Signal(&'static str),
    /// The session finished on its own (end of input or startup failure).
    SessionEnded,
}

/// Listeners for SIGINT, SIGTERM, SIGHUP and SIGQUIT.
///
/// Handlers are installed on construction, so a signal that arrives before
/// the first `recv` is not lost.
#[cfg(unix)]
pub struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    pub fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    /// Wait for the next signal and return its name.
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        let name = tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
            _ = self.quit.recv() => "SIGQUIT",
        };
        Ok(name)
    }
}

/// Ctrl-C listener for platforms without unix signals.
#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    pub fn new() -> io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::signal::ctrl_c().await?;
        Ok("Ctrl-C")
    }
}

/// Wait until a signal arrives or `shutdown` is cancelled by the session.
///
/// A signal cancels `shutdown`, so either way the token is cancelled on return.
pub async fn wait(signals: &mut Signals, shutdown: &CancellationToken) -> io::Result<Trigger> {
    tokio::select! {
        _ = shutdown.cancelled() => Ok(Trigger::SessionEnded),
        name = signals.recv() => {
            shutdown.cancel();
            Ok(Trigger::Signal(name?))
        }
    }
}
