// src/launch/signals.rs

//! Termination signals as a channel.
//!
//! The supervisor never installs handlers itself; it is handed a
//! `Receiver<ForwardedSignal>` by a [`SignalSource`]. Production uses
//! [`OsSignals`], tests use [`ChannelSignals`].

use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;

use super::ForwardedSignal;

/// Something that can start delivering termination signals.
///
/// `subscribe` is called once, right after the child has been spawned, so
/// handlers are only active while the child is running.
pub trait SignalSource {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<ForwardedSignal>>;
}

/// Real `SIGINT` / `SIGTERM` listener (Ctrl-C only on non-unix platforms).
#[derive(Debug, Default)]
pub struct OsSignals;

impl SignalSource for OsSignals {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<ForwardedSignal>> {
        spawn_signal_listener()
    }
}

/// Pre-built channel, for tests and embedding.
#[derive(Debug)]
pub struct ChannelSignals(Option<mpsc::Receiver<ForwardedSignal>>);

impl ChannelSignals {
    pub fn new(rx: mpsc::Receiver<ForwardedSignal>) -> Self {
        Self(Some(rx))
    }
}

impl SignalSource for ChannelSignals {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<ForwardedSignal>> {
        match self.0.take() {
            Some(rx) => Ok(rx),
            None => {
                // Second subscription: hand out a channel that is already closed.
                let (_tx, rx) = mpsc::channel(1);
                Ok(rx)
            }
        }
    }
}

/// Register OS handlers and forward every delivery onto a channel.
///
/// Handler registration happens synchronously so errors surface here; the
/// listening task ends once the receiver is dropped.
#[cfg(unix)]
pub fn spawn_signal_listener() -> Result<mpsc::Receiver<ForwardedSignal>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (tx, rx) = mpsc::channel::<ForwardedSignal>(8);

    tokio::spawn(async move {
        loop {
            let sig = tokio::select! {
                Some(()) = interrupt.recv() => ForwardedSignal::Interrupt,
                Some(()) = terminate.recv() => ForwardedSignal::Terminate,
                else => break,
            };

            debug!(signal = %sig, "received termination signal");
            if tx.send(sig).await.is_err() {
                break;
            }
        }
        debug!("signal listener finished");
    });

    Ok(rx)
}

#[cfg(not(unix))]
pub fn spawn_signal_listener() -> Result<mpsc::Receiver<ForwardedSignal>> {
    let (tx, rx) = mpsc::channel::<ForwardedSignal>(8);

    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                break;
            }
            if tx.send(ForwardedSignal::Interrupt).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_signals_hand_out_the_receiver_once() {
        let (tx, rx) = mpsc::channel(1);
        let mut source = ChannelSignals::new(rx);

        let mut first = source.subscribe().unwrap();
        tx.send(ForwardedSignal::Terminate).await.unwrap();
        assert_eq!(first.recv().await, Some(ForwardedSignal::Terminate));

        let mut second = source.subscribe().unwrap();
        assert_eq!(second.recv().await, None);
    }
}
