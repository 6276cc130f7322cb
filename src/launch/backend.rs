// src/launch/backend.rs

//! Pluggable process backend.
//!
//! The launcher talks to a `ProcessBackend` instead of `tokio::process`
//! directly, so tests can hand it a fake child that exits on command and
//! records the signals it was sent.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::errors::Result;

use super::plan::LaunchSpec;
use super::{ChildExit, ForwardedSignal};

/// A running child process.
pub trait ChildHandle: Send {
    /// OS process id, if the child has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// Deliver the equivalent of `signal` to the child.
    fn forward(&mut self, signal: ForwardedSignal) -> Result<()>;

    /// Wait for the child to terminate.
    ///
    /// Must be cancel-safe: the supervisor drops this future whenever a
    /// signal arrives first and calls `wait` again afterwards.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildExit>> + Send + '_>>;
}

/// Trait abstracting how a launch spec becomes a running process.
pub trait ProcessBackend: Send {
    fn spawn(&mut self, spec: &LaunchSpec) -> std::io::Result<Box<dyn ChildHandle>>;
}

/// Production backend on top of `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct RealProcessBackend;

impl ProcessBackend for RealProcessBackend {
    fn spawn(&mut self, spec: &LaunchSpec) -> std::io::Result<Box<dyn ChildHandle>> {
        // Literal argv, no shell; the parent's environment is inherited and
        // the launch env is layered on top.
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .current_dir(spec.working_dir())
            .envs(spec.env())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn()?;
        debug!(launcher = %spec.name(), pid = ?child.id(), "child spawned");

        Ok(Box::new(RealChild { child }))
    }
}

struct RealChild {
    child: Child,
}

impl ChildHandle for RealChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn forward(&mut self, signal: ForwardedSignal) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            // Already reaped; nothing left to signal.
            return Ok(());
        };

        let sig = match signal {
            ForwardedSignal::Interrupt => Signal::SIGINT,
            ForwardedSignal::Terminate => Signal::SIGTERM,
        };

        match kill(Pid::from_raw(pid as i32), sig) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("sending {signal} to pid {pid}: {e}").into()),
        }
    }

    #[cfg(not(unix))]
    fn forward(&mut self, _signal: ForwardedSignal) -> Result<()> {
        // No signal delivery outside unix; the closest equivalent is
        // terminating the child and letting `wait` observe it.
        self.child.start_kill()?;
        Ok(())
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildExit>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(ChildExit::from_status(status))
        })
    }
}
