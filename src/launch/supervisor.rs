// src/launch/supervisor.rs

//! Spawning and supervising the companion process.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{LauncherError, Result};
use crate::fs::FileSystem;

use super::backend::{ChildHandle, ProcessBackend};
use super::console::Console;
use super::plan::{LaunchPlan, LaunchSpec};
use super::signals::SignalSource;
use super::{ChildExit, ForwardedSignal, LaunchPhase};

/// Events feeding the supervision loop.
#[derive(Debug)]
enum SupervisorEvent {
    Signal(ForwardedSignal),
    SignalsClosed,
    ChildExited(ChildExit),
}

/// Start the child described by `spec`.
///
/// Spawn failures become [`LauncherError::LaunchError`]; there is no retry.
pub fn launch<B>(spec: &LaunchSpec, backend: &mut B) -> Result<Box<dyn ChildHandle>>
where
    B: ProcessBackend + ?Sized,
{
    info!(
        launcher = %spec.name(),
        program = %spec.program().display(),
        cwd = %spec.working_dir().display(),
        args = ?spec.args(),
        "spawning companion process"
    );

    backend
        .spawn(spec)
        .map_err(|source| LauncherError::LaunchError {
            name: spec.name().to_string(),
            program: spec.program().display().to_string(),
            source,
        })
}

/// Block until the child terminates, relaying termination signals to it.
///
/// A signal never ends the loop by itself: it is forwarded and the loop
/// goes back to waiting, so the child decides how long shutdown takes.
/// There is no timeout.
pub async fn supervise(
    spec: &LaunchSpec,
    child: &mut dyn ChildHandle,
    signals: &mut mpsc::Receiver<ForwardedSignal>,
    console: &mut Console,
) -> Result<ChildExit> {
    let prefix = spec.console_prefix();
    let mut signals_open = true;

    loop {
        let event = tokio::select! {
            exit = child.wait() => SupervisorEvent::ChildExited(exit?),
            sig = signals.recv(), if signals_open => match sig {
                Some(sig) => SupervisorEvent::Signal(sig),
                None => SupervisorEvent::SignalsClosed,
            },
        };

        match event {
            SupervisorEvent::ChildExited(exit) => {
                debug!(launcher = %spec.name(), ?exit, "child terminated");
                return Ok(exit);
            }
            SupervisorEvent::Signal(sig) => {
                if sig == ForwardedSignal::Interrupt {
                    console.line(&prefix, format!("Stopping {}...", spec.title()));
                }
                info!(
                    launcher = %spec.name(),
                    pid = ?child.id(),
                    signal = %sig,
                    "forwarding signal to child"
                );
                if let Err(e) = child.forward(sig) {
                    warn!(
                        launcher = %spec.name(),
                        signal = %sig,
                        error = %e,
                        "failed to forward signal; still waiting for child"
                    );
                }
            }
            SupervisorEvent::SignalsClosed => {
                debug!(launcher = %spec.name(), "signal channel closed; waiting on child only");
                signals_open = false;
            }
        }
    }
}

/// One parameterised launcher: resolve, spawn, supervise, report.
pub struct Launcher<B: ProcessBackend> {
    backend: B,
    fs: Arc<dyn FileSystem>,
    console: Console,
}

impl<B: ProcessBackend> std::fmt::Debug for Launcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Launcher<B> {
    pub fn new(backend: B, fs: Arc<dyn FileSystem>, console: Console) -> Self {
        Self {
            backend,
            fs,
            console,
        }
    }

    /// Run one companion process to completion.
    ///
    /// Signal handlers are subscribed only after a successful spawn. A
    /// non-zero or abnormal exit produces exactly one diagnostic line.
    pub async fn run<S: SignalSource>(
        &mut self,
        plan: &LaunchPlan,
        signals: &mut S,
    ) -> Result<ChildExit> {
        let name = plan.name.as_str();
        let mut phase = LaunchPhase::Init;

        advance(&mut phase, LaunchPhase::ResolvingInterpreter, name);
        let spec = plan.resolve(self.fs.as_ref());
        let prefix = spec.console_prefix();

        self.console
            .line(&prefix, format!("Starting {}...", spec.title()));
        for line in spec.banner() {
            self.console.line(&prefix, line);
        }

        advance(&mut phase, LaunchPhase::Spawning, name);
        let mut child = match launch(&spec, &mut self.backend) {
            Ok(child) => child,
            Err(err) => {
                self.console.line(&prefix, &err);
                advance(&mut phase, LaunchPhase::ParentExit, name);
                return Err(err);
            }
        };

        advance(&mut phase, LaunchPhase::Running, name);
        let mut rx = match signals.subscribe() {
            Ok(rx) => rx,
            Err(e) => {
                warn!(launcher = name, error = %e, "could not listen for termination signals");
                let (_tx, rx) = mpsc::channel(1);
                rx
            }
        };

        let result = supervise(&spec, child.as_mut(), &mut rx, &mut self.console).await;
        drop(child);

        let exit = match result {
            Ok(exit) => exit,
            Err(err) => {
                self.console.line(&prefix, format!("Lost track of {}: {err}", spec.title()));
                advance(&mut phase, LaunchPhase::ParentExit, name);
                return Err(err);
            }
        };

        advance(&mut phase, exit.phase(), name);
        self.report_exit(&spec, exit);
        advance(&mut phase, LaunchPhase::ParentExit, name);

        Ok(exit)
    }

    fn report_exit(&mut self, spec: &LaunchSpec, exit: ChildExit) {
        let prefix = spec.console_prefix();
        let title = spec.title();
        match exit {
            ChildExit::Exited(0) => {
                info!(launcher = %spec.name(), exit_code = 0, "companion process exited cleanly");
            }
            ChildExit::Exited(code) => {
                self.console
                    .line(&prefix, format!("{title} exited with code {code}"));
            }
            ChildExit::Signaled(signal) => {
                self.console
                    .line(&prefix, format!("{title} was terminated by signal {signal}"));
            }
            ChildExit::Unknown => {
                self.console
                    .line(&prefix, format!("{title} exited without reporting a status"));
            }
        }
    }
}

fn advance(phase: &mut LaunchPhase, next: LaunchPhase, launcher: &str) {
    debug_assert!(
        phase.can_transition_to(next),
        "invalid launch transition {:?} -> {:?}",
        phase,
        next
    );
    debug!(launcher, from = ?*phase, to = ?next, "launch phase");
    *phase = next;
}
