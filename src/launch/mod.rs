// src/launch/mod.rs

//! Companion-process launching.
//!
//! - [`interpreter`] picks the interpreter executable from an ordered list
//!   of candidates.
//! - [`plan`] turns a configured profile into a [`LaunchPlan`] and resolves
//!   it into an immutable [`LaunchSpec`].
//! - [`backend`] provides the `ProcessBackend` / `ChildHandle` traits and the
//!   `tokio::process` implementation used in production.
//! - [`signals`] turns OS termination signals into a channel of
//!   [`ForwardedSignal`]s.
//! - [`supervisor`] owns the control loop that relays signals to the child
//!   and waits for it, plus the [`Launcher`] that strings everything together.

use std::fmt;
use std::process::ExitStatus;

pub mod backend;
pub mod console;
pub mod interpreter;
pub mod plan;
pub mod signals;
pub mod supervisor;

pub use backend::{ChildHandle, ProcessBackend, RealProcessBackend};
pub use console::Console;
pub use interpreter::{Candidate, ResolutionSource, ResolvedInterpreter, resolve_interpreter};
pub use plan::{LaunchEnv, LaunchPlan, LaunchSpec};
pub use signals::{ChannelSignals, OsSignals, SignalSource};
pub use supervisor::{Launcher, launch, supervise};

/// Termination requests relayed from the parent to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedSignal {
    /// `SIGINT` (Ctrl-C).
    Interrupt,
    /// `SIGTERM`.
    Terminate,
}

impl fmt::Display for ForwardedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardedSignal::Interrupt => f.write_str("SIGINT"),
            ForwardedSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Normal exit with a numeric code.
    Exited(i32),
    /// Killed by the given signal number (unix only).
    Signaled(i32),
    /// Neither a code nor a signal was reported.
    Unknown,
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ChildExit::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ChildExit::Signaled(signal);
            }
        }

        ChildExit::Unknown
    }

    pub fn success(self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }

    /// Exit code the parent should terminate with.
    ///
    /// Signal deaths map to `128 + signo`, the shell convention.
    pub fn exit_code(self) -> i32 {
        match self {
            ChildExit::Exited(code) => code,
            ChildExit::Signaled(signal) => 128 + signal,
            ChildExit::Unknown => 1,
        }
    }

    /// Terminal phase of the launch state machine for this outcome.
    pub fn phase(self) -> LaunchPhase {
        match self {
            ChildExit::Exited(0) => LaunchPhase::ExitedOk,
            ChildExit::Exited(_) => LaunchPhase::ExitedError,
            ChildExit::Signaled(_) | ChildExit::Unknown => LaunchPhase::Signaled,
        }
    }
}

/// Per-launch state machine.
///
/// `Init -> ResolvingInterpreter -> Spawning -> Running -> {ExitedOk |
/// ExitedError | Signaled} -> ParentExit`, with `Spawning -> ParentExit` on
/// spawn failure. Signal forwarding only happens in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Init,
    ResolvingInterpreter,
    Spawning,
    Running,
    ExitedOk,
    ExitedError,
    Signaled,
    ParentExit,
}

impl LaunchPhase {
    pub fn can_transition_to(self, next: LaunchPhase) -> bool {
        use LaunchPhase::*;
        matches!(
            (self, next),
            (Init, ResolvingInterpreter)
                | (ResolvingInterpreter, Spawning)
                | (Spawning, Running)
                | (Spawning, ParentExit)
                | (Running, ExitedOk)
                | (Running, ExitedError)
                | (Running, Signaled)
                | (Running, ParentExit)
                | (ExitedOk, ParentExit)
                | (ExitedError, ParentExit)
                | (Signaled, ParentExit)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_child() {
        assert_eq!(ChildExit::Exited(0).exit_code(), 0);
        assert_eq!(ChildExit::Exited(2).exit_code(), 2);
        assert_eq!(ChildExit::Signaled(15).exit_code(), 143);
        assert_ne!(ChildExit::Unknown.exit_code(), 0);
        assert!(ChildExit::Exited(0).success());
        assert!(!ChildExit::Signaled(2).success());
    }

    #[test]
    fn spawn_failure_skips_running() {
        assert!(LaunchPhase::Spawning.can_transition_to(LaunchPhase::ParentExit));
        assert!(!LaunchPhase::Init.can_transition_to(LaunchPhase::Running));
        assert!(!LaunchPhase::ExitedOk.can_transition_to(LaunchPhase::Running));
    }

    #[test]
    fn outcome_maps_to_terminal_phase() {
        assert_eq!(ChildExit::Exited(0).phase(), LaunchPhase::ExitedOk);
        assert_eq!(ChildExit::Exited(3).phase(), LaunchPhase::ExitedError);
        assert_eq!(ChildExit::Signaled(9).phase(), LaunchPhase::Signaled);
    }

    #[cfg(unix)]
    #[test]
    fn signal_status_is_decoded() {
        use std::os::unix::process::ExitStatusExt;
        let status = ExitStatus::from_raw(9);
        assert_eq!(ChildExit::from_status(status), ChildExit::Signaled(9));
        let status = ExitStatus::from_raw(2 << 8);
        assert_eq!(ChildExit::from_status(status), ChildExit::Exited(2));
    }
}
