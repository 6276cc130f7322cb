// src/launch/console.rs

//! Operator-facing diagnostic lines.
//!
//! Separate from `tracing`: these lines are always shown, carry the
//! launcher's `[start-<name>]` prefix and go to the same stream (stderr)
//! the child inherits.

use std::fmt::Display;
use std::io::Write;

pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }

    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    /// Write one prefixed line. Write errors are ignored; a closed stderr
    /// must not change the exit code.
    pub fn line(&mut self, prefix: &str, msg: impl Display) {
        let _ = writeln!(self.out, "{prefix} {msg}");
        let _ = self.out.flush();
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}
