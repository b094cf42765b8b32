//! Running external programs.
//!
//! Every subprocess this crate starts (the Kitty control channel and the
//! image converter) goes through a [`CommandRunner`], so the adapters can be
//! exercised without a terminal or an image toolchain.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

/// A program to run, with its arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: OsString,
    /// Arguments, not including the program
    pub args: Vec<OsString>,
    /// Variables added to the inherited environment
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// An invocation of `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Why an external program did not succeed.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// Program that failed
        program: String,
        /// Its exit status
        status: ExitStatus,
        /// Captured standard error, lossily decoded
        stderr: String,
    },
}

impl ProcessError {
    /// Captured standard error, trimmed. Empty when there is none.
    #[must_use]
    pub fn stderr(&self) -> &str {
        match self {
            ProcessError::Spawn { .. } => "",
            ProcessError::Failed { stderr, .. } => stderr.trim(),
        }
    }
}

/// Runs an [`Invocation`] to completion.
pub trait CommandRunner {
    /// Run and wait for the program. Output is captured, not shown.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] if the program cannot be started or exits
    /// with a non-zero status.
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError>;
}

/// Runs programs with [`std::process::Command`], blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        let program = invocation.program.to_string_lossy().into_owned();
        debug!(program = %program, args = ?invocation.args, "running");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A runner double that records invocations instead of running them.

    use super::{CommandRunner, Invocation, ProcessError};
    use std::cell::RefCell;
    use std::io;

    type Responder = Box<dyn Fn(&Invocation) -> Result<(), ProcessError>>;

    pub(crate) struct RecordingRunner {
        pub(crate) calls: RefCell<Vec<Invocation>>,
        respond: Responder,
    }

    impl RecordingRunner {
        pub(crate) fn new(
            respond: impl Fn(&Invocation) -> Result<(), ProcessError> + 'static,
        ) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        pub(crate) fn succeeding() -> Self {
            Self::new(|_| Ok(()))
        }

        /// Every call fails as if the program was not installed.
        pub(crate) fn missing_program() -> Self {
            Self::new(|inv| {
                Err(ProcessError::Spawn {
                    program: inv.program.to_string_lossy().into_owned(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                })
            })
        }

        pub(crate) fn args(&self) -> Vec<Vec<String>> {
            self.calls
                .borrow()
                .iter()
                .map(|inv| {
                    std::iter::once(&inv.program)
                        .chain(&inv.args)
                        .map(|a| a.to_string_lossy().into_owned())
                        .collect()
                })
                .collect()
        }

        pub(crate) fn count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
            self.calls.borrow_mut().push(invocation.clone());
            (self.respond)(invocation)
        }
    }
}
