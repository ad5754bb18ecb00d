//! Running external programs
//!
//! An [`Invocation`] is a program plus its arguments, kept as plain strings
//! so the argument lists built for docker, kubectl and gcloud can be checked
//! in tests without spawning anything.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{self, Result};
use crate::ui::Logger;

/// Captured output of a finished program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run with inherited stdio, failing on a non-zero exit status
    pub fn run(&self, log: &Logger) -> Result<()> {
        let status = self
            .command(log)
            .status()
            .map_err(|e| error::tool::spawn_failed(&self.program, &e))?;
        self.check(status, "")
    }

    /// Run with `input` on stdin and inherited stdout/stderr
    pub fn run_with_input(&self, input: &[u8], log: &Logger) -> Result<()> {
        let mut child = self
            .command(log)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| error::tool::spawn_failed(&self.program, &e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits early closes the pipe; its status reports why
            if let Err(e) = stdin.write_all(input) {
                log.debug(format!("Writing to {} stdin failed: {}", self.program, e));
            }
        }

        let status = child.wait()?;
        self.check(status, "")
    }

    /// Run and collect stdout and stderr, failing on a non-zero exit status
    pub fn capture(&self, log: &Logger) -> Result<Captured> {
        let output = self
            .command(log)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| error::tool::spawn_failed(&self.program, &e))?;

        let captured = Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        self.check(output.status, captured.stderr.trim())?;
        Ok(captured)
    }

    /// Run attached to the terminal and return the exit code, whatever it is
    pub fn run_interactive(&self, log: &Logger) -> Result<i32> {
        let status = self
            .command(log)
            .status()
            .map_err(|e| error::tool::spawn_failed(&self.program, &e))?;
        Ok(status.code().unwrap_or(1))
    }

    fn command(&self, log: &Logger) -> Command {
        log.debug(format!("Executing: {self}"));
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn check(&self, status: ExitStatus, stderr: &str) -> Result<()> {
        if status.success() {
            return Ok(());
        }
        let message = if stderr.is_empty() {
            match status.code() {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            }
        } else {
            stderr.to_string()
        };
        Err(error::tool::failed(&self.program, status.code(), message))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
