use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use log::debug;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum CmdError {
    #[error("cannot find command `{0}`, please make sure it is installed")]
    NotFound(String),

    #[error("cannot launch command `{0}`: {1}")]
    Launch(String, #[source] io::Error),

    #[error("command `{name}` exited with {status}: {stderr}")]
    Exit {
        name: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("command `{0}` wrote non utf-8 output")]
    Utf8(String),
}

/// A command run to completion in a fixed working directory, stdout captured.
pub struct Cmd {
    cmd: Command,
    display: String,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S, dir: &Path) -> Self {
        let mut cmd = Command::new(program.as_ref());
        cmd.current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let display = program.as_ref().to_string_lossy().into_owned();
        Self { cmd, display }
    }

    /// Shortcut for `git` with `GIT_TERMINAL_PROMPT=0`, so that a remote asking
    /// for credentials fails instead of hanging.
    pub fn git(dir: &Path) -> Self {
        let mut cmd = Self::new("git", dir);
        cmd.cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.display.push(' ');
        self.display.push_str(&arg.as_ref().to_string_lossy());
        self.cmd.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Run the command and return its stdout. A non-zero exit is an error
    /// carrying the trimmed stderr.
    pub async fn execute(mut self) -> Result<String, CmdError> {
        debug!("Execute command `{}`", self.display);
        let output = match self.cmd.output().await {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CmdError::NotFound(self.display));
            }
            Err(err) => return Err(CmdError::Launch(self.display, err)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CmdError::Exit {
                name: self.display,
                status: output.status,
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CmdError::Utf8(self.display))
    }
}
