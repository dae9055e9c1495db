//! Thin wrapper over the `helm` executable.
//!
//! `HelmRunner` is the seam the fetcher depends on; `HelmCli` is the real
//! implementation. Child stderr is inherited so helm's own output reaches the
//! user unchanged; child stdout is inherited too unless the caller owns stdout
//! (e.g. for a JSON report), in which case it is sent to our stderr.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum HelmError {
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Exit { command: String, status: ExitStatus },
}

/// Operations the chart fetcher needs from helm.
pub trait HelmRunner {
    /// `helm repo add <name> <url>`
    fn repo_add(&self, name: &str, url: &str) -> Result<(), HelmError>;

    /// `helm pull <repo>/<chart> --destination <destination>`
    fn pull(&self, repo: &str, chart: &str, destination: &Path) -> Result<(), HelmError>;
}

/// Runs the helm binary found on PATH (or at an explicit path).
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
    stdout_to_stderr: bool,
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            stdout_to_stderr: false,
        }
    }

    /// Send helm's stdout to our stderr so stdout carries only our own output.
    pub fn with_stdout_to_stderr(mut self, enabled: bool) -> Self {
        self.stdout_to_stderr = enabled;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn run<I, S>(&self, args: I) -> Result<(), HelmError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).stdin(Stdio::null());
        if self.stdout_to_stderr {
            cmd.stdout(Stdio::from(io::stderr()));
        }
        let command = describe(&cmd);
        tracing::debug!(%command, "running helm");

        let status = cmd
            .status()
            .map_err(|source| HelmError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(HelmError::Exit { command, status });
        }
        Ok(())
    }
}

impl HelmRunner for HelmCli {
    fn repo_add(&self, name: &str, url: &str) -> Result<(), HelmError> {
        self.run(["repo", "add", name, url])
    }

    fn pull(&self, repo: &str, chart: &str, destination: &Path) -> Result<(), HelmError> {
        let reference = format!("{repo}/{chart}");
        self.run([
            OsStr::new("pull"),
            OsStr::new(&reference),
            OsStr::new("--destination"),
            destination.as_os_str(),
        ])
    }
}

fn describe(cmd: &Command) -> String {
    let mut s = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        s.push(' ');
        s.push_str(&arg.to_string_lossy());
    }
    s
}

/// Whether `binary` resolves to an executable (PATH lookup for bare names).
pub fn helm_installed(binary: &str) -> bool {
    which::which(binary).is_ok()
}
