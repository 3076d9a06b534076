use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::Context;

use log::debug;

/// Wrapper around the `rustc` command
pub struct Rustc {
    command: Command,
}

impl Rustc {
    /// Prepares a compiler invocation that inherits this process' stdio and
    /// environment.
    pub fn new(rustc: &Path) -> Self {
        Self {
            command: Command::new(rustc),
        }
    }

    /// Appends compiler arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.command.args(args);
        self
    }

    /// Overlays `KEY=VALUE` pairs onto the inherited environment.
    ///
    /// Overlay, not replace: variables not named here keep their parent
    /// values, so the compiler still sees PATH, HOME, TEMP, and friends.
    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.command
            .envs(vars.iter().map(|(key, value)| (key, value)));
        self
    }

    /// Runs the compiler to completion and returns its exit status.
    ///
    /// Diagnostics go straight to the inherited stderr; nothing is captured,
    /// annotated, or retried.
    pub fn status(mut self) -> anyhow::Result<ExitStatus> {
        debug!(
            "running `{}`",
            self.command.get_program().to_string_lossy()
        );
        let status = self.command.status().with_context(|| {
            format!(
                "Failed to execute rustc `{}`",
                self.command.get_program().to_string_lossy()
            )
        })?;
        debug!("rustc exited with {status}");

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::Rustc;

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let err = Rustc::new(Path::new("/nonexistent/rustc"))
            .args(["--version".to_owned()])
            .status()
            .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/rustc"));
    }

    #[cfg(unix)]
    #[test]
    fn forwards_the_exit_status() {
        let status = Rustc::new(Path::new("/bin/sh"))
            .args(["-c".to_owned(), "exit 3".to_owned()])
            .envs(&[("UNUSED".to_owned(), "value".to_owned())])
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(3));
    }
}
