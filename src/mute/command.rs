//! External command mute control
//!
//! Runs `<command> <subcommand> <audio_device> 1|0`, by default
//! `wpctl set-mute @DEFAULT_AUDIO_SOURCE@ 1`. Exit code 0 is success.
//! Each invocation is bounded by a timeout; a command that overruns is
//! killed and counted as failed. There is no retry.

use super::MuteControl;
use crate::config::MuteConfig;
use crate::error::MuteError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Mute controller backed by an external program
pub struct CommandMute {
    command: String,
    subcommand: String,
    audio_device: String,
    timeout: Duration,
}

impl CommandMute {
    /// Create a new controller from configuration
    pub fn new(config: &MuteConfig) -> Self {
        Self {
            command: config.command.clone(),
            subcommand: config.subcommand.clone(),
            audio_device: config.audio_device.clone(),
            timeout: config.timeout(),
        }
    }

    /// Override the invocation bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn args(&self, muted: bool) -> [&str; 3] {
        let state = if muted { "1" } else { "0" };
        [self.subcommand.as_str(), self.audio_device.as_str(), state]
    }

    /// Run the command once, returning its trimmed stdout
    async fn execute(&self, muted: bool) -> Result<String, MuteError> {
        let args = self.args(muted);
        tracing::debug!("Executing: {} {}", self.command, args.join(" "));

        let child = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MuteError::NotFound(self.command.clone())
                } else {
                    MuteError::SpawnFailed(e.to_string())
                }
            })?;

        // Dropping the child on timeout kills it
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| MuteError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| MuteError::WaitFailed(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if !output.status.success() {
            if !stdout.is_empty() {
                tracing::debug!("{} stdout: {}", self.command, stdout);
            }
            return Err(MuteError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

#[async_trait::async_trait]
impl MuteControl for CommandMute {
    async fn set_mute(&self, muted: bool) -> bool {
        let (action, verb) = if muted {
            ("Muting", "mute")
        } else {
            ("Unmuting", "unmute")
        };
        tracing::info!("{} microphone ({})", action, self.audio_device);

        match self.execute(muted).await {
            Ok(stdout) => {
                if !stdout.is_empty() {
                    tracing::debug!("{} output: {}", self.command, stdout);
                }
                true
            }
            Err(e) => {
                tracing::error!("Failed to {} microphone: {}", verb, e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mute(command: &str, subcommand: &str, audio_device: &str) -> CommandMute {
        CommandMute::new(&MuteConfig {
            command: command.to_string(),
            subcommand: subcommand.to_string(),
            audio_device: audio_device.to_string(),
            timeout_secs: 5,
        })
    }

    #[test]
    fn test_args() {
        let mute = make_mute("wpctl", "set-mute", "116");
        assert_eq!(mute.args(true), ["set-mute", "116", "1"]);
        assert_eq!(mute.args(false), ["set-mute", "116", "0"]);
    }

    #[tokio::test]
    async fn test_exit_zero_is_success() {
        let mute = make_mute("true", "set-mute", "116");
        assert!(mute.set_mute(true).await);
        assert!(mute.set_mute(false).await);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let mute = make_mute("false", "set-mute", "116");
        assert!(!mute.set_mute(false).await);
        assert!(matches!(
            mute.execute(false).await,
            Err(MuteError::NonZeroExit { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_state_argument_passed_last() {
        // sh -c SCRIPT ARG0: the mute state lands in $0
        let mute = make_mute("sh", "-c", "test \"$0\" = 1");
        assert!(mute.set_mute(true).await);
        assert!(!mute.set_mute(false).await);
    }

    #[tokio::test]
    async fn test_missing_command() {
        let mute = make_mute("clickmute-no-such-command", "set-mute", "116");
        assert!(matches!(
            mute.execute(true).await,
            Err(MuteError::NotFound(_))
        ));
        assert!(!mute.set_mute(true).await);
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let mute = make_mute("sh", "-c", "sleep 10").with_timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        assert!(matches!(
            mute.execute(true).await,
            Err(MuteError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stdout_captured() {
        let mute = make_mute("sh", "-c", "echo muted=$0");
        assert_eq!(mute.execute(true).await.unwrap(), "muted=1");
    }
}
