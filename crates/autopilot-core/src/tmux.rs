//! tmux as the terminal backend.
//!
//! `capture-pane -p` prints the visible pane, `send-keys` types into it. The
//! session itself is created by the presenter (locally, or by forwarding the
//! socket of a remote tmux); [`ensure_session`] only checks it is reachable.

use crate::desktop::run_checked;
use crate::error::{AutopilotError, Result};
use crate::terminal::TerminalBackend;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Default)]
pub struct TmuxBackend {
    target: Option<String>,
}

impl TmuxBackend {
    pub fn new(target: Option<String>) -> Self {
        Self { target }
    }

    fn args<'a>(&'a self, subcommand: &'a str) -> Vec<&'a str> {
        let mut args = vec![subcommand];
        if let Some(target) = &self.target {
            args.push("-t");
            args.push(target);
        }
        args
    }

    pub fn has_session(&self) -> bool {
        Command::new("tmux")
            .args(self.args("has-session"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl TerminalBackend for TmuxBackend {
    fn capture(&self) -> Result<String> {
        let mut args = self.args("capture-pane");
        args.push("-p");
        run_checked("tmux", &args)
    }

    fn send(&self, keys: &str) -> Result<()> {
        let mut args = self.args("send-keys");
        args.push("--");
        args.push(keys);
        run_checked("tmux", &args)?;
        Ok(())
    }
}

/// Fail with setup instructions unless a tmux session is reachable.
pub fn ensure_session(tmux: &TmuxBackend, ips_file: Option<&Path>) -> Result<()> {
    if which::which("tmux").is_err() {
        return Err(AutopilotError::Bootstrap(
            "tmux is not installed or not on PATH".to_string(),
        ));
    }
    if tmux.has_session() {
        tracing::info!("found tmux session, trying to acquire shell prompt");
        return Ok(());
    }
    tracing::error!("couldn't connect to tmux, please set up tmux first");
    Err(AutopilotError::Bootstrap(remediation(&first_address(
        ips_file,
    ))))
}

fn first_address(ips_file: Option<&Path>) -> String {
    ips_file
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|data| {
            data.lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "<node-address>".to_string())
}

fn remediation(address: &str) -> String {
    format!(
        "no tmux session found.

1. If you're running this directly from a node:

tmux

2. If you want to control a remote tmux:

rm -f /tmp/tmux-$(id -u)/default && ssh -t -L /tmp/tmux-$(id -u)/default:/tmp/tmux-1001/default docker@{address} tmux

3. If you cannot control a remote tmux:

tmux new-session ssh docker@{address}
"
    )
}
