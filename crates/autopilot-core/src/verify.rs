//! Exit status of the last shell command.
//!
//! The screen may be scrolled or contain earlier output, so the status is
//! printed next to a fresh token and only a line carrying that token counts.

use crate::error::{AutopilotError, Result};
use crate::terminal::Terminal;
use regex::Regex;
use uuid::Uuid;

/// Ask the shell for `$?` and fail unless it is 0.
pub fn verify_exit_status(terminal: &Terminal, simulate_typing: bool) -> Result<()> {
    let token = Uuid::new_v4().simple().to_string();
    let probe = format!("echo {token} $?\n");
    tracing::debug!(probe = %probe.trim_end(), "sending probe to get exit status");
    terminal.send_keys(&probe, simulate_typing)?;
    terminal.settle();
    terminal.wait_for_prompt()?;
    let screen = terminal.capture()?;
    let code = parse_exit_status(&screen, &token)?;
    tracing::debug!(code, "got exit status");
    if code != 0 {
        return Err(AutopilotError::NonZeroExit(code));
    }
    Ok(())
}

/// Find the single `<token> <digits>` line on `screen`.
pub fn parse_exit_status(screen: &str, token: &str) -> Result<i32> {
    let re = Regex::new(&format!(r"(?m)^{} ([0-9]+)\r?$", regex::escape(token))).map_err(
        |source| AutopilotError::InvalidPattern {
            pattern: token.to_string(),
            source,
        },
    )?;
    let codes: Vec<&str> = re
        .captures_iter(screen)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    match codes.as_slice() {
        [] => Err(AutopilotError::StatusMissing(token.to_string())),
        [code] => code
            .parse()
            .map_err(|_| AutopilotError::InvalidState(format!("exit status {code} out of range"))),
        _ => Err(AutopilotError::StatusAmbiguous(token.to_string())),
    }
}
