//! The stepping state machine.
//!
//! Each loop iteration persists the state, shows the action under the cursor,
//! obtains a command (from the operator, or `Execute` when running
//! non-interactively) and applies it. Executing an action moves the slides,
//! drives the shell with the method-specific protocol and only then advances
//! the cursor, so a failure leaves the cursor on the failed step.

use crate::action::Action;
use crate::desktop::{Browser, WindowFocus};
use crate::display::DisplaySync;
use crate::error::{AutopilotError, Result};
use crate::operator::{Command, Operator};
use crate::state::{ExecutionState, StateStore};
use crate::terminal::Terminal;
use crate::types::{Method, Workspace};
use crate::verify::verify_exit_status;
use regex::{Regex, RegexBuilder};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

static CONTINUATION_INDENT_RE: OnceLock<Regex> = OnceLock::new();

fn continuation_indent() -> &'static Regex {
    CONTINUATION_INDENT_RE.get_or_init(|| Regex::new(r"\n +").unwrap())
}

static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();

fn address_re() -> &'static Regex {
    ADDRESS_RE.get_or_init(|| Regex::new(r"(?m)^\[(.*)\]").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every action ran; the cursor sits past the last one.
    Complete,
    /// The operator quit.
    Aborted,
}

/// Everything the engine talks to.
pub struct Collaborators {
    pub store: Box<dyn StateStore>,
    pub terminal: Terminal,
    pub display: DisplaySync,
    pub focus: Rc<dyn WindowFocus>,
    pub browser: Box<dyn Browser>,
    pub operator: Box<dyn Operator>,
}

/// How a shell command is known to be finished.
#[derive(Debug, Clone, PartialEq)]
enum Completion {
    Marker { needle: String, timeout: Duration },
    Prompt,
}

pub struct Engine {
    actions: Vec<Action>,
    state: ExecutionState,
    store: Box<dyn StateStore>,
    terminal: Terminal,
    display: DisplaySync,
    focus: Rc<dyn WindowFocus>,
    browser: Box<dyn Browser>,
    operator: Box<dyn Operator>,
    placeholder_host: String,
}

impl Engine {
    pub fn new(actions: Vec<Action>, state: ExecutionState, with: Collaborators) -> Self {
        Self {
            actions,
            state,
            store: with.store,
            terminal: with.terminal,
            display: with.display,
            focus: with.focus,
            browser: with.browser,
            operator: with.operator,
            placeholder_host: "node1".to_string(),
        }
    }

    /// Host segment of `open` URLs replaced by the address found on screen.
    pub fn with_placeholder_host(mut self, host: impl Into<String>) -> Self {
        self.placeholder_host = host.into();
        self
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn run(&mut self) -> Result<Outcome> {
        let total = self.actions.len();
        while self.state.cursor < total {
            self.store.save(&self.state)?;

            let step = self.state.cursor;
            self.operator.show(step, total, &self.actions[step]);

            let command = if self.state.interactive {
                self.operator.command(&self.state, step, total)?
            } else {
                Command::Execute
            };

            if let Some(outcome) = self.apply(command)? {
                return Ok(outcome);
            }
        }
        self.store.save(&self.state)?;
        tracing::info!(steps = total, "all snippets executed");
        Ok(Outcome::Complete)
    }

    fn apply(&mut self, command: Command) -> Result<Option<Outcome>> {
        let total = self.actions.len();
        match command {
            Command::Next => self.state.cursor += 1,
            Command::Previous => self.state.cursor = self.state.cursor.saturating_sub(1),
            Command::ToggleSimulateTyping => {
                self.state.simulate_typing = !self.state.simulate_typing;
                tracing::info!(simulate_typing = self.state.simulate_typing, "toggled");
            }
            Command::ToggleVerifyExitStatus => {
                self.state.verify_exit_status = !self.state.verify_exit_status;
                tracing::info!(verify_status = self.state.verify_exit_status, "toggled");
            }
            Command::Jump(step) if step > total => {
                tracing::warn!(step, total, "no such snippet");
            }
            Command::Jump(step) => {
                self.state.cursor = step;
                // back to the very beginning: reset the deck too
                if step == 0 {
                    self.display.goto(1)?;
                }
            }
            Command::Quit => return Ok(Some(Outcome::Aborted)),
            Command::Continue => {
                tracing::info!("continuing non-interactively until the next error");
                self.state.interactive = false;
                self.execute()?;
            }
            Command::Execute => self.execute()?,
            Command::Unknown(key) => tracing::warn!(key = %key, "unknown command"),
        }
        Ok(None)
    }

    fn execute(&mut self) -> Result<()> {
        let step = self.state.cursor;
        let action = self.actions[step].clone();

        self.display
            .catch_up_to(action.slide, self.state.interactive, self.operator.as_mut())?;
        self.focus.focus(Workspace::Terminal)?;

        let payload = action.shell_payload();
        tracing::info!(step, method = %action.method, payload = %payload, "running snippet");

        match &action.method {
            Method::Keys => self
                .terminal
                .send_keys(&payload, self.state.simulate_typing)?,
            Method::Bash => self.run_bash(step, &payload)?,
            Method::Copypaste => self.run_copypaste(step, &payload)?,
            Method::Open => self.run_open(&payload)?,
            Method::Wait | Method::LongWait => {
                tracing::debug!(step, "marker already awaited by the previous snippet");
            }
            Method::Other(tag) => {
                tracing::warn!(method = %tag, payload = %payload, "unknown method");
            }
        }

        self.state.cursor += 1;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Methods
    // -----------------------------------------------------------------------

    fn run_bash(&mut self, step: usize, payload: &str) -> Result<()> {
        let completion = self.completion(step, true)?;
        self.terminal.wait_for_prompt()?;
        let command = continuation_indent().replace_all(payload, "\n");
        self.terminal
            .send_keys(&format!("{command}\n"), self.state.simulate_typing)?;
        self.terminal.settle();
        self.finish(completion)
    }

    fn run_copypaste(&mut self, step: usize, pattern: &str) -> Result<()> {
        let completion = self.completion(step, false)?;
        self.terminal.wait_for_prompt()?;
        let screen = self.terminal.capture()?;
        let text = extract_last_match(&screen, pattern)?;
        tracing::debug!(text = %text, "pasting most recent match");
        self.terminal
            .send_keys(&format!("{text}\n"), self.state.simulate_typing)?;
        self.terminal.settle();
        self.finish(completion)
    }

    fn run_open(&mut self, template: &str) -> Result<()> {
        self.terminal.wait_for_prompt()?;
        let url = if self.placeholder_host.is_empty() || !template.contains(&self.placeholder_host)
        {
            template.to_string()
        } else {
            let screen = self.terminal.capture()?;
            let address = last_bracketed_address(&screen)
                .ok_or_else(|| AutopilotError::NoAddress(template.to_string()))?;
            template.replace(
                &format!("/{}", self.placeholder_host),
                &format!("/{address}"),
            )
        };
        self.browser.open(&url)?;
        self.focus.focus(Workspace::Browser)?;
        if self.state.interactive {
            self.operator
                .acknowledge("Press any key to continue to next step...")?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// A `wait` / `longwait` right after the current action names the text
    /// that signals completion; anything else means "back at a prompt".
    fn completion(&self, step: usize, require_next: bool) -> Result<Completion> {
        let settings = self.terminal.settings();
        match self.actions.get(step + 1) {
            Some(next) if next.method.is_marker() => Ok(Completion::Marker {
                needle: next.shell_payload(),
                timeout: if next.method == Method::LongWait {
                    settings.long_timeout()
                } else {
                    settings.timeout
                },
            }),
            Some(_) => Ok(Completion::Prompt),
            None if require_next => Err(AutopilotError::MalformedSequence {
                step,
                method: self.actions[step].method.clone(),
            }),
            None => Ok(Completion::Prompt),
        }
    }

    fn finish(&self, completion: Completion) -> Result<()> {
        match completion {
            Completion::Marker { needle, timeout } => {
                self.terminal.wait_for_string(&needle, timeout)
            }
            Completion::Prompt => {
                self.terminal.wait_for_prompt()?;
                if self.state.verify_exit_status {
                    verify_exit_status(&self.terminal, self.state.simulate_typing)?;
                }
                Ok(())
            }
        }
    }
}

/// Most recent match of `pattern` on `screen` (its first group when it has
/// one), with line breaks removed as a terminal copy would.
pub fn extract_last_match(screen: &str, pattern: &str) -> Result<String> {
    let re = RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| AutopilotError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    let caps = re
        .captures_iter(screen)
        .last()
        .ok_or_else(|| AutopilotError::NoMatch(pattern.to_string()))?;
    // with groups, a group that took no part in the match yields ""
    let matched = if re.captures_len() > 1 {
        caps.get(1).map_or("", |m| m.as_str())
    } else {
        caps.get(0).map_or("", |m| m.as_str())
    };
    Ok(matched.replace('\n', ""))
}

/// Address from the last line starting with `[address]`.
pub fn last_bracketed_address(screen: &str) -> Option<String> {
    address_re()
        .captures_iter(screen)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
