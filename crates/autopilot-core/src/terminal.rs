//! Terminal session: capture the shell's screen, send keystrokes, and poll
//! until the shell is done.
//!
//! The backend has no notion of "command finished". Completion is detected by
//! polling the captured screen for a prompt sentinel or an expected marker.

use crate::error::{AutopilotError, Result};
use rand::Rng;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Raw access to the single shell session being driven.
pub trait TerminalBackend {
    /// Currently visible screen, possibly padded with trailing blank lines.
    fn capture(&self) -> Result<String>;
    /// Deliver `keys` as one unit.
    fn send(&self, keys: &str) -> Result<()>;
}

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// TerminalSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalSettings {
    pub timeout: Duration,
    pub long_wait_factor: u32,
    pub poll_interval: Duration,
    pub settle: Duration,
    pub max_jitter: Duration,
    pub newline_pause: Duration,
}

impl TerminalSettings {
    pub fn long_timeout(&self) -> Duration {
        self.timeout
            .checked_mul(self.long_wait_factor)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            long_wait_factor: 10,
            poll_interval: Duration::from_secs(1),
            settle: Duration::from_millis(500),
            max_jitter: Duration::from_millis(200),
            newline_pause: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt detection
// ---------------------------------------------------------------------------

/// True when the last non-blank line looks like an idle shell: it ends in `$`
/// (user shell) or in `#` preceded by whitespace (root / busybox shell).
pub fn is_prompt(screen: &str) -> bool {
    let trimmed = screen.trim_end_matches(['\n', '\r']);
    let Some(last) = trimmed.rsplit('\n').next() else {
        return false;
    };
    if last.ends_with('$') {
        return true;
    }
    match last.strip_suffix('#') {
        Some(rest) => rest.ends_with(char::is_whitespace),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

pub struct Terminal {
    backend: Box<dyn TerminalBackend>,
    clock: Box<dyn Clock>,
    settings: TerminalSettings,
}

impl Terminal {
    pub fn new(
        backend: Box<dyn TerminalBackend>,
        clock: Box<dyn Clock>,
        settings: TerminalSettings,
    ) -> Self {
        Self {
            backend,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &TerminalSettings {
        &self.settings
    }

    pub fn capture(&self) -> Result<String> {
        self.backend.capture()
    }

    pub fn pause(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Short grace period after sending input, before polling.
    pub fn settle(&self) {
        self.pause(self.settings.settle);
    }

    /// Send `text` either in one go or one key at a time like a human typist.
    ///
    /// Text starting with `^` is a control-key escape and is never split.
    pub fn send_keys(&self, text: &str, simulate_typing: bool) -> Result<()> {
        if !simulate_typing || text.starts_with('^') {
            return self.backend.send(text);
        }

        let mut rng = rand::thread_rng();
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let key: &str = match ch {
                ';' => "\\;",
                c => c.encode_utf8(&mut buf),
            };
            if ch == '\n' {
                self.clock.sleep(self.settings.newline_pause);
            }
            self.backend.send(key)?;
            self.clock
                .sleep(self.settings.max_jitter.mul_f64(rng.gen::<f64>()));
            if ch == '\n' {
                self.clock.sleep(self.settings.newline_pause);
            }
        }
        Ok(())
    }

    pub fn wait_for_string(&self, needle: &str, timeout: Duration) -> Result<()> {
        tracing::debug!(needle, "waiting for string");
        self.poll(timeout, &format!("'{needle}'"), |screen| screen.contains(needle))
    }

    pub fn wait_for_prompt(&self) -> Result<()> {
        self.wait_for_prompt_within(self.settings.timeout)
    }

    pub fn wait_for_prompt_within(&self, timeout: Duration) -> Result<()> {
        tracing::debug!("waiting for prompt");
        self.poll(timeout, "prompt", is_prompt)
    }

    fn poll(&self, timeout: Duration, what: &str, done: impl Fn(&str) -> bool) -> Result<()> {
        // None: the deadline is past what an Instant can hold, so never expire
        let deadline = self.clock.now().checked_add(timeout);
        loop {
            let screen = self.backend.capture()?;
            if done(&screen) {
                return Ok(());
            }
            if deadline.is_some_and(|d| self.clock.now() >= d) {
                return Err(AutopilotError::Timeout {
                    what: what.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            self.clock.sleep(self.settings.poll_interval);
        }
    }
}
