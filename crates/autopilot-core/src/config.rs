use crate::error::Result;
use crate::paths;
use crate::terminal::TerminalSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TypingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Upper bound of the random delay between two simulated keystrokes.
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
    /// Pause before and after a simulated newline.
    #[serde(default = "default_newline_pause_ms")]
    pub newline_pause_ms: u64,
}

fn default_max_jitter_ms() -> u64 {
    200
}

fn default_newline_pause_ms() -> u64 {
    1000
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            max_jitter_ms: default_max_jitter_ms(),
            newline_pause_ms: default_newline_pause_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// TmuxConfig / SlidesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmuxConfig {
    /// `-t` target for capture-pane / send-keys. Unset means the current pane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidesConfig {
    /// Program invoked as `<command> <slide number>` to move the remote deck.
    #[serde(default = "default_slides_command")]
    pub command: String,
}

fn default_slides_command() -> String {
    "./gotoslide.js".to_string()
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            command: default_slides_command(),
        }
    }
}

// ---------------------------------------------------------------------------
// WindowManager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I3Workspaces {
    #[serde(default = "default_ws_slides")]
    pub slides: String,
    #[serde(default = "default_ws_terminal")]
    pub terminal: String,
    #[serde(default = "default_ws_browser")]
    pub browser: String,
    /// Workspace switched back to after raising one of the others.
    #[serde(default = "default_ws_home")]
    pub home: String,
}

fn default_ws_slides() -> String {
    "3".to_string()
}

fn default_ws_terminal() -> String {
    "2".to_string()
}

fn default_ws_browser() -> String {
    "4".to_string()
}

fn default_ws_home() -> String {
    "1".to_string()
}

impl Default for I3Workspaces {
    fn default() -> Self {
        Self {
            slides: default_ws_slides(),
            terminal: default_ws_terminal(),
            browser: default_ws_browser(),
            home: default_ws_home(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowManager {
    I3 {
        #[serde(default)]
        workspaces: I3Workspaces,
    },
    None,
}

impl Default for WindowManager {
    fn default() -> Self {
        WindowManager::I3 {
            workspaces: I3Workspaces::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_long_wait_factor")]
    pub long_wait_factor: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Grace period after sending a command, before polling for completion.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub typing: TypingConfig,
    #[serde(default)]
    pub tmux: TmuxConfig,
    #[serde(default)]
    pub slides: SlidesConfig,
    #[serde(default)]
    pub window_manager: WindowManager,
    /// Host segment of `open` URLs replaced by the address found on screen.
    #[serde(default = "default_placeholder_host")]
    pub placeholder_host: String,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// One address per line; the first one is quoted in bootstrap hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips_file: Option<PathBuf>,
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_long_wait_factor() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_settle_ms() -> u64 {
    500
}

fn default_placeholder_host() -> String {
    "node1".to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from(paths::STATE_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            long_wait_factor: default_long_wait_factor(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
            typing: TypingConfig::default(),
            tmux: TmuxConfig::default(),
            slides: SlidesConfig::default(),
            window_manager: WindowManager::default(),
            placeholder_host: default_placeholder_host(),
            state_file: default_state_file(),
            ips_file: None,
        }
    }
}

impl Config {
    /// Load `autopilot.yaml` from `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn state_path(&self, root: &Path) -> PathBuf {
        paths::state_path(root, &self.state_file)
    }

    pub fn terminal_settings(&self) -> TerminalSettings {
        TerminalSettings {
            timeout: Duration::from_secs(self.timeout_seconds),
            long_wait_factor: self.long_wait_factor,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            settle: Duration::from_millis(self.settle_ms),
            max_jitter: Duration::from_millis(self.typing.max_jitter_ms),
            newline_pause: Duration::from_millis(self.typing.newline_pause_ms),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "timeout_seconds is 0: every wait fails on its first poll".to_string(),
            });
        }

        if self.long_wait_factor == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "long_wait_factor is 0: longwait markers can never be reached"
                    .to_string(),
            });
        }

        if Duration::from_secs(self.timeout_seconds)
            .checked_mul(self.long_wait_factor)
            .is_none()
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "timeout_seconds * long_wait_factor overflows: longwait never expires"
                    .to_string(),
            });
        }

        if self.poll_interval_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "poll_interval_ms is 0: tmux will be polled in a busy loop".to_string(),
            });
        }

        if self.slides.command.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "slides.command is empty".to_string(),
            });
        }

        if self.placeholder_host.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "placeholder_host is empty: open URLs are used unmodified".to_string(),
            });
        }

        if let Some(ips) = &self.ips_file {
            if !ips.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("ips_file '{}' does not exist", ips.display()),
                });
            }
        }

        warnings
    }
}
