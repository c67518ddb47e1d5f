//! Capabilities around the shell: the slide deck shown to the audience, the
//! browser, and the window manager that decides what is on screen.
//!
//! Each capability is a narrow trait; the adapters below shell out to the
//! programs found on a presenter's machine (a slide-control script, `i3-msg`,
//! the platform URL opener).

use crate::config::{I3Workspaces, WindowManager};
use crate::error::{AutopilotError, Result};
use crate::types::Workspace;
use std::process::Command;

pub trait SlideBackend {
    fn goto(&self, slide: u32) -> Result<()>;
}

pub trait Browser {
    fn open(&self, url: &str) -> Result<()>;
}

pub trait WindowFocus {
    fn focus(&self, workspace: Workspace) -> Result<()>;
}

/// Run `program args...` to completion, turning a non-zero exit into an error.
pub(crate) fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| AutopilotError::backend(program, e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let hint = stderr.trim().chars().take(500).collect::<String>();
        return Err(AutopilotError::backend(
            program,
            format!("{} {}", output.status, hint),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// Slides
// ---------------------------------------------------------------------------

/// Moves the remote deck by running `<command> <slide>`.
#[derive(Debug, Clone)]
pub struct ScriptSlides {
    command: String,
}

impl ScriptSlides {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl SlideBackend for ScriptSlides {
    fn goto(&self, slide: u32) -> Result<()> {
        tracing::debug!(slide, command = %self.command, "moving remote slides");
        run_checked(&self.command, &[&slide.to_string()])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Browser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        tracing::info!(url, "opening browser");
        open::that(url).map_err(|e| AutopilotError::backend("open", e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Window focus
// ---------------------------------------------------------------------------

/// i3: show the target workspace on its output, then give focus back to the
/// presenter's home workspace.
#[derive(Debug, Clone)]
pub struct I3Focus {
    workspaces: I3Workspaces,
}

impl I3Focus {
    pub fn new(workspaces: I3Workspaces) -> Self {
        Self { workspaces }
    }

    fn name(&self, workspace: Workspace) -> &str {
        match workspace {
            Workspace::Slides => &self.workspaces.slides,
            Workspace::Terminal => &self.workspaces.terminal,
            Workspace::Browser => &self.workspaces.browser,
        }
    }
}

impl WindowFocus for I3Focus {
    fn focus(&self, workspace: Workspace) -> Result<()> {
        run_checked("i3-msg", &["workspace", self.name(workspace)])?;
        run_checked("i3-msg", &["workspace", &self.workspaces.home])?;
        Ok(())
    }
}

/// No window manager integration: focus requests are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFocus;

impl WindowFocus for NoFocus {
    fn focus(&self, workspace: Workspace) -> Result<()> {
        tracing::debug!(%workspace, "window focus disabled");
        Ok(())
    }
}

pub fn window_focus(wm: &WindowManager) -> Box<dyn WindowFocus> {
    match wm {
        WindowManager::I3 { workspaces } => Box::new(I3Focus::new(workspaces.clone())),
        WindowManager::None => Box::new(NoFocus),
    }
}
