use std::fmt;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// How a snippet is delivered to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// Literal key sequence, sent as-is.
    Keys,
    /// Shell command line.
    Bash,
    /// Regex whose most recent match on screen is typed back in.
    Copypaste,
    /// URL template opened in the browser.
    Open,
    /// Marker awaited after the preceding command.
    Wait,
    /// Same as `Wait` with the long timeout.
    LongWait,
    /// Tag this version does not know about.
    Other(String),
}

impl Method {
    pub fn parse(tag: &str) -> Method {
        match tag.trim() {
            "keys" => Method::Keys,
            "bash" => Method::Bash,
            "copypaste" => Method::Copypaste,
            "open" => Method::Open,
            "wait" => Method::Wait,
            "longwait" => Method::LongWait,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Keys => "keys",
            Method::Bash => "bash",
            Method::Copypaste => "copypaste",
            Method::Open => "open",
            Method::Wait => "wait",
            Method::LongWait => "longwait",
            Method::Other(tag) => tag,
        }
    }

    /// `wait` and `longwait` only describe how the previous action completes.
    pub fn is_marker(&self) -> bool {
        matches!(self, Method::Wait | Method::LongWait)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Method {
    fn from(tag: &str) -> Self {
        Method::parse(tag)
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Window-manager workspaces the engine switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workspace {
    Slides,
    Terminal,
    Browser,
}

impl Workspace {
    pub fn as_str(self) -> &'static str {
        match self {
            Workspace::Slides => "slides",
            Workspace::Terminal => "terminal",
            Workspace::Browser => "browser",
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
