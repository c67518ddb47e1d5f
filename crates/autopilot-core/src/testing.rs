//! In-memory stand-ins for the shell, the clock and the desktop.

use crate::action::Action;
use crate::desktop::{Browser, SlideBackend, WindowFocus};
use crate::error::Result;
use crate::operator::{CatchUpChoice, Command, Operator};
use crate::state::{ExecutionState, StateStore};
use crate::terminal::{Clock, TerminalBackend};
use crate::types::Workspace;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeClock {
    start: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

// ---------------------------------------------------------------------------
// ScriptedScreen: one canned screen per capture, the last one repeats
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScreenInner {
    screens: VecDeque<String>,
    current: String,
    captures: usize,
    sent: Vec<String>,
}

#[derive(Clone, Default)]
pub struct ScriptedScreen {
    inner: Rc<RefCell<ScreenInner>>,
}

impl ScriptedScreen {
    pub fn new<'a>(screens: impl IntoIterator<Item = &'a str>) -> Self {
        let screen = Self::default();
        screen.inner.borrow_mut().screens = screens.into_iter().map(str::to_string).collect();
        screen
    }

    pub fn captures(&self) -> usize {
        self.inner.borrow().captures
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }
}

impl TerminalBackend for ScriptedScreen {
    fn capture(&self) -> Result<String> {
        let mut inner = self.inner.borrow_mut();
        inner.captures += 1;
        if let Some(next) = inner.screens.pop_front() {
            inner.current = next;
        }
        Ok(inner.current.clone())
    }

    fn send(&self, keys: &str) -> Result<()> {
        self.inner.borrow_mut().sent.push(keys.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeShell: a tiny line-oriented shell that understands `echo`
// ---------------------------------------------------------------------------

struct ShellInner {
    history: String,
    pending: String,
    exit_code: i32,
    sent: Vec<String>,
    commands: Vec<String>,
}

#[derive(Clone)]
pub struct FakeShell {
    inner: Rc<RefCell<ShellInner>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::with_history("")
    }

    /// Start with `history` already on screen, above an idle prompt.
    pub fn with_history(history: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ShellInner {
                history: history.to_string(),
                pending: String::new(),
                exit_code: 0,
                sent: Vec::new(),
                commands: Vec::new(),
            })),
        }
    }

    /// Value reported by `$?` from now on.
    pub fn set_exit_code(&self, code: i32) {
        self.inner.borrow_mut().exit_code = code;
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }

    /// Complete command lines received so far.
    pub fn commands(&self) -> Vec<String> {
        self.inner.borrow().commands.clone()
    }
}

impl ShellInner {
    fn run_line(&mut self) {
        let line = std::mem::take(&mut self.pending);
        self.history.push_str("$ ");
        self.history.push_str(&line);
        self.history.push('\n');
        if let Some(args) = line.strip_prefix("echo ") {
            let out = args.replace("$?", &self.exit_code.to_string());
            self.history.push_str(&out);
            self.history.push('\n');
        }
        self.commands.push(line);
    }
}

impl TerminalBackend for FakeShell {
    fn capture(&self) -> Result<String> {
        let inner = self.inner.borrow();
        let prompt = format!("$ {}", inner.pending);
        Ok(format!("{}{}\n\n\n", inner.history, prompt.trim_end()))
    }

    fn send(&self, keys: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.sent.push(keys.to_string());
        let keys = if keys == "\\;" { ";" } else { keys };
        for ch in keys.chars() {
            if ch == '\n' {
                inner.run_line();
            } else {
                inner.pending.push(ch);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Desktop
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingSlides {
    pub gotos: Rc<RefCell<Vec<u32>>>,
}

impl SlideBackend for RecordingSlides {
    fn goto(&self, slide: u32) -> Result<()> {
        self.gotos.borrow_mut().push(slide);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingFocus {
    pub focused: Rc<RefCell<Vec<Workspace>>>,
}

impl WindowFocus for RecordingFocus {
    fn focus(&self, workspace: Workspace) -> Result<()> {
        self.focused.borrow_mut().push(workspace);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingBrowser {
    pub opened: Rc<RefCell<Vec<String>>>,
}

impl Browser for RecordingBrowser {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State store
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryStateStore {
    pub saved: Rc<RefCell<Vec<ExecutionState>>>,
}

impl MemoryStateStore {
    pub fn last(&self) -> Option<ExecutionState> {
        self.saved.borrow().last().cloned()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<ExecutionState> {
        self.last().ok_or_else(|| {
            crate::error::AutopilotError::InvalidState("nothing saved yet".to_string())
        })
    }

    fn save(&self, state: &ExecutionState) -> Result<()> {
        self.saved.borrow_mut().push(state.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

#[derive(Default)]
struct OperatorInner {
    commands: VecDeque<Command>,
    choices: VecDeque<CatchUpChoice>,
    shown: Vec<usize>,
    prompted: Vec<usize>,
    acknowledged: usize,
}

/// Replays canned answers. Runs out of commands -> quits.
#[derive(Clone, Default)]
pub struct ScriptedOperator {
    inner: Rc<RefCell<OperatorInner>>,
}

impl ScriptedOperator {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        let op = Self::default();
        op.inner.borrow_mut().commands = commands.into_iter().collect();
        op
    }

    pub fn with_choices(self, choices: impl IntoIterator<Item = CatchUpChoice>) -> Self {
        self.inner.borrow_mut().choices = choices.into_iter().collect();
        self
    }

    /// Steps rendered, in order.
    pub fn shown(&self) -> Vec<usize> {
        self.inner.borrow().shown.clone()
    }

    /// Steps at which a command was read.
    pub fn prompted(&self) -> Vec<usize> {
        self.inner.borrow().prompted.clone()
    }

    pub fn acknowledged(&self) -> usize {
        self.inner.borrow().acknowledged
    }
}

impl Operator for ScriptedOperator {
    fn show(&mut self, step: usize, _total: usize, _action: &Action) {
        self.inner.borrow_mut().shown.push(step);
    }

    fn command(&mut self, _state: &ExecutionState, step: usize, _total: usize) -> Result<Command> {
        let mut inner = self.inner.borrow_mut();
        inner.prompted.push(step);
        Ok(inner.commands.pop_front().unwrap_or(Command::Quit))
    }

    fn catch_up(&mut self, _showing: u32, _target: u32) -> Result<CatchUpChoice> {
        Ok(self
            .inner
            .borrow_mut()
            .choices
            .pop_front()
            .unwrap_or(CatchUpChoice::Abort))
    }

    fn acknowledge(&mut self, _message: &str) -> Result<()> {
        self.inner.borrow_mut().acknowledged += 1;
        Ok(())
    }
}
