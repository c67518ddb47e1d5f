use crate::action::Action;
use crate::error::Result;
use crate::state::ExecutionState;

/// What the operator asked the engine to do with the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Execute,
    Next,
    Previous,
    ToggleSimulateTyping,
    ToggleVerifyExitStatus,
    Jump(usize),
    Quit,
    /// Drop out of interactive mode and execute until something fails.
    Continue,
    Unknown(String),
}

/// Answer to "the slides are behind, what now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpChoice {
    Jump,
    Next,
    Previous,
    Abort,
}

/// The human at the keyboard.
pub trait Operator {
    /// Render the step about to run.
    fn show(&mut self, step: usize, total: usize, action: &Action);

    /// Read one command for the current step.
    fn command(&mut self, state: &ExecutionState, step: usize, total: usize) -> Result<Command>;

    fn catch_up(&mut self, showing: u32, target: u32) -> Result<CatchUpChoice>;

    /// Block until the operator presses a key.
    fn acknowledge(&mut self, message: &str) -> Result<()>;
}
