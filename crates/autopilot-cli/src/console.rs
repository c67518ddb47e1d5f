//! The presenter's console: renders the current slide and reads single keys.

use autopilot_core::action::Action;
use autopilot_core::deck::Deck;
use autopilot_core::operator::{CatchUpChoice, Command, Operator};
use autopilot_core::state::ExecutionState;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Write};

const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

/// Raw mode for exactly one key press; restored on drop.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::debug!(error = %e, "failed to leave raw mode");
        }
    }
}

fn read_key() -> io::Result<KeyEvent> {
    let _raw = RawMode::enable()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// A key in the step menu. `g` needs a number typed afterwards.
#[derive(Debug, PartialEq, Eq)]
enum StepKey {
    Command(Command),
    GoTo,
}

fn step_key(key: &KeyEvent) -> StepKey {
    if is_interrupt(key) {
        return StepKey::Command(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Char('y') | KeyCode::Char(' ') | KeyCode::Enter => Command::Execute,
        KeyCode::Char('n') | KeyCode::Right => Command::Next,
        KeyCode::Char('p') | KeyCode::Left => Command::Previous,
        KeyCode::Char('s') => Command::ToggleSimulateTyping,
        KeyCode::Char('v') => Command::ToggleVerifyExitStatus,
        KeyCode::Char('g') => return StepKey::GoTo,
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('c') => Command::Continue,
        other => Command::Unknown(format!("{other:?}")),
    };
    StepKey::Command(command)
}

fn catch_up_key(key: &KeyEvent) -> Option<CatchUpChoice> {
    if is_interrupt(key) {
        return Some(CatchUpChoice::Abort);
    }
    match key.code {
        KeyCode::Char('z') | KeyCode::Enter => Some(CatchUpChoice::Jump),
        KeyCode::Char('n') | KeyCode::Right | KeyCode::Char(' ') => Some(CatchUpChoice::Next),
        KeyCode::Char('p') | KeyCode::Left => Some(CatchUpChoice::Previous),
        KeyCode::Char('q') => Some(CatchUpChoice::Abort),
        _ => None,
    }
}

fn hrule() -> String {
    let width = crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(80);
    "=".repeat(width)
}

/// Slide text with the snippet being run shown in reverse video.
fn highlight(content: &str, snippet: &str) -> String {
    if snippet.is_empty() {
        return content.to_string();
    }
    content.replace(snippet, &format!("{REVERSE}{snippet}{RESET}"))
}

/// Operator backed by the controlling terminal.
pub struct Console {
    deck: Deck,
}

impl Console {
    pub fn new(deck: Deck) -> Self {
        Self { deck }
    }

    /// The action's slide with its snippet highlighted.
    fn render(&self, action: &Action) -> String {
        match self.deck.slide(action.slide) {
            Some(slide) => highlight(&slide.content, &action.source),
            None => format!("{REVERSE}{}{RESET}", action.source),
        }
    }

    fn prompt_number(&self) -> io::Result<usize> {
        loop {
            print!("Enter snippet number: ");
            io::stdout().flush()?;
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stdin closed while reading a snippet number",
                ));
            }
            match line.trim().parse() {
                Ok(n) => return Ok(n),
                Err(_) => println!("Error: {:?} is not a valid integer", line.trim()),
            }
        }
    }
}

impl Operator for Console {
    fn show(&mut self, _step: usize, _total: usize, action: &Action) {
        let rule = hrule();
        println!("{rule}");
        println!("{}", self.render(action));
        println!("{rule}");
    }

    fn command(
        &mut self,
        state: &ExecutionState,
        step: usize,
        total: usize,
    ) -> autopilot_core::Result<Command> {
        println!(
            "simulate_type:{} verify_status:{}",
            state.simulate_typing, state.verify_exit_status
        );
        println!("[{step}/{total}] Shall we execute that snippet above?");
        println!("y/⎵/⏎   Execute snippet");
        println!("p/←     Previous snippet");
        println!("n/→     Next snippet");
        println!("s       Simulate keystrokes");
        println!("v       Validate exit status");
        println!("g       Go to a specific snippet");
        println!("q       Quit");
        println!("c       Continue non-interactively until next error");

        match step_key(&read_key()?) {
            StepKey::Command(command) => Ok(command),
            StepKey::GoTo => Ok(Command::Jump(self.prompt_number()?)),
        }
    }

    fn catch_up(&mut self, showing: u32, target: u32) -> autopilot_core::Result<CatchUpChoice> {
        println!("Catching up on slide: {showing} -> {target}");
        println!("z/⏎     Zoom to target slide");
        println!("n/→/⎵   Next slide");
        println!("p/←     Previous slide");
        println!("q       Abort remote control");
        loop {
            if let Some(choice) = catch_up_key(&read_key()?) {
                return Ok(choice);
            }
        }
    }

    fn acknowledge(&mut self, message: &str) -> autopilot_core::Result<()> {
        println!("{message}");
        read_key()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn step_keys() {
        assert_eq!(step_key(&key(KeyCode::Enter)), StepKey::Command(Command::Execute));
        assert_eq!(step_key(&key(KeyCode::Char(' '))), StepKey::Command(Command::Execute));
        assert_eq!(step_key(&key(KeyCode::Right)), StepKey::Command(Command::Next));
        assert_eq!(step_key(&key(KeyCode::Char('p'))), StepKey::Command(Command::Previous));
        assert_eq!(step_key(&key(KeyCode::Char('c'))), StepKey::Command(Command::Continue));
        assert_eq!(step_key(&key(KeyCode::Char('g'))), StepKey::GoTo);
    }

    #[test]
    fn ctrl_c_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(step_key(&ctrl_c), StepKey::Command(Command::Quit));
        assert_eq!(catch_up_key(&ctrl_c), Some(CatchUpChoice::Abort));
    }

    #[test]
    fn unmapped_step_key_is_unknown() {
        assert!(matches!(
            step_key(&key(KeyCode::Char('x'))),
            StepKey::Command(Command::Unknown(_))
        ));
    }

    #[test]
    fn catch_up_keys() {
        assert_eq!(catch_up_key(&key(KeyCode::Char('z'))), Some(CatchUpChoice::Jump));
        assert_eq!(catch_up_key(&key(KeyCode::Char(' '))), Some(CatchUpChoice::Next));
        assert_eq!(catch_up_key(&key(KeyCode::Left)), Some(CatchUpChoice::Previous));
        assert_eq!(catch_up_key(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn highlight_wraps_snippet() {
        let shown = highlight("run:\n```bash ls```\n", "bash ls");
        assert_eq!(shown, "run:\n```\x1b[7mbash ls\x1b[0m```\n");
        assert_eq!(highlight("plain", ""), "plain");
    }

    #[test]
    fn render_highlights_snippet_on_its_slide() {
        let deck = Deck::parse("# One\n---\n# Two\n.exercise[\n```keys ^C```\n]\n").unwrap();
        let action = deck.actions[0].clone();
        let console = Console::new(deck);
        let shown = console.render(&action);
        assert!(shown.starts_with("# Two"));
        assert!(shown.contains("\x1b[7mkeys ^C\x1b[0m"));

        let stray = Action::new(9, "keys", "^D");
        assert_eq!(console.render(&stray), "\x1b[7mkeys ^D\x1b[0m");
    }
}
