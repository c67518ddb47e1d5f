use crate::console::Console;
use anyhow::Context;
use autopilot_core::config::Config;
use autopilot_core::deck::Deck;
use autopilot_core::desktop::{window_focus, ScriptSlides, SystemBrowser, WindowFocus};
use autopilot_core::display::DisplaySync;
use autopilot_core::engine::{Collaborators, Engine, Outcome};
use autopilot_core::state::{load_or_default, ExecutionState, YamlStateStore};
use autopilot_core::terminal::{SystemClock, Terminal};
use autopilot_core::tmux::{ensure_session, TmuxBackend};
use std::path::Path;
use std::rc::Rc;

/// Flags that adjust the persisted state for this run only.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub non_interactive: bool,
    pub verify: bool,
    pub no_typing: bool,
    pub from: Option<usize>,
}

impl Overrides {
    /// Applied after the state is loaded, so they win over the forced
    /// interactive mode.
    pub fn apply(&self, state: &mut ExecutionState) {
        if self.non_interactive {
            state.interactive = false;
        }
        if self.verify {
            state.verify_exit_status = true;
        }
        if self.no_typing {
            state.simulate_typing = false;
        }
        if let Some(step) = self.from {
            state.cursor = step;
        }
    }
}

pub fn run(root: &Path, deck_path: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut deck = Deck::load(deck_path)
        .with_context(|| format!("failed to read deck {}", deck_path.display()))?;
    tracing::info!(
        slides = deck.slides.len(),
        snippets = deck.actions.len(),
        "deck loaded"
    );
    if let Some(step) = overrides.from {
        if step > deck.actions.len() {
            anyhow::bail!("--from {step} is past the last snippet ({})", deck.actions.len());
        }
    }

    let tmux = TmuxBackend::new(config.tmux.target.clone());
    let ips_file = config.ips_file.as_ref().map(|p| root.join(p));
    ensure_session(&tmux, ips_file.as_deref())?;

    let terminal = Terminal::new(
        Box::new(tmux),
        Box::new(SystemClock),
        config.terminal_settings(),
    );
    terminal
        .wait_for_prompt()
        .context("no shell prompt in the tmux pane")?;

    let store = YamlStateStore::new(config.state_path(root));
    let mut state = load_or_default(&store, deck.actions.len());
    overrides.apply(&mut state);
    if state.is_complete(deck.actions.len()) {
        println!("All snippets already executed. Use `autopilot state reset` to start over.");
        return Ok(());
    }

    let focus: Rc<dyn WindowFocus> = Rc::from(window_focus(&config.window_manager));
    let display = DisplaySync::new(
        Box::new(ScriptSlides::new(config.slides.command.clone())),
        Rc::clone(&focus),
    );

    // the console keeps the slides for rendering; the engine owns the actions
    let actions = std::mem::take(&mut deck.actions);
    let mut engine = Engine::new(
        actions,
        state,
        Collaborators {
            store: Box::new(store),
            terminal,
            display,
            focus,
            browser: Box::new(SystemBrowser),
            operator: Box::new(Console::new(deck)),
        },
    )
    .with_placeholder_host(config.placeholder_host.clone());

    match engine.run()? {
        Outcome::Complete => println!("All snippets executed."),
        Outcome::Aborted => {
            println!("Stopped at snippet {}.", engine.state().cursor);
        }
    }
    Ok(())
}
