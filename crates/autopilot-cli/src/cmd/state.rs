use crate::output::print_json;
use anyhow::Context;
use autopilot_core::config::Config;
use autopilot_core::state::{ExecutionState, StateStore, YamlStateStore};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum StateSubcommand {
    /// Show the persisted execution state
    Show,

    /// Reset the state to its defaults
    Reset {
        /// Start from this snippet instead of the first one
        #[arg(long)]
        step: Option<usize>,
    },
}

pub fn run(root: &Path, subcmd: StateSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = YamlStateStore::new(config.state_path(root));
    match subcmd {
        StateSubcommand::Show => show(&store, json),
        StateSubcommand::Reset { step } => reset(&store, step),
    }
}

fn show(store: &YamlStateStore, json: bool) -> anyhow::Result<()> {
    let exists = store.exists();
    let state = if exists {
        store
            .load()
            .with_context(|| format!("failed to read {}", store.path().display()))?
    } else {
        ExecutionState::default()
    };

    if json {
        let value = serde_json::json!({
            "path": store.path(),
            "exists": exists,
            "state": state,
        });
        return print_json(&value);
    }

    if !exists {
        println!("No state file at {}; a run starts from the defaults.", store.path().display());
    }
    println!("{}", serde_yaml::to_string(&state)?.trim_end());
    Ok(())
}

fn reset(store: &YamlStateStore, step: Option<usize>) -> anyhow::Result<()> {
    let state = ExecutionState {
        cursor: step.unwrap_or(0),
        ..ExecutionState::default()
    };
    store
        .save(&state)
        .with_context(|| format!("failed to write {}", store.path().display()))?;
    println!("State reset: next step is {}.", state.cursor);
    Ok(())
}
