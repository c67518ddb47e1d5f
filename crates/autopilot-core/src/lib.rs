pub mod action;
pub mod config;
pub mod deck;
pub mod desktop;
pub mod display;
pub mod engine;
pub mod error;
pub mod io;
pub mod operator;
pub mod paths;
pub mod state;
pub mod terminal;
pub mod tmux;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AutopilotError, Result};
