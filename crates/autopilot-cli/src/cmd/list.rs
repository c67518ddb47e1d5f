use crate::output::{preview, print_json, print_table};
use anyhow::Context;
use autopilot_core::deck::Deck;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SnippetRow<'a> {
    step: usize,
    slide: u32,
    method: &'a str,
    payload: &'a str,
}

pub fn run(deck_path: &Path, json: bool) -> anyhow::Result<()> {
    let deck = Deck::load(deck_path)
        .with_context(|| format!("failed to read deck {}", deck_path.display()))?;

    if json {
        let rows: Vec<SnippetRow> = deck
            .actions
            .iter()
            .enumerate()
            .map(|(step, a)| SnippetRow {
                step,
                slide: a.slide,
                method: a.method.as_str(),
                payload: &a.payload,
            })
            .collect();
        return print_json(&rows);
    }

    if deck.actions.is_empty() {
        println!("No snippets in {}.", deck_path.display());
        return Ok(());
    }

    let rows = deck
        .actions
        .iter()
        .enumerate()
        .map(|(step, a)| {
            vec![
                step.to_string(),
                a.slide.to_string(),
                a.method.to_string(),
                preview(&a.payload),
            ]
        })
        .collect();
    print_table(&["STEP", "SLIDE", "METHOD", "SNIPPET"], rows);
    Ok(())
}
