use crate::output::print_json;
use anyhow::Context;
use autopilot_core::config::{Config, WarnLevel};
use autopilot_core::paths;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration, defaults included
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write the effective configuration to autopilot.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Init { force } => init(root, force),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    let config = Config::load(root).context("failed to load config")?;
    let findings = config.validate();
    let errors = findings
        .iter()
        .filter(|f| f.level == WarnLevel::Error)
        .count();

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "exists": path.exists(),
            "valid": errors == 0,
            "warnings": findings,
        }))?;
    } else {
        let source = if path.exists() {
            path.display().to_string()
        } else {
            "built-in defaults".to_string()
        };
        if findings.is_empty() {
            println!("{source}: no problems found.");
        }
        for f in &findings {
            let label = match f.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{source}: {label}: {}", f.message);
        }
    }

    if errors > 0 {
        anyhow::bail!("{errors} error(s) in the configuration");
    }
    Ok(())
}

fn init(root: &Path, force: bool) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = Config::load(root).unwrap_or_default();
    config.save(root).context("failed to write config")?;
    println!("Wrote {}", path.display());
    Ok(())
}
