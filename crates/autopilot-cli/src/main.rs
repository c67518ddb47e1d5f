mod cmd;
mod console;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, run::Overrides, state::StateSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autopilot",
    about = "Replay the snippets of a slide deck into a live tmux shell",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from autopilot.yaml)
    #[arg(long, global = true, env = "AUTOPILOT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step through a deck, executing its snippets in tmux
    Run {
        /// Markdown deck to replay
        deck: PathBuf,

        /// Execute every remaining snippet without asking
        #[arg(long)]
        non_interactive: bool,

        /// Check the exit status after every shell command
        #[arg(long)]
        verify: bool,

        /// Send snippets in one go instead of typing them out
        #[arg(long)]
        no_typing: bool,

        /// Start from this snippet (0-based)
        #[arg(long, value_name = "STEP")]
        from: Option<usize>,
    },

    /// List the snippets found in a deck
    List {
        /// Markdown deck to read
        deck: PathBuf,
    },

    /// Inspect or reset the persisted execution state
    State {
        #[command(subcommand)]
        subcommand: StateSubcommand,
    },

    /// Show and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Run {
            deck,
            non_interactive,
            verify,
            no_typing,
            from,
        } => cmd::run::run(
            &root,
            &deck,
            &Overrides {
                non_interactive,
                verify,
                no_typing,
                from,
            },
        ),
        Commands::List { deck } => cmd::list::run(&deck, cli.json),
        Commands::State { subcommand } => cmd::state::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
