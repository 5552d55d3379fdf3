mod cmd;
mod context;
mod output;
mod secrets;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use context::Options;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Review Asana projects through cached, filtered views",
    version,
    propagate_version = true
)]
struct Cli {
    /// Settings file (default: ./triage.yaml)
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Read secrets from the environment only, never the OS keychain
    #[arg(
        long,
        global = true,
        env = "TRIAGE_NO_KEYRING",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    no_keyring: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and write the token, workspace and initials
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List the views available to the configured reviewer
    Views,

    /// Show the projects in a view
    List {
        /// View key, e.g. `deadlines`
        view: String,
    },

    /// Walk a review view one project at a time, notes included
    Review {
        /// View key, e.g. `questionnaires`
        view: String,
    },

    /// Keep a view on screen, re-reading it through the cache
    Watch {
        /// View key
        view: String,
        /// Seconds between renders
        #[arg(long, default_value_t = 60)]
        interval: u64,
        /// Stop after this many renders
        #[arg(long)]
        count: Option<u32>,
        /// Fetch from Asana on every render instead of honoring the cache TTL
        #[arg(long)]
        refresh: bool,
    },

    /// List the color names `triage color` accepts
    Colors,

    /// Add a dated note to a project
    Note {
        /// Project gid
        project: String,
        /// Note text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Hide a project from your views until a date
    Hold {
        /// Project gid
        project: String,
        /// MM/DD, MM/DD/YY, MM/DD/YYYY or YYYY-MM-DD
        until: String,
    },

    /// Change a project's color
    Color {
        /// Project gid
        project: String,
        /// Color name, e.g. `light-blue`
        color: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = Options {
        settings_path: cli.config,
        json: cli.json,
        no_keyring: cli.no_keyring,
    };

    let result = match cli.command {
        Commands::Config { subcommand } => cmd::config::run(&opts, subcommand),
        Commands::Views => cmd::views::run(&opts),
        Commands::List { view } => cmd::list::run(&opts, &view),
        Commands::Review { view } => cmd::list::review(&opts, &view),
        Commands::Watch {
            view,
            interval,
            count,
            refresh,
        } => cmd::watch::run(&opts, &view, Duration::from_secs(interval), count, refresh),
        Commands::Colors => cmd::colors::run(&opts),
        Commands::Note { project, text } => cmd::note::run(&opts, &project, &text.join(" ")),
        Commands::Hold { project, until } => cmd::note::hold(&opts, &project, &until),
        Commands::Color { project, color } => cmd::note::color(&opts, &project, &color),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
