//! CLI frontend for the Spinnrad decision wheel.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use commands::Context;

#[derive(Parser)]
#[command(
    name = "spinnrad",
    about = "Spinnrad: a decision wheel that remembers who keeps losing",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding the saved state (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// RNG seed for reproducible spins
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one or more decisions
    Add {
        /// Decision texts
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Remove the decision at a 1-based position
    Remove {
        /// Position as shown by `list`
        position: usize,
    },

    /// Remove every decision
    Clear,

    /// List the current decisions
    List,

    /// Spin the wheel
    Spin {
        /// Stop early after this many milliseconds
        #[arg(long)]
        stop_after: Option<u64>,

        /// Only print the result
        #[arg(short, long)]
        quiet: bool,
    },

    /// Manage saved decision lists
    #[command(subcommand)]
    Preset(PresetCommand),

    /// Browse and export past spins
    #[command(subcommand)]
    History(HistoryCommand),

    /// Edit the dice that decide how long a spin lasts
    #[command(subcommand)]
    Dice(DiceCommand),

    /// Inspect and tune pity weighting
    #[command(subcommand)]
    Pity(PityCommand),
}

#[derive(Subcommand)]
enum PresetCommand {
    /// Save the current decisions under a name
    Save {
        /// Preset name
        name: String,
    },
    /// Replace the decisions with a preset's
    Apply {
        /// Preset name or id
        name: String,
    },
    /// Delete a preset
    Delete {
        /// Preset name or id
        name: String,
    },
    /// List saved presets
    List,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Show one page of history, newest first
    Show {
        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Entries per page
        #[arg(long, default_value = "10")]
        page_size: usize,
    },
    /// Forget every spin
    Clear,
    /// Print the whole history as a document
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,
    },
}

#[derive(Subcommand)]
enum DiceCommand {
    /// Show the dice table
    Show,
    /// Replace the dice table
    Set {
        /// Faces as FACE=SECONDS, e.g. 1=3 2=5
        #[arg(required = true)]
        faces: Vec<String>,
    },
    /// Restore the built-in table
    Reset,
}

#[derive(Subcommand)]
enum PityCommand {
    /// Show miss counts and weights for the active scope
    Show,
    /// Change pity settings
    Config(PityConfigArgs),
    /// Reset miss counts (default: the scope chosen with `pity scope`)
    Reset {
        /// Reset every scope
        #[arg(long, conflicts_with_all = ["global", "preset"])]
        all: bool,

        /// Reset the global scope
        #[arg(long, conflicts_with = "preset")]
        global: bool,

        /// Reset a preset's scope
        #[arg(long, value_name = "NAME")]
        preset: Option<String>,
    },
    /// Choose which counters `pity reset` targets by default
    Scope {
        /// Counter scope
        #[arg(value_enum)]
        mode: ScopeArg,
    },
}

#[derive(Args)]
struct PityConfigArgs {
    /// Turn pity weighting on or off
    #[arg(long)]
    enabled: Option<bool>,

    /// Weight added per miss
    #[arg(long)]
    soft_increment: Option<String>,

    /// Misses after which an option is forced
    #[arg(long)]
    hard_threshold: Option<String>,

    /// Upper bound on an option's weight
    #[arg(long)]
    cap: Option<String>,

    /// Reset the scope once every option has been forced
    #[arg(long)]
    auto_reset: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Text,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Global,
    Preset,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.data_dir, cli.seed);

    let result = match cli.command {
        Commands::Add { texts } => commands::decisions::add(&ctx, &texts),
        Commands::Remove { position } => commands::decisions::remove(&ctx, position),
        Commands::Clear => commands::decisions::clear(&ctx),
        Commands::List => commands::decisions::list(&ctx),
        Commands::Spin { stop_after, quiet } => commands::spin::run(&ctx, stop_after, quiet),
        Commands::Preset(cmd) => match cmd {
            PresetCommand::Save { name } => commands::preset::save(&ctx, &name),
            PresetCommand::Apply { name } => commands::preset::apply(&ctx, &name),
            PresetCommand::Delete { name } => commands::preset::delete(&ctx, &name),
            PresetCommand::List => commands::preset::list(&ctx),
        },
        Commands::History(cmd) => match cmd {
            HistoryCommand::Show { page, page_size } => {
                commands::history::show(&ctx, page, page_size)
            }
            HistoryCommand::Clear => commands::history::clear(&ctx),
            HistoryCommand::Export { format } => {
                let format = match format {
                    FormatArg::Markdown => sr_app::ExportFormat::Markdown,
                    FormatArg::Text => sr_app::ExportFormat::Text,
                };
                commands::history::export(&ctx, format)
            }
        },
        Commands::Dice(cmd) => match cmd {
            DiceCommand::Show => commands::dice::show(&ctx),
            DiceCommand::Set { faces } => commands::dice::set(&ctx, &faces),
            DiceCommand::Reset => commands::dice::reset(&ctx),
        },
        Commands::Pity(cmd) => match cmd {
            PityCommand::Show => commands::pity::show(&ctx),
            PityCommand::Config(args) => commands::pity::config(
                &ctx,
                commands::pity::ConfigChanges {
                    enabled: args.enabled,
                    soft_increment: args.soft_increment,
                    hard_threshold: args.hard_threshold,
                    cap: args.cap,
                    auto_reset: args.auto_reset,
                },
            ),
            PityCommand::Reset {
                all,
                global,
                preset,
            } => commands::pity::reset(&ctx, all, global, preset.as_deref()),
            PityCommand::Scope { mode } => {
                let mode = match mode {
                    ScopeArg::Global => sr_core::ScopeMode::Global,
                    ScopeArg::Preset => sr_core::ScopeMode::Preset,
                };
                commands::pity::scope(&ctx, mode)
            }
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
