mod commands;
mod llm;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use focustime_core::time_range::TimeRange;

#[derive(Parser)]
#[command(name = "focustime")]
#[command(about = "Analyze your calendar and get focus time recommendations")]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze meetings in a time range
    Analyze {
        /// Time range to analyze
        #[arg(short, long, value_enum, default_value_t = RangeArg::CurrentWeek)]
        range: RangeArg,

        /// Generate focus time suggestions with a language model
        #[arg(short = 'o', long)]
        optimize: bool,

        /// List the meetings that could be moved
        #[arg(short = 's', long)]
        show_reschedulable: bool,

        /// Only read this calendar (by directory name)
        #[arg(short, long)]
        calendar: Option<String>,
    },
    /// List events in a time range
    List {
        /// Time range to list events for
        #[arg(short, long, value_enum, default_value_t = RangeArg::CurrentWeek)]
        range: RangeArg,

        /// Only read this calendar (by directory name)
        #[arg(short, long)]
        calendar: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Mark a meeting as "never move" by event UID
    NeverMove {
        #[arg(short, long)]
        event_id: String,
    },
    /// Remove the "never move" mark from a meeting
    AllowMove {
        #[arg(short, long)]
        event_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    Tomorrow,
    CurrentWeek,
    NextWeek,
}

impl From<RangeArg> for TimeRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Tomorrow => TimeRange::Tomorrow,
            RangeArg::CurrentWeek => TimeRange::CurrentWeek,
            RangeArg::NextWeek => TimeRange::NextWeek,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Analyze {
            range,
            optimize,
            show_reschedulable,
            calendar,
        } => {
            commands::analyze::run(commands::analyze::AnalyzeOptions {
                range: range.into(),
                optimize,
                show_reschedulable,
                calendar,
            })
            .await
        }
        Commands::List { range, calendar } => commands::list::run(range.into(), calendar),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::NeverMove { event_id } => commands::config::never_move(&event_id),
            ConfigCommands::AllowMove { event_id } => commands::config::allow_move(&event_id),
        },
    }
}
