use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use idxalloc::cli::custom::CustomCommand;
use idxalloc::cli::parse::ParseArgs;
use idxalloc::cli::rebalance::RebalanceArgs;
use idxalloc::cli::targets::TargetsArgs;
use idxalloc::core::log::init_logging;
use idxalloc::core::sort::PlanColumn;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightMode {
    /// Top holdings stand for the whole index slice
    Full,
    /// Top holdings keep their real summed weight
    Actual,
}

impl From<WeightMode> for bool {
    fn from(mode: WeightMode) -> bool {
        matches!(mode, WeightMode::Full)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortColumn {
    Symbol,
    Name,
    Target,
    Current,
    TargetValue,
    Delta,
    Buy,
}

impl From<SortColumn> for PlanColumn {
    fn from(col: SortColumn) -> PlanColumn {
        match col {
            SortColumn::Symbol => PlanColumn::Symbol,
            SortColumn::Name => PlanColumn::Name,
            SortColumn::Target => PlanColumn::TargetPct,
            SortColumn::Current => PlanColumn::Current,
            SortColumn::TargetValue => PlanColumn::TargetValue,
            SortColumn::Delta => PlanColumn::Delta,
            SortColumn::Buy => PlanColumn::SuggestedBuy,
        }
    }
}

#[derive(Subcommand)]
enum CustomCommands {
    /// Add a custom stock or update its weight
    Add {
        symbol: String,
        /// Weight in percent of the whole portfolio
        weight: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a custom stock
    Remove { symbol: String },
    /// List custom stocks
    List,
}

impl From<CustomCommands> for CustomCommand {
    fn from(cmd: CustomCommands) -> CustomCommand {
        match cmd {
            CustomCommands::Add {
                symbol,
                weight,
                name,
            } => CustomCommand::Add {
                symbol,
                name,
                weight,
            },
            CustomCommands::Remove { symbol } => CustomCommand::Remove { symbol },
            CustomCommands::List => CustomCommand::List,
        }
    }
}

impl From<Commands> for idxalloc::AppCommand {
    fn from(cmd: Commands) -> idxalloc::AppCommand {
        match cmd {
            Commands::Holdings => idxalloc::AppCommand::Holdings,
            Commands::Targets { amount, weights } => {
                idxalloc::AppCommand::Targets(TargetsArgs {
                    amount,
                    rescale: weights.map(Into::into),
                })
            }
            Commands::Custom { command } => idxalloc::AppCommand::Custom(command.into()),
            Commands::Parse { file, ocr, all } => idxalloc::AppCommand::Parse(ParseArgs {
                input: file,
                ocr,
                all,
            }),
            Commands::Rebalance {
                new_total,
                additional,
                set,
                paste,
                image,
                sort,
                desc,
                weights,
            } => idxalloc::AppCommand::Rebalance(RebalanceArgs {
                new_total,
                additional,
                set,
                paste,
                image,
                sort: sort.map(Into::into),
                desc,
                rescale: weights.map(Into::into),
            }),
            Commands::Trend { days } => idxalloc::AppCommand::Trend { days },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the largest holdings of the latest index snapshot
    Holdings,
    /// Show target weights, optionally split across an investment amount
    Targets {
        /// Amount to invest, e.g. "$10,000"
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long, value_enum)]
        weights: Option<WeightMode>,
    },
    /// Manage custom stocks
    Custom {
        #[command(subcommand)]
        command: CustomCommands,
    },
    /// Extract holdings from pasted text or a screenshot
    Parse {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Run OCR on an image instead of reading text
        #[arg(long)]
        ocr: bool,
        /// Keep every ticker instead of only tracked symbols
        #[arg(long)]
        all: bool,
    },
    /// Plan buys and sells toward the target weights
    Rebalance {
        /// Portfolio total after rebalancing; defaults to the current total
        #[arg(long, conflicts_with = "additional")]
        new_total: Option<String>,
        /// Extra cash to invest without selling
        #[arg(long)]
        additional: Option<String>,
        /// Current value of a holding, e.g. NVDA=12,000
        #[arg(long, value_name = "SYMBOL=VALUE")]
        set: Vec<String>,
        /// Text file with pasted holdings
        #[arg(long)]
        paste: Option<PathBuf>,
        /// Screenshot of holdings to run OCR on
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(short, long, value_enum)]
        weights: Option<WeightMode>,
    },
    /// Show how index weights changed over a window
    Trend {
        #[arg(short, long, default_value_t = 30)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => idxalloc::cli::setup::setup(),
        Some(cmd) => idxalloc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
