//! Unique Network staking CLI - inspect balances, check staking amounts and
//! export app-promotion history for UNQ and QTZ accounts.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use unqstake_core::amount::DEFAULT_DISPLAY_DECIMALS;
use unqstake_core::{HistoryKind, Network};

use commands::Session;

/// App-promotion staking client for Unique Network.
#[derive(Parser, Debug)]
#[command(name = "unqstake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Network to use. Defaults to the remembered or configured network.
    #[arg(short, long, global = true)]
    network: Option<NetworkArg>,

    /// Custom SDK REST endpoint URL (balances, queries, extrinsics)
    #[arg(long = "sdk-url", global = true)]
    sdk_url: Option<String>,

    /// Custom indexer endpoint URL (transaction history)
    #[arg(long = "indexer-url", global = true)]
    indexer_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Format a raw on-chain amount for display
    Format {
        /// Amount in base units
        raw: String,

        /// Token decimals (defaults to the network's)
        #[arg(long)]
        decimals: Option<u8>,

        /// Fraction digits to keep
        #[arg(long, default_value_t = DEFAULT_DISPLAY_DECIMALS)]
        display_decimals: u8,

        /// Print every fraction digit
        #[arg(long, conflicts_with = "trim")]
        full: bool,

        /// Print every significant fraction digit, without trailing zeros
        #[arg(long)]
        trim: bool,
    },

    /// Convert a decimal token amount to base units
    ToInteger {
        amount: String,

        /// Token decimals (defaults to the network's)
        #[arg(long)]
        decimals: Option<u8>,
    },

    /// Show balances and remaining stake slots of an account
    Balance {
        /// Account address. Defaults to the remembered account.
        address: Option<String>,
    },

    /// Check a stake or unstake amount against an account's balance
    Validate {
        amount: String,

        /// Validate an unstake instead of a stake
        #[arg(long)]
        unstake: bool,

        /// Account address. Defaults to the remembered account.
        #[arg(short, long)]
        address: Option<String>,

        /// Check against this balance instead of fetching one
        #[arg(long, value_name = "AMOUNT")]
        ceiling: Option<String>,
    },

    /// Show staking, reward and transfer history
    History {
        /// Account address. Defaults to the remembered account.
        address: Option<String>,

        /// Table to show: stake, unstake, rewards or transfers
        #[arg(short, long, default_value = "stake")]
        kind: HistoryKind,

        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to the configured size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Print explorer links
        #[arg(long)]
        links: bool,

        /// Export the whole table as CSV, optionally to PATH
        #[arg(long, value_name = "PATH")]
        csv: Option<Option<PathBuf>>,
    },

    /// Forget the remembered account
    Forget,
}

/// Network argument that can be parsed from string.
#[derive(Debug, Clone)]
struct NetworkArg(Network);

impl std::str::FromStr for NetworkArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unique" | "unq" => Ok(NetworkArg(Network::Unique)),
            "quartz" | "qtz" => Ok(NetworkArg(Network::Quartz)),
            _ => Err(format!(
                "Unknown network '{}'. Valid options: unique, quartz",
                s
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("unqstake=info".parse()?)
        .add_directive("unqstake_chain=info".parse()?)
        .add_directive("unqstake_core=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut session = Session::open(
        args.network.map(|n| n.0),
        args.sdk_url,
        args.indexer_url,
    );
    tracing::debug!("Using {:?}", session.endpoints());

    match args.command {
        Command::Format {
            raw,
            decimals,
            display_decimals,
            full,
            trim,
        } => {
            let style = if full {
                commands::FormatStyle::Full
            } else if trim {
                commands::FormatStyle::Trimmed
            } else {
                commands::FormatStyle::Display(display_decimals)
            };
            session.format(&raw, decimals, style);
        }
        Command::ToInteger { amount, decimals } => session.to_integer(&amount, decimals)?,
        Command::Balance { address } => session.balance(address).await?,
        Command::Validate {
            amount,
            unstake,
            address,
            ceiling,
        } => {
            let valid = session.validate(&amount, unstake, address, ceiling).await?;
            if !valid {
                std::process::exit(1);
            }
        }
        Command::History {
            address,
            kind,
            page,
            page_size,
            links,
            csv,
        } => {
            let options = commands::HistoryOptions {
                kind,
                page,
                page_size,
                links,
                csv,
            };
            session.history(address, options).await?;
        }
        Command::Forget => session.forget()?,
    }

    Ok(())
}
