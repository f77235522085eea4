mod commands;
mod output;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use farm_admin_sdk::dispatch::{Command, Config};
use farm_admin_sdk::gateway::Endpoint;
use farm_admin_sdk::metadata::MetadataPaths;

#[derive(Parser)]
#[command(name = "farm-admin", about = "Admin CLI for farm, PSP22 and wAZERO ink! contracts")]
struct Cli {
    /// Node endpoint: local, testnet, mainnet or a ws:// / wss:// URL
    #[arg(long, global = true, env = "FARM_ADMIN_CHAIN", default_value = "local")]
    chain: String,

    /// Farm contract metadata (.json from `cargo contract build`)
    #[arg(
        long,
        global = true,
        env = "FARM_ADMIN_FARM_METADATA",
        default_value = "artifacts/farm_contract.json"
    )]
    farm_metadata: PathBuf,

    /// PSP22 token metadata
    #[arg(
        long,
        global = true,
        env = "FARM_ADMIN_PSP22_METADATA",
        default_value = "artifacts/psp22.json"
    )]
    psp22_metadata: PathBuf,

    /// Wrapped AZERO metadata
    #[arg(
        long,
        global = true,
        env = "FARM_ADMIN_WRAPPED_METADATA",
        default_value = "artifacts/wrapped_azero.json"
    )]
    wrapped_metadata: PathBuf,

    /// Seed phrase or secret URI; prompted for when omitted
    #[arg(long, global = true, env = "FARM_ADMIN_PHRASE", hide_env_values = true)]
    phrase: Option<String>,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Deploy a new farm for a pool
    Create {
        /// Pool contract address
        #[arg(long)]
        pool: String,
        /// Reward token addresses
        #[arg(long, num_args = 1.., required = true)]
        rewards: Vec<String>,
    },
    /// Show a farm's current state
    Details {
        #[arg(long)]
        farm: String,
    },
    /// Raise reward token allowances, then start a reward period
    Start {
        #[arg(long)]
        farm: String,
        /// Start timestamp (ms)
        #[arg(long)]
        start: u64,
        /// End timestamp (ms)
        #[arg(long)]
        end: u64,
        /// Reward token addresses
        #[arg(long, num_args = 1.., required = true)]
        tokens: Vec<String>,
        /// Reward amounts, one per token (raw units)
        #[arg(long, num_args = 1.., required = true)]
        rewards: Vec<u128>,
    },
    /// Stop a running farm
    Stop {
        #[arg(long)]
        farm: String,
    },
    /// Withdraw the farm's balance of a token to the owner
    Withdraw {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        token: String,
    },
    /// Register another reward token on a farm
    AddRewardToken {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        token: String,
    },
    /// Let the farm spend more of a token
    IncreaseAllowance {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        token: String,
        /// Raw units
        #[arg(long)]
        amount: u128,
    },
    /// Wrap native AZERO into wAZERO
    WrapAzero {
        /// Raw units
        #[arg(long)]
        amount: u128,
        /// wAZERO contract; defaults to the well-known one on testnet and mainnet
        #[arg(long)]
        address: Option<String>,
    },
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        match cmd {
            Cmd::Create { pool, rewards } => Command::Create {
                pool,
                reward_tokens: rewards,
            },
            Cmd::Details { farm } => Command::Details { farm },
            Cmd::Start {
                farm,
                start,
                end,
                tokens,
                rewards,
            } => Command::Start {
                farm,
                start,
                end,
                tokens,
                rewards,
            },
            Cmd::Stop { farm } => Command::Stop { farm },
            Cmd::Withdraw { farm, token } => Command::Withdraw { farm, token },
            Cmd::AddRewardToken { farm, token } => Command::AddRewardToken { farm, token },
            Cmd::IncreaseAllowance {
                farm,
                token,
                amount,
            } => Command::IncreaseAllowance {
                farm,
                token,
                amount,
            },
            Cmd::WrapAzero { amount, address } => Command::WrapAzero { amount, address },
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "warn,farm_admin_sdk=debug,farm_admin=debug"
        } else {
            "warn"
        })
    });
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        endpoint: Endpoint::resolve(&cli.chain)?,
        metadata: MetadataPaths {
            farm: cli.farm_metadata,
            psp22: cli.psp22_metadata,
            wrapped: cli.wrapped_metadata,
        },
    };
    commands::run(&config, cli.command.into(), cli.phrase).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    output::set_json_mode(cli.json);

    if let Err(e) = run(cli).await {
        output::error_msg(&format!("error: {e:#}"));
        std::process::exit(1);
    }
}
