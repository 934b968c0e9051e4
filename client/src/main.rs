use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use covenant_client::StateFile;
use covenant_core::{AccountId, ProposalDecision};

const DEFAULT_STATE_PATH: &str = "./covenant_state.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    if let Commands::Init { arbitrator } = &cli.command {
        StateFile::bootstrap(arbitrator.clone()).save(&cli.state)?;
        tracing::info!(path = ?cli.state, "state file initialized");
        return Ok(());
    }

    let (engine, ledger) = StateFile::load(&cli.state)?.into_parts();

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::Create {
            buyer,
            seller,
            asset_id,
            amount,
        } => {
            let record = engine
                .create_escrow(&buyer, &seller, &asset_id, amount)
                .await?;
            tracing::info!(%asset_id, state = %record.state, "escrow created");
        }
        Commands::Fulfill { caller, asset_id } => {
            let record = engine.fulfill_escrow(&caller, &asset_id).await?;
            tracing::info!(%asset_id, state = %record.state, "escrow fulfilled");
        }
        Commands::Cancel { caller, asset_id } => {
            let record = engine.cancel_escrow(&caller, &asset_id).await?;
            tracing::info!(%asset_id, state = %record.state, "escrow cancelled");
        }
        Commands::Propose { caller, asset_id } => {
            let record = engine.propose_cancellation(&caller, &asset_id).await?;
            tracing::info!(%asset_id, state = %record.state, "cancellation proposed");
        }
        Commands::Resolve {
            caller,
            asset_id,
            decision,
        } => {
            let record = engine
                .resolve_cancellation(&caller, &asset_id, decision.into())
                .await?;
            tracing::info!(%asset_id, state = %record.state, "proposal resolved");
        }
        Commands::ArbitrateCancel { caller, asset_id } => {
            let record = engine.cancel_escrow_arbitrating(&caller, &asset_id).await?;
            tracing::info!(%asset_id, state = %record.state, "escrow cancelled by arbitration");
        }
        Commands::ArbitrateFulfill { caller, asset_id } => {
            let record = engine
                .fulfill_escrow_arbitrating(&caller, &asset_id)
                .await?;
            tracing::info!(%asset_id, state = %record.state, "escrow fulfilled by arbitration");
        }
        Commands::Get { asset_id } => {
            let record = engine.escrow(&asset_id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Balance { account } => {
            println!("{}", engine.balance_of(&account).await?);
        }
        Commands::Owner => {
            println!("{}", engine.arbitrator());
        }
        Commands::TransferOwnership {
            caller,
            new_arbitrator,
        } => {
            engine.transfer_ownership(&caller, new_arbitrator).await?;
            tracing::info!("arbitrator role transferred");
        }
        Commands::CashIn { account, amount } => {
            let balance = engine.balance_of(&account).await?;
            ledger.set_balance(&account, balance + amount);
            tracing::info!(%account, amount, "funds credited");
        }
        Commands::Freeze { account, lift } => {
            ledger.freeze_account(&account, !lift);
            tracing::info!(%account, frozen = !lift, "freeze flag updated");
        }
        Commands::Emergency { action } => {
            let paused = matches!(action, EmergencyAction::Start);
            ledger.set_paused(paused);
            tracing::info!(paused, "emergency stop updated");
        }
    }

    StateFile::capture(&engine, &ledger).await.save(&cli.state)?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "covenant-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON state file.
    #[arg(short, long,
        value_parser,
        default_value = DEFAULT_STATE_PATH,
        value_hint = ValueHint::FilePath,
        global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh state file bound to an initial arbitrator.
    Init { arbitrator: AccountId },

    /// Lock funds from the buyer into escrow for an asset id.
    Create {
        buyer: AccountId,
        seller: AccountId,
        asset_id: String,
        amount: u64,
    },

    /// Buyer confirms delivery; funds go to the seller.
    Fulfill {
        caller: AccountId,
        asset_id: String,
    },

    /// Seller backs out; funds return to the buyer.
    Cancel {
        caller: AccountId,
        asset_id: String,
    },

    /// Buyer proposes to cancel; funds stay in custody.
    Propose {
        caller: AccountId,
        asset_id: String,
    },

    /// Seller answers a pending cancellation proposal.
    Resolve {
        caller: AccountId,
        asset_id: String,
        #[arg(value_enum)]
        decision: Decision,
    },

    /// Arbitrator sides with the buyer on a rejected proposal.
    ArbitrateCancel {
        caller: AccountId,
        asset_id: String,
    },

    /// Arbitrator sides with the seller on a rejected proposal.
    ArbitrateFulfill {
        caller: AccountId,
        asset_id: String,
    },

    /// Print one escrow record as JSON.
    Get { asset_id: String },

    /// Print an account's ledger balance.
    Balance { account: AccountId },

    /// Print the current arbitrator identity.
    Owner,

    /// Hand the arbitrator role to another identity.
    TransferOwnership {
        caller: AccountId,
        new_arbitrator: AccountId,
    },

    /// Credit an account on the reference ledger.
    CashIn { account: AccountId, amount: u64 },

    /// Freeze an account (or lift the freeze with --lift).
    Freeze {
        account: AccountId,
        #[arg(long)]
        lift: bool,
    },

    /// Start or stop the ledger-wide emergency stop.
    Emergency {
        #[arg(value_enum)]
        action: EmergencyAction,
    },
}

/// The seller's answer to a cancellation proposal.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Decision {
    Accept,
    Reject,
}

impl From<Decision> for ProposalDecision {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Accept => Self::Accept,
            Decision::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmergencyAction {
    Start,
    Stop,
}
