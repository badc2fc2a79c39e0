use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tally-chain")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "init", about = "Initialize the chain, mining genesis if needed")]
    Init,
    #[command(name = "send", about = "Apply a transfer and queue it for mining")]
    Send {
        #[arg(help = "Sender name or address")]
        from: String,
        #[arg(help = "Receiver name or address")]
        to: String,
        #[arg(help = "Amount to transfer")]
        amount: u64,
        #[arg(long = "fee", help = "Optional fee collected by the next miner")]
        fee: Option<u64>,
    },
    #[command(name = "mine", about = "Mine all pending transfers into a new block")]
    Mine {
        #[arg(help = "Miner name; the reward is credited to its address")]
        miner: String,
    },
    #[command(name = "balance", about = "Show the spendable balance of one entry")]
    Balance {
        #[arg(help = "Entry name or address")]
        who: String,
    },
    #[command(name = "balances", about = "List every ledger entry with its balance")]
    Balances,
    #[command(name = "pending", about = "List transfers waiting to be mined")]
    Pending,
    #[command(name = "printchain", about = "Print all blocks in the chain")]
    Printchain,
    #[command(name = "validate", about = "Check the whole chain's integrity")]
    Validate,
    #[command(
        name = "consolidate",
        about = "Merge denominations into one per entry"
    )]
    Consolidate {
        #[arg(help = "Entry address; omit to consolidate every entry")]
        address: Option<String>,
    },
    #[command(name = "status", about = "Show chain and pool counters")]
    Status,
}
