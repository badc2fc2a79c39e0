// Main entry point for the ledger CLI. Every command opens the stores,
// initializes the chain (mining genesis on first use), and dispatches.
use clap::Parser;
use log::{error, LevelFilter};
use std::process;
use std::sync::Arc;
use tally_chain::{
    Block, Blockchain, Command, Identity, IdentityRegistry, Miner, Opt, PendingPool,
    PendingTransfer, Settings, SledStore, Transaction, Transfers, UTXOSet, UtxoEntry,
};

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(opt.config.as_deref())?;

    let db = sled::open(&settings.data_dir)
        .map_err(|e| format!("Failed to open data directory: {e}"))?;
    let chain_store: Arc<SledStore<Block>> = Arc::new(SledStore::open(&db, "blocks")?);
    let utxo_store: Arc<SledStore<UtxoEntry>> = Arc::new(SledStore::open(&db, "utxos")?);
    let pending_store: Arc<SledStore<PendingTransfer>> =
        Arc::new(SledStore::open(&db, "pending")?);
    let identity_store: Arc<SledStore<Identity>> = Arc::new(SledStore::open(&db, "identities")?);

    let utxo_set = UTXOSet::new(utxo_store);
    let pool = PendingPool::new(pending_store);
    let identities = IdentityRegistry::new(identity_store);
    // Loads the persisted chain, or mines genesis when none exists
    let chain = Blockchain::initialize(chain_store, &settings)?;

    match opt.command {
        Command::Init => {
            println!(
                "Chain ready: {} blocks, height {}, difficulty {}",
                chain.len(),
                chain.height(),
                chain.get_difficulty()
            );
        }
        Command::Send {
            from,
            to,
            amount,
            fee,
        } => {
            let transfers = Transfers::new(utxo_set, identities, pool);
            let record = transfers.apply_with_fee(&from, &to, amount, fee)?;
            println!(
                "Queued transfer of {} from {} to {}",
                record.get_amount(),
                record.get_sender(),
                record.get_receiver()
            );
        }
        Command::Mine { miner } => {
            let miner_ops = Miner::new(chain, utxo_set, pool, identities);
            let block = miner_ops.mine_pending(&miner)?;
            println!(
                "Mined block {} with {} transactions: {}",
                block.get_index(),
                block.get_transactions().len(),
                block.get_hash()
            );
        }
        Command::Balance { who } => {
            let entry = match utxo_set.find_by_name(&who)? {
                Some(entry) => Some(entry),
                None => utxo_set.entry(&who)?,
            };
            match entry {
                Some(entry) => println!(
                    "Balance of {} ({}): {}",
                    entry.get_name(),
                    entry.get_address(),
                    entry.total()
                ),
                None => println!("No ledger entry for {who}"),
            }
        }
        Command::Balances => {
            for entry in utxo_set.entries()? {
                println!(
                    "{}\t{}\t{}",
                    entry.get_name(),
                    entry.get_address(),
                    entry.total()
                );
            }
        }
        Command::Pending => {
            for transfer in pool.all()? {
                let fee = transfer.get_fee();
                if fee > 0 {
                    println!(
                        "{} -> {}: {} (fee {fee})",
                        transfer.get_sender(),
                        transfer.get_receiver(),
                        transfer.get_amount()
                    );
                } else {
                    println!(
                        "{} -> {}: {}",
                        transfer.get_sender(),
                        transfer.get_receiver(),
                        transfer.get_amount()
                    );
                }
            }
        }
        Command::Printchain => {
            for block in chain.blocks() {
                println!("Block {}", block.get_index());
                println!("  Hash: {}", block.get_hash());
                println!("  Previous: {}", block.get_previous_hash());
                println!("  Nonce: {}", block.get_nonce());
                println!("  Timestamp: {}", block.get_timestamp());
                for tx in block.get_transactions() {
                    match tx {
                        Transaction::Coinbase(coinbase) => println!(
                            "  - coinbase -> {}: {} ({:?})",
                            coinbase.get_to(),
                            coinbase.get_amount(),
                            coinbase.get_kind()
                        ),
                        Transaction::Transfer(transfer) => println!(
                            "  - {} -> {}: {}",
                            transfer.get_sender(),
                            transfer.get_receiver(),
                            transfer.get_amount()
                        ),
                    }
                }
                println!();
            }
        }
        Command::Validate => {
            chain.validate()?;
            println!("Chain is valid ({} blocks)", chain.len());
        }
        Command::Consolidate { address } => {
            match address {
                Some(address) => utxo_set.consolidate(&address)?,
                None => utxo_set.consolidate_all()?,
            }
            println!("Done!");
        }
        Command::Status => {
            println!("Blocks: {}", chain.len());
            println!("Pending transfers: {}", pool.len()?);
            println!("Base reward: {}", chain.get_base_reward());
            println!("Difficulty: {}", chain.get_difficulty());
        }
    }
    Ok(())
}
