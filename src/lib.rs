//! # Tally Chain - A Minimal Append-Only Ledger
//!
//! A hash-linked chain of blocks secured by proof-of-work, with account
//! balances tracked through an unspent-output model instead of mutable
//! balances.
//!
//! ## What's Here
//! - **Chain**: blocks bundle transactions, link by hash, and are mined
//!   against a fixed chain-wide difficulty (leading zero hex characters)
//! - **UTXO Ledger**: per-address denomination multisets with greedy
//!   largest-first spending, change, and consolidation
//! - **Transfer Application**: funds-checked debits and credits feeding a
//!   persisted pending pool
//! - **Mining**: drains the pool into a new block whose first transaction
//!   rewards the miner with the base reward plus collected fees
//!
//! ## How It's Organized
//! - `core/`: blocks, the chain, proof-of-work, transfers, mining
//! - `storage/`: the record-store abstraction, the UTXO ledger, the pool
//! - `identity/`: read-only view of the collaborator-owned identity store
//! - `config/`: construction-time settings
//! - `utils/`: hashing and canonical serialization helpers
//! - `cli/`: command-line interface
//!
//! Store handles are injected into every component, so tests swap the sled
//! stores for in-memory ones. All mutating store access runs under a
//! per-store lock; the design still assumes a single process over the data
//! directory.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Settings;
pub use core::{
    Block, Blockchain, CoinbaseKind, CoinbaseTx, Miner, PendingTransfer, ProofOfWork, Transaction,
    TransferTarget, Transfers, COINBASE_SENDER, GENESIS_PREVIOUS_HASH,
};
pub use error::{LedgerError, Result};
pub use identity::{Identity, IdentityRegistry};
pub use storage::{MemoryStore, PendingPool, RecordStore, SledStore, UTXOSet, UtxoEntry};
pub use utils::{canonical_json, current_timestamp, sha256_digest};
