//! Core ledger functionality
//!
//! This module contains the fundamental components: blocks, transactions,
//! the chain itself, proof-of-work, transfer application, and mining.

pub mod block;
pub mod blockchain;
pub mod miner;
pub mod proof_of_work;
pub mod transaction;
pub mod transfer;

pub use block::{Block, GENESIS_PREVIOUS_HASH};
pub use blockchain::Blockchain;
pub use miner::Miner;
pub use proof_of_work::ProofOfWork;
pub use transaction::{CoinbaseKind, CoinbaseTx, PendingTransfer, Transaction, COINBASE_SENDER};
pub use transfer::{TransferTarget, Transfers};
