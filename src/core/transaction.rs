// Transactions come in two shapes: coinbase records that mint new value
// (the genesis premine and mining rewards) and transfer records that move
// value between entries. Transfers are the only shape the pending pool
// holds; blocks hold both.

use crate::error::{LedgerError, Result};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};

/// Sender marker carried by every value-creating transaction.
pub const COINBASE_SENDER: &str = "coinbase";

/// Why a coinbase transaction exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinbaseKind {
    Premine,
    Reward,
}

/// A value-creating transaction. Not backed by a ledger debit; these are the
/// sole source of new value in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinbaseTx {
    from: String,
    to: String,
    amount: u64,
    #[serde(rename = "type")]
    kind: CoinbaseKind,
}

impl CoinbaseTx {
    pub fn get_to(&self) -> &str {
        self.to.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_kind(&self) -> CoinbaseKind {
        self.kind
    }
}

/// A value transfer waiting to be mined, as recorded in the pending pool
/// and later embedded unchanged in the block that includes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransfer {
    sender: String,
    receiver: String,
    amount: u64,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fee: Option<u64>,
}

impl PendingTransfer {
    pub fn new(
        sender: &str,
        receiver: &str,
        amount: u64,
        fee: Option<u64>,
    ) -> Result<PendingTransfer> {
        if amount == 0 {
            return Err(LedgerError::Transaction(
                "Transfer amount must be positive".to_string(),
            ));
        }

        Ok(PendingTransfer {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            timestamp: current_timestamp()?,
            fee,
        })
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_receiver(&self) -> &str {
        self.receiver.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Fee collected by the miner of the block that includes this transfer.
    pub fn get_fee(&self) -> u64 {
        self.fee.unwrap_or(0)
    }
}

/// A transaction as it appears inside a block.
///
/// Untagged: the two shapes carry disjoint required fields (`type` vs
/// `timestamp`, `to` vs `receiver`), so the persisted records need no
/// discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transaction {
    Coinbase(CoinbaseTx),
    Transfer(PendingTransfer),
}

impl Transaction {
    /// The genesis coinbase minting the initial supply.
    pub fn premine(to: &str, amount: u64) -> Result<Transaction> {
        Self::new_coinbase(to, amount, CoinbaseKind::Premine)
    }

    /// The miner-reward coinbase placed first in every mined block.
    pub fn reward(to: &str, amount: u64) -> Result<Transaction> {
        Self::new_coinbase(to, amount, CoinbaseKind::Reward)
    }

    fn new_coinbase(to: &str, amount: u64, kind: CoinbaseKind) -> Result<Transaction> {
        if amount == 0 {
            return Err(LedgerError::Transaction(
                "Coinbase amount must be positive".to_string(),
            ));
        }

        Ok(Transaction::Coinbase(CoinbaseTx {
            from: String::from(COINBASE_SENDER),
            to: to.to_string(),
            amount,
            kind,
        }))
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, Transaction::Coinbase(_))
    }

    pub fn get_amount(&self) -> u64 {
        match self {
            Transaction::Coinbase(tx) => tx.get_amount(),
            Transaction::Transfer(tx) => tx.get_amount(),
        }
    }

    pub fn get_fee(&self) -> u64 {
        match self {
            Transaction::Coinbase(_) => 0,
            Transaction::Transfer(tx) => tx.get_fee(),
        }
    }

    pub fn get_recipient(&self) -> &str {
        match self {
            Transaction::Coinbase(tx) => tx.get_to(),
            Transaction::Transfer(tx) => tx.get_receiver(),
        }
    }
}

impl From<PendingTransfer> for Transaction {
    fn from(transfer: PendingTransfer) -> Self {
        Transaction::Transfer(transfer)
    }
}
