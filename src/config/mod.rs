//! Configuration management
//!
//! This module handles the construction-time settings for the ledger:
//! difficulty, reward amounts, and the data directory.

pub mod settings;

pub use settings::{Settings, DEFAULT_BASE_REWARD, DEFAULT_DIFFICULTY, DEFAULT_PREMINE_AMOUNT};
