use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Leading zero hex characters required of every block hash.
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Base mining reward before collected fees.
pub const DEFAULT_BASE_REWARD: u64 = 3;

/// Amount minted by the genesis coinbase.
pub const DEFAULT_PREMINE_AMOUNT: u64 = 1000;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PREMINE_RECIPIENT: &str = "treasury";
const DEFAULT_SETTINGS_FILE: &str = "tally.toml";

/// Construction-time settings shared by every component.
///
/// Loaded once and passed into constructors; there is no process-wide
/// configuration state. The difficulty is fixed for the whole chain:
/// genesis and every later block are mined and validated against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub difficulty: u32,
    pub base_reward: u64,
    pub premine_amount: u64,
    pub premine_recipient: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            difficulty: DEFAULT_DIFFICULTY,
            base_reward: DEFAULT_BASE_REWARD,
            premine_amount: DEFAULT_PREMINE_AMOUNT,
            premine_recipient: String::from(DEFAULT_PREMINE_RECIPIENT),
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path).map_err(|e| {
            LedgerError::Io(format!("Failed to read settings {}: {e}", path.display()))
        })?;
        toml::from_str(&text).map_err(|e| {
            LedgerError::Config(format!("Failed to parse settings {}: {e}", path.display()))
        })
    }

    /// Resolve settings for the CLI: an explicit path must exist, the
    /// default file is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }
}
