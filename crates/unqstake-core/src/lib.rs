//! Core domain logic for app-promotion staking on Unique Network.
//!
//! This crate provides:
//! - Amount formatting and decimal conversion (`amount` module)
//! - Stake / unstake amount validation (`validation` module)
//! - Indexer record parsing and pallet field layout (`records`, `fields`)
//! - History classification, pagination and CSV export (`history`,
//!   `pagination`, `export`)
//! - SS58 address handling (`address` module)
//! - Frontend session state with observers (`state` module)
//! - Expiring preferences (`prefs` module)
//!
//! With the `persistence` feature enabled:
//! - SQLite preference store
//! - Configuration management (`config` module)

pub mod address;
pub mod amount;
pub mod export;
pub mod fields;
pub mod history;
pub mod pagination;
pub mod prefs;
pub mod records;
pub mod state;
pub mod types;
pub mod validation;

#[cfg(feature = "persistence")]
pub mod config;

// Re-export commonly used items from core modules
pub use address::{AccountId, AddressError, normalize_address, same_account};
pub use amount::{AmountError, FormattedAmount, format_display, to_integer};
pub use export::{CsvRecord, ExportError, render_csv, to_csv_rows};
pub use history::{
    BalanceTransferItem, HistoryBuckets, HistoryKind, StakingHistoryItem, TransfersAndRewards,
    aggregate_history, classify_staking_extrinsics, classify_transfers_and_rewards,
};
pub use pagination::{Page, PageMarker, Pagination, paginate};
pub use prefs::{MemoryPreferenceStore, PreferenceError, PreferenceStore, Preferences};
pub use records::{EventData, EventRecord, ExtrinsicEvent, ExtrinsicRecord};
pub use state::{AppState, CallbackId, FetchTicket, HistoryView};
pub use types::*;
pub use validation::{
    AmountAction, StakingLimits, ValidationContext, ValidationResult, validate_amount,
};

// Re-export key persistence types when feature is enabled
#[cfg(feature = "persistence")]
pub use config::{AppConfig, ConfigError};
#[cfg(feature = "persistence")]
pub use prefs::SqlitePreferenceStore;
