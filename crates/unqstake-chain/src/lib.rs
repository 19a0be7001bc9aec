//! Network collaborators for app-promotion staking: the history indexer and
//! the SDK REST service.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod indexer;
pub mod staking;

pub use client::*;
pub use config::*;
pub use error::*;
pub use history::{fetch_history, fetch_staking_history, fetch_transfer_history};
pub use indexer::{EventQuery, ExtrinsicQuery, HttpIndexer, IndexerClient};
pub use staking::{StakingCall, StakingService};
