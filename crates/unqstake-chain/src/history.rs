//! Fetching and classifying transaction history.
//!
//! Staking history and transfer history are fetched concurrently. Each
//! side catches its own failure, logs it and yields an empty list, so one
//! indexer error never hides the other half of the history.

use unqstake_core::history::{self, HistoryBuckets, StakingHistoryItem, TransfersAndRewards};
use unqstake_core::{fields, records};

use crate::indexer::{IndexerClient, PAGE_SIZE, fetch_all_events, fetch_all_extrinsics};

/// Stake and unstake extrinsics signed by `address`.
pub async fn fetch_staking_history<I>(indexer: &I, address: &str) -> Vec<StakingHistoryItem>
where
    I: IndexerClient + ?Sized,
{
    let raw = fetch_all_extrinsics(
        indexer,
        address,
        &[fields::STAKING_SECTION],
        fields::STAKING_METHODS,
        PAGE_SIZE,
    )
    .await;

    match raw {
        Ok(items) => {
            let records = records::parse_extrinsics(items);
            let classified = history::classify_staking_extrinsics(&records);
            tracing::info!(
                "Fetched {} staking extrinsics for {}",
                classified.len(),
                address
            );
            classified
        }
        Err(e) => {
            tracing::error!("Failed to fetch staking history for {}: {}", address, e);
            Vec::new()
        }
    }
}

/// Transfers and staking rewards involving `address`.
pub async fn fetch_transfer_history<I>(
    indexer: &I,
    address: &str,
    decimals: u8,
) -> TransfersAndRewards
where
    I: IndexerClient + ?Sized,
{
    let methods = fields::history_event_methods();
    let raw = fetch_all_events(indexer, address, &methods, PAGE_SIZE).await;

    match raw {
        Ok(items) => {
            let events = records::parse_events(items);
            let classified = history::classify_transfers_and_rewards(&events, address, decimals);
            tracing::info!(
                "Fetched {} events for {}: {} transfers, {} rewards",
                events.len(),
                address,
                classified.transfers.len(),
                classified.staking_rewards.len()
            );
            classified
        }
        Err(e) => {
            tracing::error!("Failed to fetch transfer history for {}: {}", address, e);
            TransfersAndRewards::default()
        }
    }
}

/// Fetch both halves concurrently and combine them into the four buckets.
pub async fn fetch_history<I>(indexer: &I, address: &str, decimals: u8) -> HistoryBuckets
where
    I: IndexerClient + ?Sized,
{
    let (staking, moves) = futures::join!(
        fetch_staking_history(indexer, address),
        fetch_transfer_history(indexer, address, decimals),
    );
    HistoryBuckets::from_parts(staking, moves)
}
