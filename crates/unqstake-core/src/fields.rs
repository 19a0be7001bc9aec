//! Pallet event layout.
//!
//! Every assumption about where an amount or recipient sits inside an event
//! payload lives in this module. A runtime upgrade that reorders pallet
//! fields is handled here and nowhere else.

use crate::records::{self, EventData};
use crate::types::Balance;

/// Pallet that implements app-promotion staking.
pub const STAKING_SECTION: &str = "appPromotion";
/// Extrinsic methods searched for staking history.
pub const STAKING_METHODS: &[&str] = &["stake", "unstake", "unstakePartial", "unstakeAll"];
/// `appPromotion.Stake(who, amount)` / `Unstake(who, amount)`.
pub const STAKING_AMOUNT_INDEX: usize = 1;

/// Event emitted when staking rewards are credited.
pub const REWARD_METHOD: &str = "StakingRecalculation";
/// `appPromotion.StakingRecalculation(who, base, reward)`.
pub const REWARD_AMOUNT_INDEX: usize = 2;

/// Balance transfer events.
pub const TRANSFER_METHODS: &[&str] = &["Transfer", "TransferKeepAlive"];
pub const TRANSFER_AMOUNT_FIELD: &str = "amount";
pub const TRANSFER_TO_FIELD: &str = "to";

/// Event methods searched for transfer and reward history.
pub fn history_event_methods() -> Vec<&'static str> {
    let mut methods = TRANSFER_METHODS.to_vec();
    methods.push(REWARD_METHOD);
    methods
}

pub fn is_transfer(method: &str) -> bool {
    TRANSFER_METHODS.contains(&method)
}

pub fn is_reward(method: &str) -> bool {
    method == REWARD_METHOD
}

fn amount_or_zero(value: Option<&serde_json::Value>, what: &str) -> Balance {
    match value.and_then(records::balance_from_value) {
        Some(amount) => amount,
        None => {
            tracing::debug!("No readable {} amount in event data, using 0", what);
            Balance::zero()
        }
    }
}

/// Amount of an `appPromotion` stake/unstake event.
pub fn staking_amount(data: &EventData) -> Balance {
    amount_or_zero(data.positional(STAKING_AMOUNT_INDEX), "staking")
}

/// Reward credited by a `StakingRecalculation` event.
pub fn reward_amount(data: &EventData) -> Balance {
    amount_or_zero(data.positional(REWARD_AMOUNT_INDEX), "reward")
}

/// Amount of a balance transfer.
pub fn transfer_amount(data: &EventData) -> Balance {
    amount_or_zero(data.named(TRANSFER_AMOUNT_FIELD), "transfer")
}

/// Recipient of a balance transfer, as given by the indexer.
pub fn transfer_recipient(data: &EventData) -> Option<&str> {
    data.named(TRANSFER_TO_FIELD)
        .and_then(records::address_from_value)
}
