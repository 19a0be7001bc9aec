//! Transaction history classification.
//!
//! Turns parsed indexer records into the four history buckets shown to the
//! user: stakes, unstakes, staking rewards and balance transfers. Every
//! function here is pure; each pass builds new vectors from an immutable
//! input snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address;
use crate::amount;
use crate::fields;
use crate::records::{EventRecord, ExtrinsicRecord};
use crate::types::{Balance, BlockNumber, StakingEventType, TransferDirection};

/// A stake or unstake extrinsic signed by the subject account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingHistoryItem {
    pub hash: String,
    pub block_number: BlockNumber,
    pub block_timestamp: Option<DateTime<Utc>>,
    pub section: String,
    pub method: String,
    pub amount: Balance,
    pub event_type: StakingEventType,
}

/// A balance movement: a transfer, or a staking reward credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTransferItem {
    pub block_number: BlockNumber,
    pub block_timestamp: Option<DateTime<Utc>>,
    pub amount: Balance,
    /// Empty when the indexer did not link the event to an extrinsic.
    pub extrinsic_hash: String,
    pub direction: TransferDirection,
    pub section: String,
    pub method: String,
}

/// Output of [`classify_transfers_and_rewards`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransfersAndRewards {
    pub transfers: Vec<BalanceTransferItem>,
    pub staking_rewards: Vec<BalanceTransferItem>,
}

/// History bucket, one per table / CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryKind {
    Stake,
    Unstake,
    Rewards,
    Transfers,
}

impl HistoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryKind::Stake => "Staking",
            HistoryKind::Unstake => "Unstaking",
            HistoryKind::Rewards => "Staking Rewards",
            HistoryKind::Transfers => "Transfers",
        }
    }

    /// Default file name for a CSV export of this bucket.
    pub fn csv_file_name(&self) -> &'static str {
        match self {
            HistoryKind::Stake => "staking-history.csv",
            HistoryKind::Unstake => "unstaking-history.csv",
            HistoryKind::Rewards => "staking-rewards-history.csv",
            HistoryKind::Transfers => "transfer-history.csv",
        }
    }

    pub fn all() -> &'static [HistoryKind] {
        &[
            HistoryKind::Stake,
            HistoryKind::Unstake,
            HistoryKind::Rewards,
            HistoryKind::Transfers,
        ]
    }
}

impl std::str::FromStr for HistoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stake" | "staking" => Ok(HistoryKind::Stake),
            "unstake" | "unstaking" => Ok(HistoryKind::Unstake),
            "rewards" | "reward" => Ok(HistoryKind::Rewards),
            "transfers" | "transfer" => Ok(HistoryKind::Transfers),
            _ => Err(format!(
                "Unknown history kind '{}'. Valid options: stake, unstake, rewards, transfers",
                s
            )),
        }
    }
}

/// All four buckets, each sorted by block number descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBuckets {
    pub stake: Vec<StakingHistoryItem>,
    pub unstake: Vec<StakingHistoryItem>,
    pub rewards: Vec<BalanceTransferItem>,
    pub transfers: Vec<BalanceTransferItem>,
}

impl HistoryBuckets {
    /// Combine the two classifier outputs.
    pub fn from_parts(staking: Vec<StakingHistoryItem>, moves: TransfersAndRewards) -> Self {
        let (unstake, stake): (Vec<_>, Vec<_>) = staking
            .into_iter()
            .partition(|item| item.event_type == StakingEventType::Unstake);
        Self {
            stake,
            unstake,
            rewards: moves.staking_rewards,
            transfers: moves.transfers,
        }
    }

    pub fn len(&self, kind: HistoryKind) -> usize {
        match kind {
            HistoryKind::Stake => self.stake.len(),
            HistoryKind::Unstake => self.unstake.len(),
            HistoryKind::Rewards => self.rewards.len(),
            HistoryKind::Transfers => self.transfers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        HistoryKind::all().iter().all(|kind| self.len(*kind) == 0)
    }
}

/// Classify staking extrinsics into stake / unstake items.
///
/// The amount comes from the first `appPromotion` event whose method starts
/// with the operation's prefix; extrinsics without one get amount 0.
pub fn classify_staking_extrinsics(records: &[ExtrinsicRecord]) -> Vec<StakingHistoryItem> {
    let mut items: Vec<StakingHistoryItem> = records
        .iter()
        .map(|record| {
            let event_type = StakingEventType::from_method(&record.method);
            let prefix = event_type.method_prefix();
            let amount = record
                .events
                .iter()
                .find(|event| {
                    event.section == fields::STAKING_SECTION
                        && event.method.to_lowercase().starts_with(prefix)
                })
                .map(|event| fields::staking_amount(&event.data))
                .unwrap_or_default();

            StakingHistoryItem {
                hash: record.hash.clone(),
                block_number: record.block_number,
                block_timestamp: record.block_timestamp,
                section: record.section.clone(),
                method: record.method.clone(),
                amount,
                event_type,
            }
        })
        .collect();

    items.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    items
}

/// Split balance events into transfers and staking rewards.
///
/// A transfer in the same block as a reward of exactly the same amount is
/// the reward payout itself and is dropped. Transfers below one whole token
/// are dropped as dust.
pub fn classify_transfers_and_rewards(
    events: &[EventRecord],
    subject: &str,
    decimals: u8,
) -> TransfersAndRewards {
    let mut rewards: BTreeMap<BlockNumber, BalanceTransferItem> = BTreeMap::new();
    for event in events.iter().filter(|e| fields::is_reward(&e.method)) {
        let amount = fields::reward_amount(&event.data);
        if amount.is_zero() {
            continue;
        }
        rewards.insert(
            event.block_number,
            BalanceTransferItem {
                block_number: event.block_number,
                block_timestamp: event.block_timestamp,
                amount,
                extrinsic_hash: event.extrinsic_hash.clone().unwrap_or_default(),
                direction: TransferDirection::In,
                section: event.section.clone(),
                method: event.method.clone(),
            },
        );
    }

    let dust_limit = amount::one_token(decimals).unwrap_or_else(Balance::max_value);
    let subject = address::normalize_address(subject);

    let mut transfers = Vec::new();
    for event in events.iter().filter(|e| fields::is_transfer(&e.method)) {
        let amount = fields::transfer_amount(&event.data);
        if rewards
            .get(&event.block_number)
            .is_some_and(|reward| reward.amount == amount)
        {
            continue;
        }
        if amount < dust_limit {
            continue;
        }

        let recipient = fields::transfer_recipient(&event.data).and_then(address::normalize_address);
        let direction = match (recipient, subject) {
            (Some(to), Some(me)) if to == me => TransferDirection::In,
            _ => TransferDirection::Out,
        };

        transfers.push(BalanceTransferItem {
            block_number: event.block_number,
            block_timestamp: event.block_timestamp,
            amount,
            extrinsic_hash: event.extrinsic_hash.clone().unwrap_or_default(),
            direction,
            section: event.section.clone(),
            method: event.method.clone(),
        });
    }
    transfers.sort_by(|a, b| b.block_number.cmp(&a.block_number));

    TransfersAndRewards {
        transfers,
        staking_rewards: rewards.into_values().rev().collect(),
    }
}

/// Classify everything fetched for one account into the four buckets.
pub fn aggregate_history(
    extrinsics: &[ExtrinsicRecord],
    events: &[EventRecord],
    subject: &str,
    decimals: u8,
) -> HistoryBuckets {
    HistoryBuckets::from_parts(
        classify_staking_extrinsics(extrinsics),
        classify_transfers_and_rewards(events, subject, decimals),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{self, EventData};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    fn tokens(n: u128) -> Balance {
        Balance::from(n) * Balance::from(1_000_000_000_000_000_000u128)
    }

    fn event(block: u64, method: &str, data: serde_json::Value) -> EventRecord {
        EventRecord {
            block_number: block,
            block_timestamp: None,
            extrinsic_hash: Some(format!("0x{block:04x}")),
            section: if fields::is_reward(method) {
                "appPromotion".to_string()
            } else {
                "balances".to_string()
            },
            method: method.to_string(),
            data: EventData(data),
        }
    }

    fn transfer(block: u64, to: &str, amount: Balance) -> EventRecord {
        event(
            block,
            "Transfer",
            json!({"from": BOB, "to": to, "amount": amount.to_string()}),
        )
    }

    fn reward(block: u64, amount: Balance) -> EventRecord {
        event(
            block,
            "StakingRecalculation",
            json!([ALICE, "0", amount.to_string()]),
        )
    }

    // ==================== Staking Extrinsic Tests ====================

    #[test]
    fn test_classify_staking_extrinsics() {
        let records = records::parse_extrinsics(vec![
            json!({
                "hash": "0x01", "blockNumber": 100, "section": "appPromotion", "method": "stake",
                "events": [
                    {"section": "balances", "method": "Reserved", "data": [ALICE, "1"]},
                    {"section": "appPromotion", "method": "Stake", "data": [ALICE, tokens(150).to_string()]}
                ]
            }),
            json!({
                "hash": "0x02", "blockNumber": 300, "section": "appPromotion", "method": "unstakePartial",
                "events": [
                    {"section": "appPromotion", "method": "Unstake", "data": {"0": ALICE, "1": tokens(20).to_string()}}
                ]
            }),
            json!({
                "hash": "0x03", "blockNumber": 200, "section": "appPromotion", "method": "unstakeAll",
                "events": []
            }),
        ]);

        let items = classify_staking_extrinsics(&records);
        let summary: Vec<(u64, StakingEventType, Balance)> = items
            .iter()
            .map(|i| (i.block_number, i.event_type, i.amount))
            .collect();
        assert_eq!(
            summary,
            vec![
                (300, StakingEventType::Unstake, tokens(20)),
                (200, StakingEventType::Unstake, Balance::zero()),
                (100, StakingEventType::Stake, tokens(150)),
            ]
        );
    }

    #[test]
    fn test_stake_ignores_unstake_events() {
        let records = records::parse_extrinsics(vec![json!({
            "hash": "0x01", "blockNumber": 1, "section": "appPromotion", "method": "stake",
            "events": [
                {"section": "appPromotion", "method": "Unstake", "data": [ALICE, "5"]},
                {"section": "appPromotion", "method": "Stake", "data": [ALICE, "9"]}
            ]
        })]);
        let items = classify_staking_extrinsics(&records);
        assert_eq!(items[0].amount, Balance::from(9u64));
    }

    // ==================== Transfer / Reward Tests ====================

    #[test]
    fn test_reward_transfer_dedup_same_block() {
        let events = vec![reward(500, tokens(5)), transfer(500, ALICE, tokens(5))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert!(result.transfers.is_empty());
        assert_eq!(result.staking_rewards.len(), 1);
        assert_eq!(result.staking_rewards[0].amount, tokens(5));
        assert_eq!(result.staking_rewards[0].block_number, 500);
        assert_eq!(result.staking_rewards[0].direction, TransferDirection::In);
    }

    #[test]
    fn test_different_amount_same_block_kept() {
        let events = vec![reward(500, tokens(5)), transfer(500, ALICE, tokens(6))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.staking_rewards.len(), 1);
    }

    #[test]
    fn test_last_reward_in_block_wins() {
        let events = vec![
            reward(500, tokens(5)),
            reward(500, tokens(7)),
            transfer(500, ALICE, tokens(5)),
        ];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.staking_rewards.len(), 1);
        assert_eq!(result.staking_rewards[0].amount, tokens(7));
        // The surviving reward no longer matches, so the transfer stays.
        assert_eq!(result.transfers.len(), 1);
    }

    #[test]
    fn test_zero_reward_ignored() {
        let events = vec![reward(10, Balance::zero())];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert!(result.staking_rewards.is_empty());
    }

    #[test]
    fn test_direction() {
        let events = vec![transfer(1, ALICE, tokens(10)), transfer(2, BOB, tokens(10))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.transfers[0].block_number, 2);
        assert_eq!(result.transfers[0].direction, TransferDirection::Out);
        assert_eq!(result.transfers[1].direction, TransferDirection::In);
    }

    #[test]
    fn test_direction_across_address_formats() {
        let events = vec![transfer(1, ALICE_HEX, tokens(10))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.transfers[0].direction, TransferDirection::In);
    }

    #[test]
    fn test_invalid_recipient_is_outgoing() {
        let events = vec![transfer(1, "0x8ba1f109551bD432803012645Ac136ddd64DBA72", tokens(10))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.transfers[0].direction, TransferDirection::Out);
    }

    #[test]
    fn test_dust_filtered() {
        let dust = Balance::from(900_000_000_000_000_000u128);
        let events = vec![transfer(1, ALICE, dust), transfer(2, ALICE, tokens(1))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.transfers[0].amount, tokens(1));
    }

    #[test]
    fn test_sorted_descending() {
        let events = vec![
            transfer(3, ALICE, tokens(2)),
            reward(1, tokens(1)),
            transfer(9, ALICE, tokens(2)),
            reward(7, tokens(1)),
            transfer(5, ALICE, tokens(2)),
        ];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        let transfer_blocks: Vec<u64> = result.transfers.iter().map(|t| t.block_number).collect();
        let reward_blocks: Vec<u64> = result.staking_rewards.iter().map(|t| t.block_number).collect();
        assert_eq!(transfer_blocks, vec![9, 5, 3]);
        assert_eq!(reward_blocks, vec![7, 1]);
    }

    #[test]
    fn test_unrelated_events_ignored() {
        let events = vec![event(1, "Deposit", json!({"amount": tokens(50).to_string()}))];
        let result = classify_transfers_and_rewards(&events, ALICE, 18);
        assert_eq!(result, TransfersAndRewards::default());
    }

    #[test]
    fn test_integer_amounts_from_json_text() {
        let text = format!(
            r#"[{{"blockNumber": 7, "section": "appPromotion", "method": "StakingRecalculation",
                  "data": ["{ALICE}", "1", 20000000000000000000]}},
                {{"blockNumber": 8, "section": "balances", "method": "Transfer",
                  "data": {{"from": "{BOB}", "to": "{ALICE}", "amount": 25000000000000000000}}}}]"#
        );
        let items: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        let events = records::parse_events(items);
        let result = classify_transfers_and_rewards(&events, ALICE, 18);

        assert_eq!(result.staking_rewards.len(), 1);
        assert_eq!(result.staking_rewards[0].amount, tokens(20));
        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.transfers[0].amount, tokens(25));
        assert_eq!(result.transfers[0].direction, TransferDirection::In);
    }

    // ==================== Aggregate Tests ====================

    #[test]
    fn test_aggregate_history_partitions() {
        let extrinsics = records::parse_extrinsics(vec![
            json!({"hash": "0x1", "blockNumber": 10, "section": "appPromotion", "method": "stake"}),
            json!({"hash": "0x2", "blockNumber": 20, "section": "appPromotion", "method": "unstakeAll"}),
            json!({"hash": "0x3", "blockNumber": 30, "section": "appPromotion", "method": "stake"}),
        ]);
        let events = vec![reward(15, tokens(3)), transfer(16, BOB, tokens(4))];

        let buckets = aggregate_history(&extrinsics, &events, ALICE, 18);
        assert_eq!(buckets.len(HistoryKind::Stake), 2);
        assert_eq!(buckets.len(HistoryKind::Unstake), 1);
        assert_eq!(buckets.len(HistoryKind::Rewards), 1);
        assert_eq!(buckets.len(HistoryKind::Transfers), 1);
        assert_eq!(buckets.stake[0].hash, "0x3");
        assert!(!buckets.is_empty());
        assert!(HistoryBuckets::default().is_empty());
    }

    #[test]
    fn test_history_kind_parse() {
        assert_eq!("stake".parse::<HistoryKind>(), Ok(HistoryKind::Stake));
        assert_eq!("Rewards".parse::<HistoryKind>(), Ok(HistoryKind::Rewards));
        assert!("pools".parse::<HistoryKind>().is_err());
        assert_eq!(HistoryKind::Transfers.csv_file_name(), "transfer-history.csv");
    }
}
