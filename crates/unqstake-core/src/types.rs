//! Core domain types for app-promotion staking.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::amount::{self, FormattedAmount};

/// On-chain balance in base units. Wide enough that no amount ever goes
/// through floating point.
pub type Balance = U256;
pub type BlockNumber = u64;

/// Supported networks - exhaustive match required (no default case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Network {
    #[default]
    Unique,
    Quartz,
}

impl Network {
    pub fn token_symbol(&self) -> &'static str {
        match self {
            Network::Unique => "UNQ",
            Network::Quartz => "QTZ",
        }
    }

    pub fn token_decimals(&self) -> u8 {
        match self {
            Network::Unique => 18,
            Network::Quartz => 18,
        }
    }

    pub fn ss58_format(&self) -> u16 {
        match self {
            Network::Unique => 7391,
            Network::Quartz => 255,
        }
    }

    /// Look up a network by its token symbol (case-insensitive).
    pub fn from_token_symbol(symbol: &str) -> Option<Network> {
        Network::all()
            .iter()
            .copied()
            .find(|n| n.token_symbol().eq_ignore_ascii_case(symbol))
    }

    /// Returns all known networks.
    pub fn all() -> &'static [Network] {
        &[Network::Unique, Network::Quartz]
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Unique => write!(f, "Unique"),
            Network::Quartz => write!(f, "Quartz"),
        }
    }
}

/// A raw on-chain amount together with the unit it is denominated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceAmount {
    pub raw: Balance,
    pub decimals: u8,
    pub unit: String,
}

impl BalanceAmount {
    pub fn new(raw: Balance, decimals: u8, unit: impl Into<String>) -> Self {
        Self {
            raw,
            decimals,
            unit: unit.into(),
        }
    }

    /// Zero of the network's native token.
    pub fn zero(network: Network) -> Self {
        Self::new(Balance::zero(), network.token_decimals(), network.token_symbol())
    }

    /// Display form with the default precision.
    pub fn format(&self) -> FormattedAmount {
        amount::format_display(self.raw, self.decimals, amount::DEFAULT_DISPLAY_DECIMALS)
    }

    /// Display form with the unit appended, e.g. `"12.5000 UNQ"`.
    pub fn format_with_unit(&self) -> String {
        format!("{} {}", self.format().label(), self.unit)
    }
}

/// Balances of one account as reported by the balance provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub available: BalanceAmount,
    pub staked: BalanceAmount,
    /// Amount waiting out the unstaking period.
    pub unstaked: BalanceAmount,
    pub total: BalanceAmount,
}

impl BalanceSnapshot {
    pub fn empty(network: Network) -> Self {
        Self {
            available: BalanceAmount::zero(network),
            staked: BalanceAmount::zero(network),
            unstaked: BalanceAmount::zero(network),
            total: BalanceAmount::zero(network),
        }
    }
}

/// Staking operation kind, derived from the extrinsic method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakingEventType {
    Stake,
    Unstake,
}

impl StakingEventType {
    /// Classify a method name: anything starting with "unstake" is an unstake.
    pub fn from_method(method: &str) -> Self {
        if method.to_lowercase().starts_with("unstake") {
            StakingEventType::Unstake
        } else {
            StakingEventType::Stake
        }
    }

    /// Lower-case prefix matched against event method names.
    pub fn method_prefix(&self) -> &'static str {
        match self {
            StakingEventType::Stake => "stake",
            StakingEventType::Unstake => "unstake",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StakingEventType::Stake => "Stake",
            StakingEventType::Unstake => "Unstake",
        }
    }
}

/// Direction of a balance transfer relative to the subject account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferDirection {
    In,
    Out,
}

impl TransferDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TransferDirection::In => "Incoming",
            TransferDirection::Out => "Outgoing",
        }
    }
}

/// Form tab of the staking screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StakeTab {
    #[default]
    Stake,
    Unstake,
}

impl StakeTab {
    pub fn label(&self) -> &'static str {
        match self {
            StakeTab::Stake => "Stake",
            StakeTab::Unstake => "Unstake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_properties() {
        assert_eq!(Network::Unique.token_symbol(), "UNQ");
        assert_eq!(Network::Quartz.token_symbol(), "QTZ");
        assert_eq!(Network::Unique.token_decimals(), 18);
        assert_eq!(Network::Quartz.token_decimals(), 18);
        assert_eq!(Network::Unique.ss58_format(), 7391);
        assert_eq!(Network::Quartz.ss58_format(), 255);
    }

    #[test]
    fn test_network_from_token_symbol() {
        assert_eq!(Network::from_token_symbol("UNQ"), Some(Network::Unique));
        assert_eq!(Network::from_token_symbol("qtz"), Some(Network::Quartz));
        assert_eq!(Network::from_token_symbol("DOT"), None);
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Unique.to_string(), "Unique");
        assert_eq!(Network::Quartz.to_string(), "Quartz");
    }

    #[test]
    fn test_staking_event_type_from_method() {
        assert_eq!(StakingEventType::from_method("stake"), StakingEventType::Stake);
        assert_eq!(
            StakingEventType::from_method("unstakePartial"),
            StakingEventType::Unstake
        );
        assert_eq!(
            StakingEventType::from_method("UnstakeAll"),
            StakingEventType::Unstake
        );
    }

    #[test]
    fn test_balance_amount_format_with_unit() {
        let amount = BalanceAmount::new(
            Balance::from(12_500_000_000_000_000_000u128),
            18,
            "UNQ",
        );
        assert_eq!(amount.format_with_unit(), "12.5000 UNQ");
        assert_eq!(BalanceAmount::zero(Network::Quartz).format_with_unit(), "0 QTZ");
    }
}
