//! Stake and unstake amount validation.
//!
//! Rules are evaluated in order and the first failure wins. Amounts are
//! compared as exact [`Balance`] integers after decimal conversion.

use crate::amount::{self, AmountError};
use crate::types::{Balance, Network};

/// Minimum amount accepted by `appPromotion.stake`, in whole tokens.
pub const MIN_STAKE_AMOUNT: &str = "100";
/// Fee reserved from the available balance when computing the maximum stake.
pub const ESTIMATED_FEE: &str = "0.15";
/// Maximum number of concurrent stakes per account.
pub const TOTAL_STAKES: u32 = 10;
/// Fraction digits of the maximum amount offered to the user.
pub const MAX_AMOUNT_DECIMALS: u8 = 4;

pub const MSG_INVALID_NUMBER: &str = "Please enter a valid number";
pub const MSG_NOT_POSITIVE: &str = "Amount must be greater than 0";

/// Remaining stake slots given the pallet's `stakesPerAccount` value.
pub fn stakes_left(stakes_per_account: u32) -> u32 {
    TOTAL_STAKES.saturating_sub(stakes_per_account)
}

/// Network staking limits in raw units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingLimits {
    pub min_stake: Balance,
    pub estimated_fee: Balance,
}

impl StakingLimits {
    pub fn new(min_stake: &str, estimated_fee: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self {
            min_stake: amount::parse_decimal(min_stake, decimals)?,
            estimated_fee: amount::parse_decimal(estimated_fee, decimals)?,
        })
    }

    /// Default limits for a network.
    pub fn for_network(network: Network) -> Self {
        let decimals = network.token_decimals();
        Self::new(MIN_STAKE_AMOUNT, ESTIMATED_FEE, decimals).unwrap_or_else(|e| {
            tracing::warn!("Falling back to zero staking limits: {}", e);
            Self {
                min_stake: Balance::zero(),
                estimated_fee: Balance::zero(),
            }
        })
    }
}

/// Which form the amount belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountAction {
    /// Staking from the available balance. Subject to the minimum and the fee.
    Stake { limits: StakingLimits },
    /// Unstaking from the staked balance.
    Unstake,
}

/// Everything needed to validate one amount input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub action: AmountAction,
    /// Available balance for staking, staked balance for unstaking.
    pub ceiling: Balance,
    pub decimals: u8,
    pub token_symbol: String,
}

impl ValidationContext {
    pub fn stake(available: Balance, network: Network) -> Self {
        Self {
            action: AmountAction::Stake {
                limits: StakingLimits::for_network(network),
            },
            ceiling: available,
            decimals: network.token_decimals(),
            token_symbol: network.token_symbol().to_string(),
        }
    }

    pub fn unstake(staked: Balance, network: Network) -> Self {
        Self {
            action: AmountAction::Unstake,
            ceiling: staked,
            decimals: network.token_decimals(),
            token_symbol: network.token_symbol().to_string(),
        }
    }

    pub fn with_limits(mut self, limits: StakingLimits) -> Self {
        if let AmountAction::Stake { limits: current } = &mut self.action {
            *current = limits;
        }
        self
    }

    /// Largest amount the user may enter, at full precision.
    pub fn max_net(&self) -> Balance {
        match &self.action {
            AmountAction::Stake { limits } => self.ceiling.saturating_sub(limits.estimated_fee),
            AmountAction::Unstake => self.ceiling,
        }
    }

    /// Largest amount truncated for display, as filled in by a "Max" button.
    pub fn max_amount(&self) -> String {
        amount::format_truncated(self.max_net(), self.decimals, MAX_AMOUNT_DECIMALS)
    }
}

/// Outcome of validating one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Empty when valid or when the input is empty.
    pub message: String,
    pub is_max_amount: bool,
}

impl ValidationResult {
    fn valid(is_max_amount: bool) -> Self {
        Self {
            is_valid: true,
            message: String::new(),
            is_max_amount,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            is_max_amount: false,
        }
    }
}

/// Canonicalize user input into `digits[.digits]`.
///
/// Tolerates a missing whole or fraction part (`".5"`, `"5."`). Signs,
/// exponents and separators are rejected.
pub fn normalize_amount_input(input: &str) -> Option<String> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    let whole = if whole.is_empty() { "0" } else { whole };
    if fraction.is_empty() {
        Some(whole.to_string())
    } else {
        Some(format!("{whole}.{fraction}"))
    }
}

/// Validate a stake or unstake amount.
pub fn validate_amount(input: &str, ctx: &ValidationContext) -> ValidationResult {
    if input.trim().is_empty() {
        return ValidationResult::default();
    }

    let Some(value) = normalize_amount_input(input)
        .and_then(|normalized| amount::parse_decimal(&normalized, ctx.decimals).ok())
    else {
        return ValidationResult::invalid(MSG_INVALID_NUMBER);
    };

    match &ctx.action {
        AmountAction::Stake { limits } => {
            if value < limits.min_stake {
                return ValidationResult::invalid(format!(
                    "Minimum staking amount is {} {}",
                    amount::format_trimmed(limits.min_stake, ctx.decimals),
                    ctx.token_symbol
                ));
            }
        }
        AmountAction::Unstake => {
            if value.is_zero() {
                return ValidationResult::invalid(MSG_NOT_POSITIVE);
            }
        }
    }

    let max_net = ctx.max_net();
    let max_display = ctx.max_amount();
    if value > max_net {
        let message = match ctx.action {
            AmountAction::Stake { .. } => format!(
                "Amount must not exceed available balance minus fee ({} {})",
                max_display, ctx.token_symbol
            ),
            AmountAction::Unstake => format!(
                "Amount exceeds staked balance ({} {})",
                max_display, ctx.token_symbol
            ),
        };
        return ValidationResult::invalid(message);
    }

    // Compared against the truncated maximum the user was shown, not the
    // full-precision ceiling.
    let shown_max = amount::parse_decimal(&max_display, ctx.decimals).unwrap_or(max_net);
    ValidationResult::valid(value == shown_max)
}
