//! App-promotion staking calls.

use serde_json::Value;
use unqstake_core::validation::{self, ValidationContext};
use unqstake_core::{Balance, StakeTab, amount, fields};

use crate::client::{ExtrinsicRequest, ExtrinsicSubmitter, Signer, SubmitResult};
use crate::error::ChainError;

/// A staking extrinsic of the `appPromotion` pallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakingCall {
    Stake(Balance),
    UnstakePartial(Balance),
    /// Unstake everything. Takes no arguments.
    UnstakeAll,
}

impl StakingCall {
    pub fn method(&self) -> &'static str {
        match self {
            StakingCall::Stake(_) => "stake",
            StakingCall::UnstakePartial(_) => "unstakePartial",
            StakingCall::UnstakeAll => "unstakeAll",
        }
    }

    /// Call arguments, amounts as decimal integer strings.
    pub fn args(&self) -> Vec<Value> {
        match self {
            StakingCall::Stake(amount) | StakingCall::UnstakePartial(amount) => {
                vec![Value::String(amount.to_string())]
            }
            StakingCall::UnstakeAll => Vec::new(),
        }
    }

    pub fn to_request(&self, address: &str) -> ExtrinsicRequest {
        ExtrinsicRequest {
            address: address.to_string(),
            section: fields::STAKING_SECTION.to_string(),
            method: self.method().to_string(),
            args: self.args(),
        }
    }

    /// Stake call for a decimal amount typed by the user.
    pub fn stake(input: &str, decimals: u8) -> Result<Self, ChainError> {
        Ok(StakingCall::Stake(parse_input(input, decimals)?))
    }

    /// Unstake call for a decimal amount. The maximum amount unstakes
    /// everything, so no dust is left behind by the 4-digit truncation.
    pub fn unstake(input: &str, decimals: u8, is_max_amount: bool) -> Result<Self, ChainError> {
        if is_max_amount {
            return Ok(StakingCall::UnstakeAll);
        }
        Ok(StakingCall::UnstakePartial(parse_input(input, decimals)?))
    }
}

fn parse_input(input: &str, decimals: u8) -> Result<Balance, ChainError> {
    let normalized = validation::normalize_amount_input(input)
        .ok_or_else(|| ChainError::Validation(validation::MSG_INVALID_NUMBER.to_string()))?;
    Ok(amount::parse_decimal(&normalized, decimals)?)
}

/// Validates amounts and submits staking extrinsics.
pub struct StakingService<S> {
    submitter: S,
}

impl<S: ExtrinsicSubmitter> StakingService<S> {
    pub fn new(submitter: S) -> Self {
        Self { submitter }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub async fn submit(
        &self,
        address: &str,
        call: &StakingCall,
        signer: &dyn Signer,
    ) -> Result<SubmitResult, ChainError> {
        let request = call.to_request(address);
        tracing::info!(
            "Submitting {}.{} for {} ({:?})",
            request.section,
            request.method,
            address,
            request.args
        );
        match self.submitter.submit(&request, signer).await {
            Ok(result) => {
                tracing::info!("{}.{} included: {}", request.section, request.method, result.hash);
                Ok(result)
            }
            Err(e) => {
                tracing::warn!("{}.{} failed: {}", request.section, request.method, e);
                Err(e)
            }
        }
    }

    /// Validate `input` for the given tab and submit the matching call.
    /// Invalid input is returned as [`ChainError::Validation`] without
    /// contacting the chain.
    pub async fn execute(
        &self,
        tab: StakeTab,
        address: &str,
        input: &str,
        ctx: &ValidationContext,
        signer: &dyn Signer,
    ) -> Result<SubmitResult, ChainError> {
        let result = validation::validate_amount(input, ctx);
        if !result.is_valid {
            let message = if result.message.is_empty() {
                validation::MSG_INVALID_NUMBER.to_string()
            } else {
                result.message
            };
            return Err(ChainError::Validation(message));
        }

        let call = match tab {
            StakeTab::Stake => StakingCall::stake(input, ctx.decimals)?,
            StakeTab::Unstake => StakingCall::unstake(input, ctx.decimals, result.is_max_amount)?,
        };
        self.submit(address, &call, signer).await
    }
}
