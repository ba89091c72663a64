//! Commission and fee deductions for a fulfilled order
//!
//! `net = gross - commission - platform fee - transport fee - grading fee`,
//! where the commission rate comes from the tonnage tier and the platform fee
//! is a percentage of gross. Amounts are kept exact; rounding to the currency
//! minor unit happens when the net amount is paid out.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shared::validation::{ensure_non_negative, ensure_percent, ensure_representable};
use tracing::{debug, warn};

use crate::error::FeeError;
use crate::schedule::FeeSchedule;
use crate::tiers::{select_tier, CommissionTier, TierTable};

/// What to do when deductions exceed the gross amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeNetPolicy {
    #[default]
    Reject,
    ClampToZero,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub gross_amount: Decimal,
    pub total_tonnage: Decimal,
    pub tier: CommissionTier,
    pub commission_amount: Decimal,
    pub platform_fee_amount: Decimal,
    pub transport_fee: Decimal,
    pub grading_fee: Decimal,
    pub net_amount: Decimal,
    /// Set when deductions exceeded gross and the net was clamped to zero.
    pub clamped: bool,
}

impl FeeBreakdown {
    pub fn total_deductions(&self) -> Decimal {
        self.commission_amount + self.platform_fee_amount + self.transport_fee + self.grading_fee
    }
}

/// Compute the breakdown, rejecting orders whose fees exceed their value.
pub fn compute_net_amount(
    gross_amount: Decimal,
    total_tonnage: Decimal,
    tiers: &[CommissionTier],
    schedule: &FeeSchedule,
) -> Result<FeeBreakdown, FeeError> {
    compute_with_policy(gross_amount, total_tonnage, tiers, schedule, NegativeNetPolicy::Reject)
}

pub fn compute_with_policy(
    gross_amount: Decimal,
    total_tonnage: Decimal,
    tiers: &[CommissionTier],
    schedule: &FeeSchedule,
    policy: NegativeNetPolicy,
) -> Result<FeeBreakdown, FeeError> {
    ensure_non_negative("gross_amount", gross_amount)?;
    schedule.validate()?;

    let tier = select_tier(tiers, total_tonnage)?;
    ensure_percent("commission_rate_percent", tier.commission_rate_percent)?;

    let commission_amount = percent_of("commission_amount", gross_amount, tier.commission_rate_percent)?;
    let platform_fee_amount = percent_of("platform_fee_amount", gross_amount, schedule.platform_fee_percent)?;
    let deductions = ensure_representable(
        "deductions",
        commission_amount
            .checked_add(platform_fee_amount)
            .zip(schedule.flat_fees())
            .and_then(|(percentages, flat)| percentages.checked_add(flat)),
    )?;
    let raw_net = gross_amount - deductions;

    let (net_amount, clamped) = if raw_net < Decimal::ZERO {
        match policy {
            NegativeNetPolicy::Reject => {
                return Err(FeeError::NegativeNetAmount {
                    gross: gross_amount,
                    deductions,
                })
            }
            NegativeNetPolicy::ClampToZero => {
                warn!(
                    gross = %gross_amount,
                    deductions = %deductions,
                    "Deductions exceed gross amount, clamping net to zero"
                );
                (Decimal::ZERO, true)
            }
        }
    } else {
        (raw_net, false)
    };

    debug!(
        gross = %gross_amount,
        tonnage = %total_tonnage,
        rate = %tier.commission_rate_percent,
        net = %net_amount,
        "Fee breakdown computed"
    );

    Ok(FeeBreakdown {
        gross_amount,
        total_tonnage,
        tier: tier.clone(),
        commission_amount,
        platform_fee_amount,
        transport_fee: schedule.transport_fee_flat,
        grading_fee: schedule.grading_fee_flat,
        net_amount,
        clamped,
    })
}

fn percent_of(field: &str, amount: Decimal, percent: Decimal) -> Result<Decimal, FeeError> {
    let value = amount.checked_mul(percent).and_then(|v| v.checked_div(dec!(100)));
    Ok(ensure_representable(field, value)?)
}

/// A validated tier table and fee schedule bound to a negative-net policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCalculator {
    tiers: TierTable,
    schedule: FeeSchedule,
    policy: NegativeNetPolicy,
}

impl FeeCalculator {
    pub fn new(tiers: TierTable, schedule: FeeSchedule, policy: NegativeNetPolicy) -> Result<Self, FeeError> {
        schedule.validate()?;
        Ok(Self {
            tiers,
            schedule,
            policy,
        })
    }

    pub fn compute(&self, gross_amount: Decimal, total_tonnage: Decimal) -> Result<FeeBreakdown, FeeError> {
        compute_with_policy(
            gross_amount,
            total_tonnage,
            self.tiers.tiers(),
            &self.schedule,
            self.policy,
        )
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn policy(&self) -> NegativeNetPolicy {
        self.policy
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self {
            tiers: TierTable::reference(),
            schedule: FeeSchedule::default(),
            policy: NegativeNetPolicy::default(),
        }
    }
}
