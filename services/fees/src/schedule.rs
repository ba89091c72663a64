use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::validation::{ensure_non_negative, ensure_percent};
use shared::ValidationError;

/// Deductions applied to an order's gross total on top of the commission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub platform_fee_percent: Decimal,
    pub transport_fee_flat: Decimal,
    pub grading_fee_flat: Decimal,
}

impl FeeSchedule {
    pub fn new(platform_fee_percent: Decimal, transport_fee_flat: Decimal, grading_fee_flat: Decimal) -> Self {
        Self {
            platform_fee_percent,
            transport_fee_flat,
            grading_fee_flat,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_percent("platform_fee_percent", self.platform_fee_percent)?;
        ensure_non_negative("transport_fee_flat", self.transport_fee_flat)?;
        ensure_non_negative("grading_fee_flat", self.grading_fee_flat)?;
        Ok(())
    }

    /// Transport plus grading fee, `None` if the sum overflows.
    pub fn flat_fees(&self) -> Option<Decimal> {
        self.transport_fee_flat.checked_add(self.grading_fee_flat)
    }
}
