use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::calculator::{FeeCalculator, NegativeNetPolicy};
use crate::error::FeeError;
use crate::schedule::FeeSchedule;
use crate::tiers::TierTable;

/// Admin-managed commission and fee configuration.
///
/// ```toml
/// negative_net_policy = "clamp_to_zero"
///
/// [schedule]
/// platform_fee_percent = 2
/// transport_fee_flat = 1500
///
/// [[tiers]]
/// min_tonnage = 0
/// commission_rate_percent = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    pub tiers: TierTable,
    pub schedule: FeeSchedule,
    pub negative_net_policy: NegativeNetPolicy,
}

impl FeeSettings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        shared::config::load_settings(path)
    }

    pub fn into_calculator(self) -> Result<FeeCalculator, FeeError> {
        FeeCalculator::new(self.tiers, self.schedule, self.negative_net_policy)
    }
}
