pub mod calculator;
pub mod error;
pub mod schedule;
pub mod settings;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use calculator::{compute_net_amount, FeeBreakdown, FeeCalculator, NegativeNetPolicy};
pub use error::{ConfigurationError, FeeError};
pub use schedule::FeeSchedule;
pub use settings::FeeSettings;
pub use tiers::{CommissionTier, TierDraft, TierTable};
