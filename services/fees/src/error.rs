use rust_decimal::Decimal;
use shared::ValidationError;
use thiserror::Error;

/// Tier tables that cannot resolve exactly one tier per tonnage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No commission tiers configured")]
    EmptyTable,
    #[error("No commission tier covers {tonnage} t")]
    NoMatchingTier { tonnage: Decimal },
    #[error("Tiers {first} and {second} overlap")]
    OverlappingTiers { first: usize, second: usize },
    #[error("{count} tiers match {tonnage} t")]
    AmbiguousTier { tonnage: Decimal, count: usize },
    #[error("Tier range [{min}, {max}) is empty or inverted")]
    InvertedRange { min: Decimal, max: Decimal },
    #[error("Gap between {from} t and {to} t")]
    Gap { from: Decimal, to: Decimal },
    #[error("First tier must start at 0 t, starts at {min}")]
    MissingZeroTier { min: Decimal },
    #[error("Last tier must be unbounded, ends at {max}")]
    BoundedLastTier { max: Decimal },
    #[error("Tier index {index} out of range")]
    UnknownTier { index: usize },
    #[error("Invalid tier: {0}")]
    InvalidTier(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Fees of {deductions} exceed gross amount {gross}")]
    NegativeNetAmount { gross: Decimal, deductions: Decimal },
}
