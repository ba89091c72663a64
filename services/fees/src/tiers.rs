//! Commission tiers by order tonnage
//!
//! A tier covers the half-open range `[min_tonnage, max_tonnage)`; a missing
//! `max_tonnage` means the tier is unbounded above. A `TierTable` always
//! resolves exactly one tier for any tonnage >= 0. `TierDraft` is the
//! editable form used while an administrator creates or edits tiers; it
//! rejects overlaps on every edit and only checks coverage on `finalize`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shared::validation::{ensure_non_negative, ensure_percent};

use crate::error::{ConfigurationError, FeeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub min_tonnage: Decimal,
    #[serde(default)]
    pub max_tonnage: Option<Decimal>,
    pub commission_rate_percent: Decimal,
}

impl CommissionTier {
    pub fn new(min_tonnage: Decimal, max_tonnage: Option<Decimal>, commission_rate_percent: Decimal) -> Self {
        Self {
            min_tonnage,
            max_tonnage,
            commission_rate_percent,
        }
    }

    pub fn bounded(min_tonnage: Decimal, max_tonnage: Decimal, commission_rate_percent: Decimal) -> Self {
        Self::new(min_tonnage, Some(max_tonnage), commission_rate_percent)
    }

    pub fn unbounded(min_tonnage: Decimal, commission_rate_percent: Decimal) -> Self {
        Self::new(min_tonnage, None, commission_rate_percent)
    }

    pub fn contains(&self, tonnage: Decimal) -> bool {
        tonnage >= self.min_tonnage && self.max_tonnage.map_or(true, |max| tonnage < max)
    }

    pub fn overlaps(&self, other: &CommissionTier) -> bool {
        let starts_before_other_ends = other.max_tonnage.map_or(true, |max| self.min_tonnage < max);
        let other_starts_before_end = self.max_tonnage.map_or(true, |max| other.min_tonnage < max);
        starts_before_other_ends && other_starts_before_end
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_non_negative("min_tonnage", self.min_tonnage)?;
        ensure_percent("commission_rate_percent", self.commission_rate_percent)?;

        if let Some(max) = self.max_tonnage {
            if max <= self.min_tonnage {
                return Err(ConfigurationError::InvertedRange {
                    min: self.min_tonnage,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Reject `candidate` if it overlaps any tier in `tiers`. `skip` excludes the
/// tier being replaced during an edit.
pub fn check_overlap(
    tiers: &[CommissionTier],
    candidate: &CommissionTier,
    skip: Option<usize>,
) -> Result<(), ConfigurationError> {
    let candidate_index = skip.unwrap_or(tiers.len());

    for (i, existing) in tiers.iter().enumerate() {
        if Some(i) == skip {
            continue;
        }
        if existing.overlaps(candidate) {
            return Err(ConfigurationError::OverlappingTiers {
                first: i.min(candidate_index),
                second: i.max(candidate_index),
            });
        }
    }
    Ok(())
}

/// Resolve the single tier covering `tonnage`.
///
/// Works on any slice, validated or not: a gap yields `NoMatchingTier` and an
/// overlap yields `AmbiguousTier` rather than picking one of the candidates.
pub fn select_tier(tiers: &[CommissionTier], tonnage: Decimal) -> Result<&CommissionTier, FeeError> {
    ensure_non_negative("total_tonnage", tonnage)?;

    let mut matches = tiers.iter().filter(|t| t.contains(tonnage));
    let first = matches
        .next()
        .ok_or(ConfigurationError::NoMatchingTier { tonnage })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(ConfigurationError::AmbiguousTier {
            tonnage,
            count: extra + 1,
        }
        .into());
    }
    Ok(first)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CommissionTier>", into = "Vec<CommissionTier>")]
pub struct TierTable {
    tiers: Vec<CommissionTier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<CommissionTier>) -> Result<Self, ConfigurationError> {
        if tiers.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }

        for tier in &tiers {
            tier.validate()?;
        }
        tiers.sort_by(|a, b| a.min_tonnage.cmp(&b.min_tonnage));

        for (i, tier) in tiers.iter().enumerate() {
            check_overlap(&tiers[..i], tier, None)?;
        }

        let first = &tiers[0];
        if !first.min_tonnage.is_zero() {
            return Err(ConfigurationError::MissingZeroTier {
                min: first.min_tonnage,
            });
        }

        for (i, pair) in tiers.windows(2).enumerate() {
            match pair[0].max_tonnage {
                Some(max) if max == pair[1].min_tonnage => {}
                Some(max) => {
                    return Err(ConfigurationError::Gap {
                        from: max,
                        to: pair[1].min_tonnage,
                    })
                }
                None => {
                    return Err(ConfigurationError::OverlappingTiers {
                        first: i,
                        second: i + 1,
                    })
                }
            }
        }

        let last = &tiers[tiers.len() - 1];
        if let Some(max) = last.max_tonnage {
            return Err(ConfigurationError::BoundedLastTier { max });
        }

        Ok(Self { tiers })
    }

    /// `[0–1t:10%, 1–3t:12%, 3–5t:13%, 5–10t:14%, 10t+:15%]`
    pub fn reference() -> Self {
        Self {
            tiers: vec![
                CommissionTier::bounded(dec!(0), dec!(1), dec!(10)),
                CommissionTier::bounded(dec!(1), dec!(3), dec!(12)),
                CommissionTier::bounded(dec!(3), dec!(5), dec!(13)),
                CommissionTier::bounded(dec!(5), dec!(10), dec!(14)),
                CommissionTier::unbounded(dec!(10), dec!(15)),
            ],
        }
    }

    pub fn select(&self, tonnage: Decimal) -> Result<&CommissionTier, FeeError> {
        select_tier(&self.tiers, tonnage)
    }

    pub fn tiers(&self) -> &[CommissionTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<CommissionTier>> for TierTable {
    type Error = ConfigurationError;

    fn try_from(tiers: Vec<CommissionTier>) -> Result<Self, Self::Error> {
        TierTable::new(tiers)
    }
}

impl From<TierTable> for Vec<CommissionTier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

/// Tiers under edit. Gaps are allowed until `finalize`; overlaps never are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierDraft {
    tiers: Vec<CommissionTier>,
}

impl TierDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tier: CommissionTier) -> Result<usize, ConfigurationError> {
        tier.validate()?;
        check_overlap(&self.tiers, &tier, None)?;
        self.tiers.push(tier);
        Ok(self.tiers.len() - 1)
    }

    pub fn update(&mut self, index: usize, tier: CommissionTier) -> Result<(), ConfigurationError> {
        if index >= self.tiers.len() {
            return Err(ConfigurationError::UnknownTier { index });
        }
        tier.validate()?;
        check_overlap(&self.tiers, &tier, Some(index))?;
        self.tiers[index] = tier;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<CommissionTier, ConfigurationError> {
        if index >= self.tiers.len() {
            return Err(ConfigurationError::UnknownTier { index });
        }
        Ok(self.tiers.remove(index))
    }

    pub fn tiers(&self) -> &[CommissionTier] {
        &self.tiers
    }

    pub fn finalize(self) -> Result<TierTable, ConfigurationError> {
        TierTable::new(self.tiers)
    }
}

impl From<TierTable> for TierDraft {
    fn from(table: TierTable) -> Self {
        Self { tiers: table.tiers }
    }
}
