//! Bid ranking for produce requests
//!
//! Each bid answering a buyer's request gets a score in [0, 100]: a weighted
//! sum of five components, each normalised to [0, 1] against the other bids in
//! the same batch.
//!
//! - price: cheapest offer / this offer
//! - distance: 1 - distance / farthest distance
//! - rating: rating / 5
//! - reliability: reliability % / 100
//! - photo quality: photo quality % / 100

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shared::validation::{ensure_in_range, ensure_non_negative, ensure_percent, ensure_positive, ensure_present};
use shared::ValidationError;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

const MAX_RATING: Decimal = dec!(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub bid_id: String,
    pub bidder_id: String,
    pub price_per_kg: Decimal,
    pub distance_km: Decimal,
    /// Average review score, 0 to 5.
    pub rating: Decimal,
    /// Share of past orders fulfilled as agreed, 0 to 100.
    pub reliability_percent: Decimal,
    /// Grader's assessment of the listing photos, 0 to 100.
    pub photo_quality_percent: Decimal,
}

impl Bid {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_present("bid_id", &self.bid_id)?;
        ensure_positive("price_per_kg", self.price_per_kg)?;
        ensure_non_negative("distance_km", self.distance_km)?;
        ensure_in_range("rating", self.rating, Decimal::ZERO, MAX_RATING)?;
        ensure_percent("reliability_percent", self.reliability_percent)?;
        ensure_percent("photo_quality_percent", self.photo_quality_percent)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub price: Decimal,
    pub distance: Decimal,
    pub rating: Decimal,
    pub reliability: Decimal,
    pub photo_quality: Decimal,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            price: dec!(0.35),
            distance: dec!(0.20),
            rating: dec!(0.20),
            reliability: dec!(0.15),
            photo_quality: dec!(0.10),
        }
    }
}

impl RankingWeights {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        shared::config::load_settings(path)
    }

    fn total(&self) -> Decimal {
        self.price + self.distance + self.rating + self.reliability + self.photo_quality
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("price weight", self.price)?;
        ensure_non_negative("distance weight", self.distance)?;
        ensure_non_negative("rating weight", self.rating)?;
        ensure_non_negative("reliability weight", self.reliability)?;
        ensure_non_negative("photo_quality weight", self.photo_quality)?;
        ensure_positive("total weight", self.total())?;
        Ok(())
    }

    /// Weights rescaled to sum to 1.
    pub fn normalized(&self) -> Result<RankingWeights, ValidationError> {
        self.validate()?;
        let total = self.total();
        Ok(RankingWeights {
            price: self.price / total,
            distance: self.distance / total,
            rating: self.rating / total,
            reliability: self.reliability / total,
            photo_quality: self.photo_quality / total,
        })
    }
}

/// Batch-wide reference points for the relative components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingContext {
    pub min_price: Decimal,
    pub max_distance: Decimal,
}

impl RankingContext {
    pub fn from_bids(bids: &[Bid]) -> Option<Self> {
        let min_price = bids.iter().map(|b| b.price_per_kg).min()?;
        let max_distance = bids.iter().map(|b| b.distance_km).max()?;
        Some(Self {
            min_price,
            max_distance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub price: Decimal,
    pub distance: Decimal,
    pub rating: Decimal,
    pub reliability: Decimal,
    pub photo_quality: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedBid {
    pub rank: usize,
    pub score: Decimal,
    pub components: ScoreComponents,
    pub bid: Bid,
}

fn components(bid: &Bid, context: &RankingContext) -> ScoreComponents {
    let price = if bid.price_per_kg.is_zero() {
        Decimal::ZERO
    } else {
        (context.min_price / bid.price_per_kg).min(Decimal::ONE)
    };

    let distance = if context.max_distance.is_zero() {
        Decimal::ONE
    } else {
        (Decimal::ONE - bid.distance_km / context.max_distance).max(Decimal::ZERO)
    };

    ScoreComponents {
        price,
        distance,
        rating: bid.rating / MAX_RATING,
        reliability: bid.reliability_percent / dec!(100),
        photo_quality: bid.photo_quality_percent / dec!(100),
    }
}

/// Score a single bid against a batch context. Returns the score (0 to 100,
/// two decimal places) and its components.
pub fn score_bid(
    bid: &Bid,
    weights: &RankingWeights,
    context: &RankingContext,
) -> Result<(Decimal, ScoreComponents), ValidationError> {
    bid.validate()?;
    let w = weights.normalized()?;
    let c = components(bid, context);

    let weighted = w.price * c.price
        + w.distance * c.distance
        + w.rating * c.rating
        + w.reliability * c.reliability
        + w.photo_quality * c.photo_quality;

    Ok(((weighted * dec!(100)).round_dp(2), c))
}

// Higher score first; equal scores go to the cheaper bid, then by bid id.
fn compare_ranked(a: &RankedBid, b: &RankedBid) -> Ordering {
    match b.score.cmp(&a.score) {
        Ordering::Equal => match a.bid.price_per_kg.cmp(&b.bid.price_per_kg) {
            Ordering::Equal => a.bid.bid_id.cmp(&b.bid.bid_id),
            ord => ord,
        },
        ord => ord,
    }
}

/// Rank every bid in the batch, best first, with ranks starting at 1.
pub fn rank_bids(bids: &[Bid], weights: &RankingWeights) -> Result<Vec<RankedBid>, ValidationError> {
    for bid in bids {
        bid.validate()?;
    }
    weights.validate()?;

    let Some(context) = RankingContext::from_bids(bids) else {
        return Ok(Vec::new());
    };

    let mut ranked = bids
        .iter()
        .map(|bid| {
            let (score, components) = score_bid(bid, weights, &context)?;
            Ok(RankedBid {
                rank: 0,
                score,
                components,
                bid: bid.clone(),
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    ranked.sort_by(compare_ranked);
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    debug!(
        bids = ranked.len(),
        best = %ranked[0].bid.bid_id,
        score = %ranked[0].score,
        "Bids ranked"
    );

    Ok(ranked)
}
