//! Contribution-proportional payment distribution
//!
//! The net amount of an order is split across farmer-group members in
//! proportion to their graded, accepted quantities. Only the whole minor units
//! of the net amount are paid out. Each share is floored to the minor unit and
//! the units left over are handed out one at a time by largest discarded
//! fraction (largest-remainder method), so the allocations always sum to the
//! payable amount exactly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shared::types::MemberId;
use shared::validation::{ensure_non_negative, ensure_present, ensure_representable};
use shared::{Currency, ValidationError};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingStatus {
    Pending,
    Accepted,
    PartiallyAccepted,
    Rejected,
}

impl GradingStatus {
    /// Whether the accepted quantity takes part in the payout.
    pub fn is_counted(&self) -> bool {
        matches!(self, GradingStatus::Accepted | GradingStatus::PartiallyAccepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub member_id: MemberId,
    /// Kilograms accepted at grading.
    pub accepted_quantity: Decimal,
    pub status: GradingStatus,
}

impl Contribution {
    pub fn new(member_id: &str, accepted_quantity: Decimal, status: GradingStatus) -> Self {
        Self {
            member_id: member_id.to_string(),
            accepted_quantity,
            status,
        }
    }

    pub fn accepted(member_id: &str, accepted_quantity: Decimal) -> Self {
        Self::new(member_id, accepted_quantity, GradingStatus::Accepted)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_present("member_id", &self.member_id)?;
        ensure_non_negative(&format!("accepted_quantity of {}", self.member_id), self.accepted_quantity)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub member_id: MemberId,
    pub accepted_quantity: Decimal,
    /// Share of the total accepted quantity, 0 to 100.
    pub percentage: Decimal,
    pub amount: Decimal,
}

struct Share {
    member_id: MemberId,
    quantity: Decimal,
    ratio: Decimal,
    amount: Decimal,
    remainder: Decimal,
}

/// Split `net_amount` across members by accepted quantity.
///
/// Returns an empty list when nothing was accepted. Members appear in the
/// order of their first contribution.
pub fn distribute(
    net_amount: Decimal,
    contributions: &[Contribution],
    currency: Currency,
) -> Result<Vec<PaymentAllocation>, ValidationError> {
    ensure_non_negative("net_amount", net_amount)?;
    for contribution in contributions {
        contribution.validate()?;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, Decimal)> = Vec::new();
    for contribution in contributions.iter().filter(|c| c.status.is_counted()) {
        match index.get(contribution.member_id.as_str()) {
            Some(&i) => {
                totals[i].1 = ensure_representable(
                    "accepted_quantity",
                    totals[i].1.checked_add(contribution.accepted_quantity),
                )?;
            }
            None => {
                let member_id = contribution.member_id.as_str();
                index.insert(member_id, totals.len());
                totals.push((member_id, contribution.accepted_quantity));
            }
        }
    }

    let total_accepted = ensure_representable(
        "total_accepted",
        totals
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, qty)| acc.checked_add(*qty)),
    )?;
    if total_accepted.is_zero() {
        debug!(contributions = contributions.len(), "No accepted quantity to distribute");
        return Ok(Vec::new());
    }

    let payable = currency.floor(net_amount);

    let mut shares: Vec<Share> = totals
        .into_iter()
        .map(|(member_id, quantity)| {
            let ratio = quantity / total_accepted;
            let exact = ensure_representable("amount", payable.checked_mul(ratio))?;
            let amount = currency.floor(exact);
            Ok(Share {
                member_id: member_id.to_string(),
                quantity,
                ratio,
                amount,
                remainder: exact - amount,
            })
        })
        .collect::<Result<_, ValidationError>>()?;

    let allocated: Decimal = shares.iter().map(|s| s.amount).sum();
    let mut leftover = payable - allocated;

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (&shares[a], &shares[b]);
        match sb.remainder.cmp(&sa.remainder) {
            Ordering::Equal => match sb.quantity.cmp(&sa.quantity) {
                Ordering::Equal => a.cmp(&b),
                ord => ord,
            },
            ord => ord,
        }
    });

    let unit = currency.minor_unit();
    for &i in order.iter().cycle() {
        if leftover < unit {
            break;
        }
        shares[i].amount += unit;
        leftover -= unit;
    }

    debug!(
        members = shares.len(),
        total_accepted = %total_accepted,
        payable = %payable,
        "Net amount distributed"
    );

    Ok(shares
        .into_iter()
        .map(|share| PaymentAllocation {
            member_id: share.member_id,
            accepted_quantity: share.quantity,
            percentage: (share.ratio * dec!(100)).normalize(),
            amount: share.amount,
        })
        .collect())
}
