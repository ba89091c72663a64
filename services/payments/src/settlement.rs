//! Order settlement: fee breakdown followed by member distribution
//!
//! Order and grading data are read through the injected repository at call
//! time; the fee and distribution steps themselves stay pure.

use chrono::{DateTime, Utc};
use fees_service::{FeeBreakdown, FeeCalculator};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::logger::log_payout;
use shared::types::{GroupId, MemberId, OrderId};
use shared::{Currency, Money};
use std::sync::Arc;
use tracing::{info, warn};

use crate::distributor::{distribute, PaymentAllocation};
use crate::error::SettlementError;
use crate::repository::{GradingRepository, MemberDirectory, OrderRepository};

/// One mobile-money disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutInstruction {
    pub member_id: MemberId,
    pub msisdn: Option<String>,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub order_id: OrderId,
    pub group_id: GroupId,
    pub currency: Currency,
    pub breakdown: FeeBreakdown,
    pub allocations: Vec<PaymentAllocation>,
    pub payouts: Vec<PayoutInstruction>,
    pub computed_at: DateTime<Utc>,
}

impl Settlement {
    pub fn distributed_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    /// Net amount not paid to members: sub-unit residue, or all of it when
    /// no contribution was accepted.
    pub fn undistributed(&self) -> Decimal {
        self.breakdown.net_amount - self.distributed_total()
    }

    pub fn allocation_for(&self, member_id: &str) -> Option<&PaymentAllocation> {
        self.allocations.iter().find(|a| a.member_id == member_id)
    }

    pub fn to_json(&self) -> Result<String, SettlementError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct SettlementService<R> {
    repository: Arc<R>,
    calculator: RwLock<FeeCalculator>,
}

impl<R> SettlementService<R>
where
    R: OrderRepository + GradingRepository + MemberDirectory,
{
    pub fn new(repository: Arc<R>, calculator: FeeCalculator) -> Self {
        Self {
            repository,
            calculator: RwLock::new(calculator),
        }
    }

    /// Swap in a new tier table or fee schedule after an admin edit.
    pub fn replace_calculator(&self, calculator: FeeCalculator) {
        *self.calculator.write() = calculator;
        info!("Fee configuration replaced");
    }

    pub fn calculator(&self) -> FeeCalculator {
        self.calculator.read().clone()
    }

    pub fn settle(&self, order_id: &str) -> Result<Settlement, SettlementError> {
        let order = self
            .repository
            .find_order(order_id)
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.to_string()))?;

        let breakdown = self
            .calculator
            .read()
            .compute(order.gross_amount, order.total_tonnage)?;

        let contributions = self.repository.contributions_for(order_id);
        let allocations = distribute(breakdown.net_amount, &contributions, order.currency)?;

        if allocations.is_empty() {
            warn!(
                order_id = %order_id,
                contributions = contributions.len(),
                "No accepted contributions, nothing to pay out"
            );
        }

        let payouts: Vec<PayoutInstruction> = allocations
            .iter()
            .filter(|a| a.amount > Decimal::ZERO)
            .map(|a| PayoutInstruction {
                member_id: a.member_id.clone(),
                msisdn: self.repository.msisdn(&a.member_id),
                amount: Money::new(a.amount, order.currency),
            })
            .collect();

        for payout in &payouts {
            log_payout(
                order_id,
                &payout.member_id,
                payout.msisdn.as_deref(),
                &payout.amount.to_string(),
            );
        }

        info!(
            order_id = %order_id,
            group_id = %order.group_id,
            gross = %breakdown.gross_amount,
            net = %breakdown.net_amount,
            members = allocations.len(),
            "Order settled"
        );

        Ok(Settlement {
            order_id: order.order_id,
            group_id: order.group_id,
            currency: order.currency,
            breakdown,
            allocations,
            payouts,
            computed_at: Utc::now(),
        })
    }
}
