//! Query interfaces onto the order, grading and membership collaborators
//!
//! The settlement service only reads through these traits. The in-memory
//! implementation backs tests and local tooling.

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::types::{GroupId, MemberId, OrderId};
use shared::Currency;

use crate::distributor::Contribution;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub group_id: GroupId,
    pub gross_amount: Decimal,
    pub total_tonnage: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

pub trait OrderRepository: Send + Sync {
    fn find_order(&self, order_id: &str) -> Option<OrderRecord>;
}

pub trait GradingRepository: Send + Sync {
    /// Graded contributions for an order, in grading order.
    fn contributions_for(&self, order_id: &str) -> Vec<Contribution>;
}

pub trait MemberDirectory: Send + Sync {
    /// Mobile-money number registered for a member.
    fn msisdn(&self, member_id: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    orders: DashMap<OrderId, OrderRecord>,
    contributions: DashMap<OrderId, Vec<Contribution>>,
    members: DashMap<MemberId, String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: OrderRecord) {
        self.orders.insert(order.order_id.clone(), order);
    }

    pub fn record_contribution(&self, order_id: &str, contribution: Contribution) {
        self.contributions
            .entry(order_id.to_string())
            .or_default()
            .push(contribution);
    }

    pub fn register_member(&self, member_id: &str, msisdn: &str) {
        self.members.insert(member_id.to_string(), msisdn.to_string());
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl OrderRepository for InMemoryRepository {
    fn find_order(&self, order_id: &str) -> Option<OrderRecord> {
        self.orders.get(order_id).map(|o| o.value().clone())
    }
}

impl GradingRepository for InMemoryRepository {
    fn contributions_for(&self, order_id: &str) -> Vec<Contribution> {
        self.contributions
            .get(order_id)
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }
}

impl MemberDirectory for InMemoryRepository {
    fn msisdn(&self, member_id: &str) -> Option<String> {
        self.members.get(member_id).map(|m| m.value().clone())
    }
}
