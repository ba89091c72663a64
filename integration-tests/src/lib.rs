//! Fixtures shared by the integration test suites.

use payments_service::{Contribution, GradingStatus, InMemoryRepository, OrderRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::Currency;
use std::sync::Arc;

pub fn order(order_id: &str, gross_amount: Decimal, total_tonnage: Decimal) -> OrderRecord {
    OrderRecord {
        order_id: order_id.to_string(),
        group_id: "GRP-KIAMBU".to_string(),
        gross_amount,
        total_tonnage,
        currency: Currency::KES,
    }
}

/// The four-member Kiambu potato group: A 1200 kg, B 1500 kg, C 800 kg,
/// D 1500 kg, plus one rejected delivery from E.
pub fn kiambu_contributions() -> Vec<Contribution> {
    vec![
        Contribution::accepted("A", dec!(1200)),
        Contribution::accepted("B", dec!(1500)),
        Contribution::new("C", dec!(800), GradingStatus::PartiallyAccepted),
        Contribution::accepted("D", dec!(1500)),
        Contribution::new("E", dec!(700), GradingStatus::Rejected),
    ]
}

pub fn seeded_repository(order: OrderRecord, contributions: Vec<Contribution>) -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    let order_id = order.order_id.clone();
    repo.insert_order(order);
    for contribution in contributions {
        repo.record_contribution(&order_id, contribution);
    }
    repo.register_member("A", "254711000001");
    repo.register_member("B", "254711000002");
    repo.register_member("C", "254711000003");
    repo.register_member("D", "254711000004");
    repo
}
