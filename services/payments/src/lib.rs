pub mod distributor;
pub mod error;
pub mod repository;
pub mod settlement;


pub use distributor::{distribute, Contribution, GradingStatus, PaymentAllocation};
pub use error::SettlementError;
pub use repository::{GradingRepository, InMemoryRepository, MemberDirectory, OrderRecord, OrderRepository};
pub use settlement::{PayoutInstruction, Settlement, SettlementService};
