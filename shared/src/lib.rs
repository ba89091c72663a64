pub mod config;
pub mod logger;
pub mod types;
pub mod validation;


pub use types::{Currency, Money};
pub use validation::ValidationError;
