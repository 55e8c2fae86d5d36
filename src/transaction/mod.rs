pub mod model;
pub mod risk;

pub use model::Transaction;
pub use risk::{Payment, RiskAssessment, RiskLevel};
