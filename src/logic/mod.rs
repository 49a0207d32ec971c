pub mod comparator;
pub mod engine;
pub mod evaluator;
pub mod season;

pub use engine::{AlertEngine, RuleOutcome};
