pub mod generator;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::{ScenarioResult, SessionTester};
