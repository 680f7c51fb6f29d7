pub mod orchestrator;
pub mod outcome;
