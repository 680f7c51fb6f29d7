pub mod merge;
pub mod suppression;
