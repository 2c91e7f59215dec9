pub mod job;
pub mod quote;
pub mod rule;
pub mod serde_helpers;
