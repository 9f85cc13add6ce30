pub mod prediction;
pub mod tracker;
