pub mod engine;
pub mod guess;
pub mod serialization;
