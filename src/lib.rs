pub mod analyzer;
pub mod catalog;
pub mod expression;
pub mod term;
pub mod types;
pub mod wire;
