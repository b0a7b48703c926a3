//! Type definitions shared across the withdrawal engine

pub mod chain;
pub mod receipt;
pub mod ring;
pub mod token;
