//! Typed inputs and derived value objects for late-interest calculations.
//!
//! Inputs (`FundAssumptions`, `Partner`, `CapitalCall`) are produced by an
//! ingestion layer and never mutated by the calculators. Outputs are built
//! fresh on every run and returned by value.

pub mod assumptions;
pub mod partner;
pub mod results;

pub use assumptions::*;
pub use partner::*;
pub use results::*;
