pub mod allocation;
pub mod engine;
pub mod error;
pub mod interest;
pub mod late_interest;
pub mod model;
pub mod rounding;
pub mod types;

pub use engine::{
    calculate_late_interest, calculate_new_lp, compute_new_lp, run_complete_calculation,
    CalculationRequest, LateInterestEngine, NewLpRequest,
};
pub use error::LateInterestError;
pub use types::*;

/// Standard result type for all late-interest operations
pub type LateInterestResult<T> = Result<T, LateInterestError>;
