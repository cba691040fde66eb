pub mod accrual;
pub mod rate;

pub use accrual::{inclusive_days, Accrual, AccrualCalculator};
pub use rate::RateResolver;
