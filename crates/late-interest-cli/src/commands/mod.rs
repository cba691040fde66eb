pub mod accrue;
pub mod assumptions;
pub mod calculate;
