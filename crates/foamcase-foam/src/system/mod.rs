//! `system/` dictionaries: discretization schemes and solution controls.

pub mod fv_schemes;
pub mod fv_solution;

pub use fv_schemes::fv_schemes;
pub use fv_solution::{fv_solution, shared_fv_solution};
