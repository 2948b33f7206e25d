//! Utility functions shared across the crate.
//!
//! - [`decimal`] - decimal parsing and the zero-substituting arithmetic guards

mod decimal;

pub use decimal::{
    deserialize_opt_decimal, guarded_div, guarded_inverse, or_zero, parse_decimal,
    parse_decimal_opt, positive,
};
