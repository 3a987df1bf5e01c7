//! Fixed-point math utilities for deterministic rules.
//!
//! Combat multipliers, hit points, and movement costs all use fixed-point
//! arithmetic so the same seed and command stream produce the same game on
//! every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all rules math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Build a multiplier from a whole percentage (`percent(125)` is 1.25).
#[inline]
#[must_use]
pub fn percent(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}
