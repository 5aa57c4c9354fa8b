//! # Pack Calculator
//!
//! Computes how many whole packages cover a required quantity. Partial
//! packages cannot be bought, so the result always rounds up.

use crate::errors::PackError;

/// Relative distance from an integer under which a quotient counts as exact
const EXACT_QUOTIENT_TOLERANCE: f64 = 1e-9;

/// Number of packages of `package_base` needed to cover `required_base`
///
/// Both quantities must be expressed in the same base unit and be positive.
///
/// # Examples
///
/// ```rust
/// use basket_engine::packs::packs_needed;
///
/// assert_eq!(packs_needed(250.0, 100.0), Ok(3));
/// assert_eq!(packs_needed(300.0, 100.0), Ok(3));
/// assert_eq!(packs_needed(301.0, 100.0), Ok(4));
/// assert!(packs_needed(100.0, 0.0).is_err());
/// ```
pub fn packs_needed(required_base: f64, package_base: f64) -> Result<u32, PackError> {
    if !required_base.is_finite() || required_base <= 0.0 {
        return Err(PackError::NonPositiveRequired(required_base));
    }
    if !package_base.is_finite() || package_base <= 0.0 {
        return Err(PackError::NonPositivePackage(package_base));
    }

    let quotient = required_base / package_base;
    let nearest = quotient.round();
    // Absorb float noise such as 0.3 / 0.1 = 3.0000000000000004, but only
    // when the rounded count still covers the requirement
    let near_exact = (quotient - nearest).abs() <= EXACT_QUOTIENT_TOLERANCE * nearest.max(1.0);
    let packs = if near_exact && nearest * package_base >= required_base {
        nearest
    } else {
        quotient.ceil()
    };

    if packs > u32::MAX as f64 {
        return Err(PackError::Overflow {
            required: required_base,
            package: package_base,
        });
    }

    Ok((packs as u32).max(1))
}
