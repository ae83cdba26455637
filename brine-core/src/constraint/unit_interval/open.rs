use std::cmp::Ordering;

use crate::constraint::{Constrained, Constraint, ConstraintError};

use super::{UnitBounds, bounds};

/// Marker type enforcing that a value lies in the open unit interval: `0 < x < 1`.
///
/// Stage recovery and ion rejection coefficients live here: both endpoints
/// describe a degenerate membrane stage.
///
/// # Examples
///
/// ```
/// use brine_core::constraint::{Constrained, UnitIntervalOpen};
///
/// let recovery = Constrained::<_, UnitIntervalOpen>::new(0.5).unwrap();
/// assert_eq!(recovery.into_inner(), 0.5);
///
/// assert!(UnitIntervalOpen::new(0.0).is_err());
/// assert!(UnitIntervalOpen::new(1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitIntervalOpen;

impl UnitIntervalOpen {
    /// Constructs `Constrained<T, UnitIntervalOpen>` if `0 < value < 1`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than or equal to zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than or equal to one.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: UnitBounds>(
        value: T,
    ) -> Result<Constrained<T, UnitIntervalOpen>, ConstraintError> {
        Constrained::<T, UnitIntervalOpen>::new(value)
    }
}

impl<T: UnitBounds> Constraint<T> for UnitIntervalOpen {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match bounds(value) {
            None => Err(ConstraintError::NotANumber),
            Some((Ordering::Less | Ordering::Equal, _)) => Err(ConstraintError::BelowMinimum),
            Some((_, Ordering::Greater | Ordering::Equal)) => Err(ConstraintError::AboveMaximum),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_values_are_valid() {
        assert!(UnitIntervalOpen::new(1e-9).is_ok());
        assert!(UnitIntervalOpen::new(0.5).is_ok());
        assert!(UnitIntervalOpen::new(1.0 - 1e-9).is_ok());
    }

    #[test]
    fn endpoints_are_excluded() {
        assert_eq!(UnitIntervalOpen::new(0.0), Err(ConstraintError::BelowMinimum));
        assert_eq!(UnitIntervalOpen::new(1.0), Err(ConstraintError::AboveMaximum));
        assert_eq!(
            UnitIntervalOpen::new(f64::NAN),
            Err(ConstraintError::NotANumber)
        );
    }
}
