use std::cmp::Ordering;

use crate::constraint::{Constrained, Constraint, ConstraintError};

use super::{UnitBounds, bounds};

/// Marker type enforcing that a value lies in the right-open unit interval: `0 ≤ x < 1`.
///
/// # Examples
///
/// ```
/// use brine_core::constraint::UnitIntervalRightOpen;
///
/// let split = UnitIntervalRightOpen::new(0.0).unwrap();
/// assert_eq!(split.as_ref(), &0.0);
///
/// assert!(UnitIntervalRightOpen::new(1.0).is_err());
/// assert!(UnitIntervalRightOpen::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitIntervalRightOpen;

impl UnitIntervalRightOpen {
    /// Constructs `Constrained<T, UnitIntervalRightOpen>` if `0 ≤ value < 1`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than or equal to one.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: UnitBounds>(
        value: T,
    ) -> Result<Constrained<T, UnitIntervalRightOpen>, ConstraintError> {
        Constrained::<T, UnitIntervalRightOpen>::new(value)
    }

    /// Returns the lower bound (zero) as a constrained value.
    #[must_use]
    pub fn zero<T: UnitBounds>() -> Constrained<T, UnitIntervalRightOpen> {
        Constrained::new_unchecked(T::zero())
    }
}

impl<T: UnitBounds> Constraint<T> for UnitIntervalRightOpen {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match bounds(value) {
            None => Err(ConstraintError::NotANumber),
            Some((Ordering::Less, _)) => Err(ConstraintError::BelowMinimum),
            Some((_, Ordering::Greater | Ordering::Equal)) => Err(ConstraintError::AboveMaximum),
            Some(_) => Ok(()),
        }
    }
}
