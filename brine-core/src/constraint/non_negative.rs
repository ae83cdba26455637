use std::cmp::Ordering;

use num_traits::Zero;

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is non-negative (zero or greater).
///
/// Works with primitive floats and with `uom` quantities.
///
/// # Examples
///
/// ```
/// use brine_core::constraint::NonNegative;
/// use uom::si::{f64::Pressure, pressure::bar};
///
/// let drop = NonNegative::new(Pressure::new::<bar>(0.4)).unwrap();
/// assert_eq!(drop.into_inner().get::<bar>(), 0.4);
///
/// assert!(NonNegative::new(-1.0).is_err());
/// assert!(NonNegative::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs `Constrained<T, NonNegative>` if the value is non-negative.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::Negative`] if the value is less than zero.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: PartialOrd + Zero>(value: T) -> Result<Constrained<T, NonNegative>, ConstraintError> {
        Constrained::<T, NonNegative>::new(value)
    }

    /// Returns zero as a constrained value.
    #[must_use]
    pub fn zero<T: PartialOrd + Zero>() -> Constrained<T, NonNegative> {
        Constrained::new_unchecked(T::zero())
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            None => Err(ConstraintError::NotANumber),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            Some(Ordering::Equal | Ordering::Greater) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_hour};

    #[test]
    fn accepts_zero_and_positive() {
        assert!(NonNegative::new(0.0).is_ok());
        assert!(NonNegative::new(3.5).is_ok());
        assert_eq!(NonNegative::zero::<f64>().into_inner(), 0.0);
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert_eq!(NonNegative::new(-1e-9), Err(ConstraintError::Negative));
        assert_eq!(NonNegative::new(f64::NAN), Err(ConstraintError::NotANumber));
    }

    #[test]
    fn works_with_quantities() {
        let flow = VolumeRate::new::<cubic_meter_per_hour>(-2.0);
        assert!(matches!(
            NonNegative::new(flow),
            Err(ConstraintError::Negative)
        ));
    }
}
