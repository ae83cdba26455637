mod open;
mod right_open;

use std::cmp::Ordering;

pub use open::UnitIntervalOpen;
pub use right_open::UnitIntervalRightOpen;

/// Types that have well-defined zero and one bounds.
pub trait UnitBounds: PartialOrd + Sized {
    fn zero() -> Self;
    fn one() -> Self;
}

impl UnitBounds for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

/// Compares a value against both unit bounds.
///
/// Returns `None` if either comparison is undefined (e.g., NaN).
fn bounds<T: UnitBounds>(value: &T) -> Option<(Ordering, Ordering)> {
    Some((
        value.partial_cmp(&T::zero())?,
        value.partial_cmp(&T::one())?,
    ))
}
