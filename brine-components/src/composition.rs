//! Ion compositions of process streams.

pub mod ion;

use std::collections::BTreeMap;

use brine_core::constraint::NonNegative;
use serde::{Deserialize, Serialize};
use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_hour};

use crate::InputError;

/// Concentrations of dissolved ions in mg/L, keyed by ion tag.
///
/// Values are finite and non-negative by construction. An ion that is not
/// present reads as zero. Keys are kept sorted, so iterating a composition
/// always visits ions in the same order.
///
/// # Example
///
/// ```
/// use brine_components::IonComposition;
///
/// let feed = IonComposition::new([("Na", 800.0), ("Cl", 1200.0)]).unwrap();
/// assert_eq!(feed.tds(), 2000.0);
/// assert_eq!(feed.get("SO4"), 0.0);
///
/// assert!(IonComposition::new([("Ca", -1.0)]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct IonComposition(BTreeMap<String, f64>);

impl IonComposition {
    /// Creates a composition from `(ion, mg/L)` pairs.
    ///
    /// Repeated tags keep the last value.
    ///
    /// # Errors
    ///
    /// Returns an error if any concentration is negative or not finite.
    pub fn new<I, K>(entries: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut ions = BTreeMap::new();
        for (ion, value) in entries {
            let ion = ion.into();
            check_concentration(&ion, value)?;
            ions.insert(ion, value);
        }
        Ok(Self(ions))
    }

    /// Returns the concentration of `ion` in mg/L, or zero if absent.
    #[must_use]
    pub fn get(&self, ion: &str) -> f64 {
        self.0.get(ion).copied().unwrap_or(0.0)
    }

    /// Total dissolved solids in mg/L.
    #[must_use]
    pub fn tds(&self) -> f64 {
        self.0.values().sum()
    }

    /// Iterates over `(ion, mg/L)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(ion, &value)| (ion.as_str(), value))
    }

    /// Iterates over the ion tags in order.
    pub fn ions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Multiplies every concentration by `factor`.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is negative or not finite.
    pub fn scaled(&self, factor: f64) -> Result<Self, InputError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(InputError::NonPhysicalResult {
                quantity: "scale factor",
                value: factor,
            });
        }
        Self::new(self.iter().map(|(ion, value)| (ion, value * factor)))
    }

    /// Mixes streams by flow-weighted average over the union of their ions.
    ///
    /// # Errors
    ///
    /// Returns an error if the total flow is not strictly positive or any
    /// flow is negative.
    pub fn blend(streams: &[(&IonComposition, VolumeRate)]) -> Result<Self, InputError> {
        let mut total_flow = 0.0;
        let mut mass: BTreeMap<&str, f64> = BTreeMap::new();

        for (composition, flow) in streams {
            let flow = flow.get::<cubic_meter_per_hour>();
            if !flow.is_finite() || flow < 0.0 {
                return Err(InputError::NonPhysicalResult {
                    quantity: "blend stream flow",
                    value: flow,
                });
            }
            total_flow += flow;
            for (ion, value) in composition.iter() {
                *mass.entry(ion).or_insert(0.0) += flow * value;
            }
        }

        if total_flow <= 0.0 {
            return Err(InputError::NonPhysicalResult {
                quantity: "blend total flow",
                value: total_flow,
            });
        }

        Self::new(mass.into_iter().map(|(ion, m)| (ion, m / total_flow)))
    }

    /// Largest absolute per-ion difference in mg/L, over the union of ions.
    #[must_use]
    pub fn max_abs_difference(&self, other: &IonComposition) -> f64 {
        self.ions()
            .chain(other.ions())
            .map(|ion| (self.get(ion) - other.get(ion)).abs())
            .fold(0.0, f64::max)
    }
}

impl TryFrom<BTreeMap<String, f64>> for IonComposition {
    type Error = InputError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

fn check_concentration(ion: &str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFiniteConcentration {
            ion: ion.to_owned(),
        });
    }
    NonNegative::new(value)
        .map(|_| ())
        .map_err(|_| InputError::NegativeConcentration {
            ion: ion.to_owned(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn m3h(value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_hour>(value)
    }

    #[test]
    fn rejects_bad_concentrations() {
        assert!(matches!(
            IonComposition::new([("Na", -0.1)]),
            Err(InputError::NegativeConcentration { value, .. }) if value == -0.1
        ));
        assert!(matches!(
            IonComposition::new([("Cl", f64::NAN)]),
            Err(InputError::NonFiniteConcentration { .. })
        ));
    }

    #[test]
    fn zero_concentration_is_valid() {
        let water = IonComposition::new([("Na", 0.0), ("Cl", -0.0)]).unwrap();
        assert_eq!(water.tds(), 0.0);
        assert!(matches!(
            IonComposition::new([("Na", -1e-12)]),
            Err(InputError::NegativeConcentration { .. })
        ));
    }

    #[test]
    fn iteration_is_sorted_by_tag() {
        let comp = IonComposition::new([("SO4", 1.0), ("Ca", 2.0), ("Na", 3.0)]).unwrap();
        let ions: Vec<_> = comp.ions().collect();
        assert_eq!(ions, ["Ca", "Na", "SO4"]);
    }

    #[test]
    fn blend_weights_by_flow() {
        let a = IonComposition::new([("Na", 100.0)]).unwrap();
        let b = IonComposition::new([("Na", 400.0), ("Cl", 300.0)]).unwrap();

        let mixed = IonComposition::blend(&[(&a, m3h(3.0)), (&b, m3h(1.0))]).unwrap();

        assert_relative_eq!(mixed.get("Na"), 175.0);
        assert_relative_eq!(mixed.get("Cl"), 75.0);
    }

    #[test]
    fn blend_needs_positive_total_flow() {
        let a = IonComposition::new([("Na", 100.0)]).unwrap();
        assert!(IonComposition::blend(&[(&a, m3h(0.0))]).is_err());
        assert!(IonComposition::blend(&[]).is_err());
    }

    #[test]
    fn scaled_and_difference() {
        let a = IonComposition::new([("Na", 10.0), ("Cl", 20.0)]).unwrap();
        let b = a.scaled(3.0).unwrap();

        assert_relative_eq!(b.tds(), 90.0);
        assert_relative_eq!(a.max_abs_difference(&b), 40.0);
        assert!(a.scaled(-1.0).is_err());
    }
}
