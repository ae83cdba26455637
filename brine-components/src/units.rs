//! Unit helpers for quantities `uom` does not name directly.
//!
//! Membrane flux is customarily quoted in liters per square meter per hour
//! (LMH). It is a volumetric flux, so it is stored as a [`Velocity`].

use uom::si::{f64::Velocity, velocity::meter_per_second};

/// LMH in one meter per second.
pub(crate) const LMH_PER_METER_PER_SECOND: f64 = 3.6e6;

/// Creates a flux from a value in L/m²/h.
#[must_use]
pub fn flux_from_lmh(lmh: f64) -> Velocity {
    Velocity::new::<meter_per_second>(lmh / LMH_PER_METER_PER_SECOND)
}

/// Returns a flux in L/m²/h.
#[must_use]
pub fn flux_to_lmh(flux: Velocity) -> f64 {
    flux.get::<meter_per_second>() * LMH_PER_METER_PER_SECOND
}
