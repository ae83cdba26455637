//! Membrane properties and the catalog they are looked up from.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use brine_core::constraint::{Constrained, StrictlyPositive, UnitIntervalOpen};

use crate::{InputError, SimulationError, composition::ion, units::LMH_PER_METER_PER_SECOND};

/// Pascals per bar, for permeability unit conversion.
const PA_PER_BAR: f64 = 1e5;

/// Water permeability coefficient `A` in m/s/Pa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterPermeability(Constrained<f64, StrictlyPositive>);

impl WaterPermeability {
    /// Creates a permeability from a value in m/s/Pa.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is finite and strictly positive.
    pub fn new(m_per_s_per_pa: f64) -> Result<Self, InputError> {
        let invalid = InputError::InvalidPermeability {
            value: m_per_s_per_pa,
        };
        if !m_per_s_per_pa.is_finite() {
            return Err(invalid);
        }
        StrictlyPositive::new(m_per_s_per_pa)
            .map(Self)
            .map_err(|_| invalid)
    }

    /// Creates a permeability from the datasheet unit L/m²/h/bar.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is finite and strictly positive.
    pub fn from_lmh_per_bar(value: f64) -> Result<Self, InputError> {
        Self::new(value / (LMH_PER_METER_PER_SECOND * PA_PER_BAR))
    }

    /// Returns the value in m/s/Pa.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Returns the value in L/m²/h/bar.
    #[must_use]
    pub fn as_lmh_per_bar(&self) -> f64 {
        self.get() * LMH_PER_METER_PER_SECOND * PA_PER_BAR
    }
}

/// Where a rejection coefficient came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionSource {
    /// Set explicitly for this membrane.
    Membrane,
    /// Taken from the ion catalog.
    Literature,
    /// The table-wide fallback for ions nobody has data for.
    Fallback,
}

/// A resolved rejection coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub value: f64,
    pub source: RejectionSource,
}

/// Per-ion rejection coefficients.
///
/// Lookups resolve in order: membrane override, literature default from the
/// [ion catalog](crate::composition::ion), then the fallback. The source is
/// reported with every lookup so callers can tell which path was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionTable {
    overrides: BTreeMap<String, f64>,
    fallback: f64,
}

impl RejectionTable {
    /// Fallback rejection when none is configured.
    pub const DEFAULT_FALLBACK: f64 = 0.95;

    /// Creates a table with no overrides and the given fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the fallback is not strictly between 0 and 1.
    pub fn new(fallback: f64) -> Result<Self, InputError> {
        Ok(Self {
            overrides: BTreeMap::new(),
            fallback: rejection("fallback", fallback)?,
        })
    }

    /// Sets a membrane-specific rejection for one ion.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not strictly between 0 and 1.
    pub fn with_override(mut self, ion: impl Into<String>, value: f64) -> Result<Self, InputError> {
        let ion = ion.into();
        let value = rejection(&ion, value)?;
        self.overrides.insert(ion, value);
        Ok(self)
    }

    /// Resolves the rejection coefficient for `ion`.
    #[must_use]
    pub fn lookup(&self, ion: &str) -> Rejection {
        if let Some(value) = self.overrides.get(ion) {
            return Rejection {
                value: *value,
                source: RejectionSource::Membrane,
            };
        }
        match ion::lookup(ion) {
            Some(info) => Rejection {
                value: info.rejection,
                source: RejectionSource::Literature,
            },
            None => Rejection {
                value: self.fallback,
                source: RejectionSource::Fallback,
            },
        }
    }

    #[must_use]
    pub fn fallback(&self) -> f64 {
        self.fallback
    }
}

impl Default for RejectionTable {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::new(),
            fallback: Self::DEFAULT_FALLBACK,
        }
    }
}

fn rejection(ion: &str, value: f64) -> Result<f64, InputError> {
    UnitIntervalOpen::new(value)
        .map(Constrained::into_inner)
        .map_err(|_| InputError::InvalidRejection {
            ion: ion.to_owned(),
            value,
        })
}

/// Transport properties of one membrane product.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneProperties {
    pub permeability: WaterPermeability,
    pub rejection: RejectionTable,
}

impl MembraneProperties {
    #[must_use]
    pub fn new(permeability: WaterPermeability, rejection: RejectionTable) -> Self {
        Self {
            permeability,
            rejection,
        }
    }
}

/// Read-only source of membrane properties keyed by identifier.
pub trait MembraneCatalog {
    /// Returns the properties for `id`, if known.
    fn membrane(&self, id: &str) -> Option<&MembraneProperties>;

    /// Returns the properties for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownMembrane`] if `id` is absent.
    fn require(&self, id: &str) -> Result<&MembraneProperties, SimulationError> {
        self.membrane(id)
            .ok_or_else(|| SimulationError::UnknownMembrane { id: id.to_owned() })
    }
}

impl MembraneCatalog for BTreeMap<String, MembraneProperties> {
    fn membrane(&self, id: &str) -> Option<&MembraneProperties> {
        self.get(id)
    }
}

impl<S: BuildHasher> MembraneCatalog for HashMap<String, MembraneProperties, S> {
    fn membrane(&self, id: &str) -> Option<&MembraneProperties> {
        self.get(id)
    }
}
