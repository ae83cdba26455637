//! Catalog of commonly analyzed ions.
//!
//! Rejection defaults are typical values for brackish-water polyamide
//! membranes. Boron and nitrate pass much more readily than divalent ions.

/// Reference data for one ion tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonInfo {
    pub tag: &'static str,
    /// Molar mass in g/mol.
    pub molar_mass: f64,
    /// Literature rejection coefficient.
    pub rejection: f64,
}

const fn info(tag: &'static str, molar_mass: f64, rejection: f64) -> IonInfo {
    IonInfo {
        tag,
        molar_mass,
        rejection,
    }
}

/// Known ions, sorted by tag.
pub const CATALOG: &[IonInfo] = &[
    info("B", 10.81, 0.65),
    info("Ba", 137.327, 0.995),
    info("CO3", 60.008, 0.995),
    info("Ca", 40.078, 0.995),
    info("Cl", 35.453, 0.985),
    info("F", 18.998, 0.98),
    info("HCO3", 61.017, 0.98),
    info("K", 39.098, 0.98),
    info("Mg", 24.305, 0.995),
    info("NH4", 18.038, 0.97),
    info("NO3", 62.004, 0.93),
    info("Na", 22.99, 0.985),
    info("SO4", 96.06, 0.997),
    info("SiO2", 60.084, 0.98),
    info("Sr", 87.62, 0.995),
];

/// Looks up reference data for an ion tag.
#[must_use]
pub fn lookup(tag: &str) -> Option<&'static IonInfo> {
    CATALOG.iter().find(|info| info.tag == tag)
}
