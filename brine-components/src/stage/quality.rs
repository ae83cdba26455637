//! Permeate and reject quality of a single stage.
//!
//! Flows are normalized to unit feed. A first-pass reject follows from the
//! concentration factor, the log-mean of feed and that estimate drives
//! passage through the membrane, and the reject is then refined so that each
//! ion's mass balance closes exactly.

use crate::{
    InputError, IonComposition,
    membrane::{RejectionSource, RejectionTable},
};

use super::Recovery;

/// Below this relative gap, feed and reject are treated as equal.
const LOG_MEAN_GAP: f64 = 1e-9;

/// Permeate and reject compositions of a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageQuality {
    pub permeate: IonComposition,
    pub reject: IonComposition,
    /// Ions whose rejection came from the table-wide fallback.
    pub fallback_ions: Vec<String>,
}

/// First-pass reject estimate assuming complete rejection.
///
/// # Errors
///
/// Returns an error only if scaling produced a non-finite value.
pub fn estimate_reject(
    feed: &IonComposition,
    recovery: Recovery,
) -> Result<IonComposition, InputError> {
    feed.scaled(recovery.concentration_factor())
}

/// Logarithmic mean of two non-negative concentrations.
///
/// Falls back to `a` when the two are nearly equal, and to the arithmetic
/// mean when either is zero.
#[must_use]
pub fn log_mean(a: f64, b: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return 0.5 * (a + b);
    }
    if (b - a).abs() <= LOG_MEAN_GAP * a.max(b) {
        return a;
    }
    (b - a) / (b / a).ln()
}

/// Computes permeate and reject quality for one stage.
///
/// # Errors
///
/// Returns an error if the refined reject concentration of any ion would be
/// negative or non-finite. That happens when a poorly rejected ion is pushed
/// to an extreme recovery.
pub fn stage_quality(
    feed: &IonComposition,
    recovery: Recovery,
    rejection: &RejectionTable,
) -> Result<StageQuality, InputError> {
    let r = recovery.get();
    let cf = recovery.concentration_factor();

    let mut permeate = Vec::with_capacity(feed.len());
    let mut reject = Vec::with_capacity(feed.len());
    let mut fallback_ions = Vec::new();

    for (ion, c_feed) in feed.iter() {
        let rej = rejection.lookup(ion);
        if rej.source == RejectionSource::Fallback {
            log::debug!("no rejection data for `{ion}`, using fallback {}", rej.value);
            fallback_ions.push(ion.to_owned());
        }

        let c_mean = log_mean(c_feed, c_feed * cf);
        let c_perm = c_mean * (1.0 - rej.value);
        let c_rej = (c_feed - c_perm * r) / (1.0 - r);

        if !c_rej.is_finite() || c_rej < 0.0 {
            return Err(InputError::NonPhysicalResult {
                quantity: "reject concentration",
                value: c_rej,
            });
        }

        permeate.push((ion, c_perm));
        reject.push((ion, c_rej));
    }

    Ok(StageQuality {
        permeate: IonComposition::new(permeate)?,
        reject: IonComposition::new(reject)?,
        fallback_ions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn feed() -> IonComposition {
        IonComposition::new([("Na", 800.0), ("Cl", 1200.0), ("Ca", 150.0), ("SO4", 300.0)])
            .unwrap()
    }

    #[test]
    fn log_mean_properties() {
        assert_relative_eq!(log_mean(1.0, std::f64::consts::E), std::f64::consts::E - 1.0);
        assert_relative_eq!(log_mean(5.0, 5.0), 5.0);
        assert_relative_eq!(log_mean(0.0, 0.0), 0.0);
        let m = log_mean(100.0, 200.0);
        assert!(m > 100.0 && m < 150.0);
    }

    #[test]
    fn mass_balance_closes_for_every_ion() {
        let recovery = Recovery::new(0.6).unwrap();
        let quality = stage_quality(&feed(), recovery, &RejectionTable::default()).unwrap();

        for (ion, c_feed) in feed().iter() {
            let balance = 0.6 * quality.permeate.get(ion) + 0.4 * quality.reject.get(ion);
            assert_relative_eq!(balance, c_feed, max_relative = 1e-10);
        }
    }

    #[test]
    fn permeate_is_cleaner_and_reject_concentrates() {
        let quality =
            stage_quality(&feed(), Recovery::new(0.5).unwrap(), &RejectionTable::default())
                .unwrap();

        assert!(quality.permeate.tds() < 0.05 * feed().tds());
        assert!(quality.reject.tds() > 1.9 * feed().tds());
        assert!(quality.reject.tds() < 2.0 * feed().tds());
        assert!(quality.fallback_ions.is_empty());
    }

    #[test]
    fn fallback_ions_are_reported() {
        let feed = IonComposition::new([("Na", 100.0), ("Li", 2.0)]).unwrap();
        let quality =
            stage_quality(&feed, Recovery::new(0.5).unwrap(), &RejectionTable::default()).unwrap();

        assert_eq!(quality.fallback_ions, ["Li"]);
    }

    #[test]
    fn absent_ions_stay_absent() {
        let quality =
            stage_quality(&feed(), Recovery::new(0.5).unwrap(), &RejectionTable::default())
                .unwrap();
        assert_eq!(quality.permeate.get("Mg"), 0.0);
        assert_eq!(quality.reject.get("Mg"), 0.0);
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let recovery = Recovery::new(0.45).unwrap();
        let table = RejectionTable::default();
        let a = stage_quality(&feed(), recovery, &table).unwrap();
        let b = stage_quality(&feed(), recovery, &table).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extreme_recovery_with_leaky_ion_is_non_physical() {
        let feed = IonComposition::new([("B", 5.0)]).unwrap();
        let result = stage_quality(&feed, Recovery::new(0.99).unwrap(), &RejectionTable::default());

        assert!(matches!(
            result,
            Err(InputError::NonPhysicalResult { .. })
        ));
    }

    #[test]
    fn estimate_scales_by_concentration_factor() {
        let estimate = estimate_reject(&feed(), Recovery::new(0.75).unwrap()).unwrap();
        assert_relative_eq!(estimate.get("Na"), 3200.0);
    }
}
