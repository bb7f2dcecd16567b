//! Repricing checks for bootstrapped curves.
//!
//! A bootstrapped curve must reprice every instrument it was built from:
//! each instrument's present value off the finalized curve is within the
//! curve's `Tolerance`. [`RepricingReport`] records the per-instrument
//! residuals; curves log it after every build and tests assert on it.

use std::fmt;
use std::sync::Arc;

use crate::error::CurveResult;
use crate::instruments::{InstrumentKind, PriceableInstrument};
use crate::traits::Curve;

/// Result of repricing a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingCheck {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Instrument type.
    pub kind: InstrumentKind,
    /// The market quote the instrument carries.
    pub quote: f64,
    /// PV off the curve; zero for a perfect fit.
    pub pv: f64,
    /// Tolerance the check was run with.
    pub tolerance: f64,
    /// Whether `|pv| <= tolerance`.
    pub passed: bool,
}

impl RepricingCheck {
    /// Prices `instrument` off `curve`.
    pub fn run(
        instrument: &dyn PriceableInstrument,
        curve: &dyn Curve,
        tolerance: f64,
    ) -> CurveResult<Self> {
        let pv = instrument.present_value(curve)?;
        Ok(Self {
            instrument_id: instrument.id().to_string(),
            kind: instrument.kind(),
            quote: instrument.market_quote(),
            pv,
            tolerance,
            passed: pv.abs() <= tolerance,
        })
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "ok" } else { "FAIL" };
        write!(
            f,
            "{status:>4} {} ({}) | quote {:.6} | PV {:.2e} (tol {:.2e})",
            self.instrument_id, self.kind, self.quote, self.pv, self.tolerance
        )
    }
}

/// Per-instrument residuals of a finalized curve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
}

impl RepricingReport {
    /// Creates a report from individual checks.
    #[must_use]
    pub fn new(checks: Vec<RepricingCheck>) -> Self {
        Self { checks }
    }

    /// Reprices every instrument off `curve`.
    pub fn build(
        instruments: &[Arc<dyn PriceableInstrument>],
        curve: &dyn Curve,
        tolerance: f64,
    ) -> CurveResult<Self> {
        let checks = instruments
            .iter()
            .map(|inst| RepricingCheck::run(inst.as_ref(), curve, tolerance))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(Self::new(checks))
    }

    /// The individual checks in pillar order.
    #[must_use]
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// Largest absolute PV.
    #[must_use]
    pub fn max_abs_residual(&self) -> f64 {
        self.checks.iter().map(|c| c.pv.abs()).fold(0.0, f64::max)
    }

    /// True when every instrument repriced within tolerance.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Checks that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&RepricingCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Number of instruments checked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when there were no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Repricing: {}/{} passed, max |PV| {:.2e}",
            self.checks.iter().filter(|c| c.passed).count(),
            self.checks.len(),
            self.max_abs_residual()
        )?;
        for check in &self.checks {
            writeln!(f, "  {check}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{date, FlatRateCurve};
    use crate::instruments::Deposit;

    #[test]
    fn test_report_flags_mispriced_instrument() {
        let curve = FlatRateCurve {
            date: date(2024, 1, 15),
            rate: 0.05,
        };
        let tau = 91.0 / 360.0;
        let fair = ((0.05_f64 * 91.0 / 365.0).exp() - 1.0) / tau;
        let instruments: Vec<Arc<dyn PriceableInstrument>> = vec![
            Arc::new(Deposit::new("FAIR", date(2024, 1, 15), date(2024, 4, 15), fair).unwrap()),
            Arc::new(Deposit::new("OFF", date(2024, 1, 15), date(2024, 4, 15), 0.06).unwrap()),
        ];
        let report = RepricingReport::build(&instruments, &curve, 1e-10).unwrap();
        assert_eq!(report.len(), 2);
        assert!(!report.all_passed());
        let failed: Vec<&str> = report
            .failed()
            .iter()
            .map(|c| c.instrument_id.as_str())
            .collect();
        assert_eq!(failed, vec!["OFF"]);
        assert!(report.max_abs_residual() > 1e-4);
        assert!(report.to_string().contains("FAIL OFF"));
    }

    #[test]
    fn test_empty_report_passes() {
        let report = RepricingReport::default();
        assert!(report.is_empty());
        assert!(report.all_passed());
        assert_eq!(report.max_abs_residual(), 0.0);
    }
}
