//! Sequential pillar solve.

use std::sync::Arc;

use arbor_math::solvers::{newton_bumped, BumpedNewton, SolverConfig};
use arbor_math::MathError;
use tracing::{debug, info, warn};

use super::{BootstrapFrame, BootstrapWorkingSet, DuplicatePolicy};
use crate::error::{CurveError, CurveResult};
use crate::instruments::PriceableInstrument;
use crate::properties::CurveProperties;
use crate::term_curve::{CurvePoint, TermCurve};
use crate::traits::time_between;

/// Result of a bootstrap.
pub struct BootstrapOutput {
    /// The finalized curve.
    pub curve: TermCurve,
    /// The instruments in pillar order, after duplicate resolution.
    pub instruments: Vec<Arc<dyn PriceableInstrument>>,
    /// Newton iterations spent per instrument (0 for closed-form pillars).
    pub iterations: Vec<u32>,
}

/// Solves one pillar per instrument with bumped Newton-Raphson.
///
/// # Algorithm
///
/// 1. Sort instruments by maturity (stable) and resolve duplicates per
///    [`DuplicatePolicy`].
/// 2. For each instrument with maturity `t`:
///    - after the last pillar: append a trial pillar carrying the previous
///      pillar's value and move it until `|PV| <= tolerance`;
///    - before the first supplied pillar: insert its closed-form value;
///    - anywhere else: ordering error.
/// 3. Finalize.
///
/// Running out of iterations is a hard [`CurveError::NonConvergence`];
/// no partially converged curve is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonBootstrapper {
    /// Absolute PV tolerance.
    pub tolerance: f64,
    /// Iteration cap per pillar.
    pub max_iterations: u32,
    /// Relative bump for the numerical derivative.
    pub bump: f64,
    /// Handling of instruments sharing a maturity.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for NewtonBootstrapper {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            bump: 1e-8,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

impl NewtonBootstrapper {
    /// Creates a bootstrapper with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings taken from curve properties.
    #[must_use]
    pub fn from_properties(properties: &CurveProperties) -> Self {
        Self::default()
            .with_tolerance(properties.tolerance)
            .with_max_iterations(properties.max_iterations)
            .with_duplicate_policy(DuplicatePolicy::from_optimize_build(
                properties.optimize_build,
            ))
    }

    /// Sets the PV tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the duplicate-maturity policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Builds the curve in `working` against `frame`.
    pub fn bootstrap(
        &self,
        working: BootstrapWorkingSet,
        frame: &dyn BootstrapFrame,
    ) -> CurveResult<BootstrapOutput> {
        let BootstrapWorkingSet {
            instruments,
            mut curve,
        } = working;
        let base = curve.base_date();
        let instruments = self.order(instruments)?;
        let first_supplied = curve.points().first().map(|p| p.time);
        let mut iterations = Vec::with_capacity(instruments.len());

        for inst in &instruments {
            let maturity = inst.risk_maturity_date();
            let t = time_between(base, maturity);
            if t < 0.0 {
                return Err(CurveError::ordering(format!(
                    "{} matures on {maturity}, before the base date {base}",
                    inst.id()
                )));
            }
            let point = CurvePoint::at_date(base, maturity, 0.0).with_instrument(inst.id());

            let last = curve.points().last().map(|p| (p.time, p.value));
            let spent = match last {
                Some((last_time, guess)) if t > last_time => {
                    self.solve_pillar(&mut curve, inst.as_ref(), frame, point, guess)?
                }
                Some(_) if first_supplied.is_some_and(|first| t < first) => {
                    Self::closed_form_pillar(&mut curve, inst.as_ref(), frame, point, t)?;
                    0
                }
                Some((last_time, _)) => {
                    return Err(CurveError::ordering(format!(
                        "{} at t={t:.6} does not follow the last pillar at t={last_time:.6}",
                        inst.id()
                    )));
                }
                None => {
                    Self::closed_form_pillar(&mut curve, inst.as_ref(), frame, point, t)?;
                    0
                }
            };
            iterations.push(spent);
        }

        curve.finalize()?;
        info!(
            curve = %curve.metadata().name,
            pillars = curve.len(),
            instruments = instruments.len(),
            "bootstrap complete"
        );
        Ok(BootstrapOutput {
            curve,
            instruments,
            iterations,
        })
    }

    fn order(
        &self,
        mut instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Vec<Arc<dyn PriceableInstrument>>> {
        instruments.sort_by_key(|inst| inst.risk_maturity_date());
        let mut kept: Vec<Arc<dyn PriceableInstrument>> = Vec::with_capacity(instruments.len());
        for inst in instruments {
            match kept.last_mut() {
                Some(prev) if prev.risk_maturity_date() == inst.risk_maturity_date() => {
                    match self.duplicate_policy {
                        DuplicatePolicy::Reject => {
                            return Err(CurveError::ordering(format!(
                                "{} and {} share maturity {}",
                                prev.id(),
                                inst.id(),
                                inst.risk_maturity_date()
                            )));
                        }
                        DuplicatePolicy::LastQuoteWins => {
                            warn!(
                                dropped = prev.id(),
                                kept = inst.id(),
                                maturity = %inst.risk_maturity_date(),
                                "duplicate maturity"
                            );
                            *prev = inst;
                        }
                    }
                }
                _ => kept.push(inst),
            }
        }
        Ok(kept)
    }

    fn closed_form_pillar(
        curve: &mut TermCurve,
        inst: &dyn PriceableInstrument,
        frame: &dyn BootstrapFrame,
        mut point: CurvePoint,
        t: f64,
    ) -> CurveResult<()> {
        let Some(value) = frame.closed_form(inst, curve, t)? else {
            return Err(CurveError::ordering(format!(
                "{} precedes the first pillar and has no closed form",
                inst.id()
            )));
        };
        point.value = value;
        curve.insert_point(point)?;
        debug!(instrument = inst.id(), t, value, "closed-form pillar");
        Ok(())
    }

    fn solve_pillar(
        &self,
        curve: &mut TermCurve,
        inst: &dyn PriceableInstrument,
        frame: &dyn BootstrapFrame,
        mut point: CurvePoint,
        guess: f64,
    ) -> CurveResult<u32> {
        point.value = guess;
        curve.add_point(point)?;

        let mut settings = BumpedNewton::default().with_bump(self.bump);
        settings.floor = curve.kind().floor();
        let config = SolverConfig::new(self.tolerance, self.max_iterations);

        let mut evaluations = 0_u32;
        let mut last_residual = f64::NAN;
        let solved = newton_bumped(
            |x| {
                evaluations += 1;
                curve.set_last_value(x)?;
                let pv = frame.present_value(inst, curve)?;
                last_residual = pv;
                Ok::<f64, CurveError>(pv)
            },
            guess,
            &settings,
            &config,
        );

        let result = match solved {
            Ok(result) => result,
            Err(CurveError::Math(MathError::ConvergenceFailed {
                iterations,
                residual,
            })) => {
                return Err(CurveError::non_convergence(inst.id(), iterations, residual));
            }
            Err(CurveError::Math(MathError::DivisionByZero { .. } | MathError::InvalidInput { .. })) => {
                return Err(CurveError::non_convergence(
                    inst.id(),
                    evaluations,
                    last_residual.abs(),
                ));
            }
            Err(other) => return Err(other),
        };

        curve.set_last_value(result.root)?;
        debug!(
            instrument = inst.id(),
            t = curve.points().last().map_or(f64::NAN, |p| p.time),
            value = result.root,
            iterations = result.iterations,
            residual = result.residual,
            "pillar solved"
        );
        Ok(result.iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{DirectFrame, SpreadFrame};
    use crate::instruments::test_support::{date, FlatRateCurve};
    use crate::instruments::{Deposit, SpreadDeposit, Swap};
    use crate::interpolation::AlgorithmRegistry;
    use crate::term_curve::CurveValueKind;
    use crate::traits::Curve;
    use approx::assert_relative_eq;
    use arbor_core::types::Frequency;

    fn anchored(kind: CurveValueKind, anchor: f64) -> TermCurve {
        let alg = if kind == CurveValueKind::Spread {
            crate::interpolation::Algorithm::spread()
        } else {
            AlgorithmRegistry::standard().get("LinearZero").unwrap()
        };
        let mut curve = TermCurve::new(date(2024, 1, 15), kind)
            .with_algorithm(alg)
            .unwrap();
        curve.add_point(CurvePoint::at_time(0.0, anchor)).unwrap();
        curve
    }

    fn deposit(id: &str, end: (i32, u32, u32), rate: f64) -> Arc<dyn PriceableInstrument> {
        Arc::new(Deposit::new(id, date(2024, 1, 15), date(end.0, end.1, end.2), rate).unwrap())
    }

    #[test]
    fn test_reprices_deposits_and_swaps() {
        let instruments: Vec<Arc<dyn PriceableInstrument>> = vec![
            Arc::new(
                Swap::new("SW2Y", date(2024, 1, 15), date(2026, 1, 15), 0.045, Frequency::SemiAnnual)
                    .unwrap(),
            ),
            deposit("D6M", (2024, 7, 15), 0.05),
            deposit("D3M", (2024, 4, 15), 0.051),
        ];
        let working = BootstrapWorkingSet::new(
            anchored(CurveValueKind::DiscountFactor, 1.0),
            instruments,
        )
        .unwrap();
        let out = NewtonBootstrapper::new().bootstrap(working, &DirectFrame).unwrap();

        let ids: Vec<&str> = out.instruments.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["D3M", "D6M", "SW2Y"]);
        assert_eq!(out.curve.len(), 4);
        assert!(out.curve.is_finalized());
        for inst in &out.instruments {
            assert!(inst.present_value(&out.curve).unwrap().abs() <= 1e-10);
        }
        let d3m = 1.0 / (1.0 + 0.051 * 91.0 / 360.0);
        assert_relative_eq!(out.curve.points()[1].value, d3m, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_maturity_rejected() {
        let working = BootstrapWorkingSet::new(
            anchored(CurveValueKind::DiscountFactor, 1.0),
            vec![deposit("A", (2024, 4, 15), 0.05), deposit("B", (2024, 4, 15), 0.06)],
        )
        .unwrap();
        let err = NewtonBootstrapper::new()
            .bootstrap(working, &DirectFrame)
            .err()
            .unwrap();
        assert!(matches!(err, CurveError::Ordering { .. }));
    }

    #[test]
    fn test_duplicate_last_quote_wins() {
        let working = BootstrapWorkingSet::new(
            anchored(CurveValueKind::DiscountFactor, 1.0),
            vec![deposit("A", (2024, 4, 15), 0.05), deposit("B", (2024, 4, 15), 0.06)],
        )
        .unwrap();
        let out = NewtonBootstrapper::new()
            .with_duplicate_policy(DuplicatePolicy::LastQuoteWins)
            .bootstrap(working, &DirectFrame)
            .unwrap();
        assert_eq!(out.instruments.len(), 1);
        assert_eq!(out.instruments[0].id(), "B");
        assert_eq!(out.curve.points()[1].instrument_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_iteration_cap_is_non_convergence() {
        let working = BootstrapWorkingSet::new(
            anchored(CurveValueKind::DiscountFactor, 1.0),
            vec![deposit("D3M", (2024, 4, 15), 0.05)],
        )
        .unwrap();
        let err = NewtonBootstrapper::new()
            .with_max_iterations(0)
            .bootstrap(working, &DirectFrame)
            .err()
            .unwrap();
        match err {
            CurveError::NonConvergence {
                instrument,
                iterations,
                residual,
            } => {
                assert_eq!(instrument, "D3M");
                assert_eq!(iterations, 0);
                assert!(residual > 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_instrument_before_first_pillar_uses_closed_form() {
        let mut curve = TermCurve::new(date(2024, 1, 15), CurveValueKind::DiscountFactor)
            .with_algorithm(AlgorithmRegistry::standard().get("LogLinearDiscount").unwrap())
            .unwrap();
        curve
            .add_point(CurvePoint::at_date(date(2024, 1, 15), date(2024, 7, 15), 0.975))
            .unwrap();
        let working =
            BootstrapWorkingSet::new(curve, vec![deposit("D3M", (2024, 4, 15), 0.05)]).unwrap();
        let out = NewtonBootstrapper::new().bootstrap(working, &DirectFrame).unwrap();
        assert_eq!(out.iterations, vec![0]);
        assert_relative_eq!(
            out.curve.points()[0].value,
            1.0 / (1.0 + 0.05 * 91.0 / 360.0),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_spread_frame_solves_spreads() {
        let base: Arc<dyn Curve> = Arc::new(FlatRateCurve {
            date: date(2024, 1, 15),
            rate: 0.04,
        });
        let inst: Arc<dyn PriceableInstrument> = Arc::new(
            SpreadDeposit::new(
                "S6M",
                date(2024, 1, 15),
                date(2024, 7, 15),
                0.002,
                Arc::clone(&base),
            )
            .unwrap(),
        );
        let working =
            BootstrapWorkingSet::new(anchored(CurveValueKind::Spread, 0.0), vec![inst]).unwrap();
        let frame = SpreadFrame::new(Arc::clone(&base));
        let out = NewtonBootstrapper::new().bootstrap(working, &frame).unwrap();
        let spread = out.curve.points()[1].value;
        assert!(spread > 0.0 && spread < 0.01);
        let pv = frame
            .present_value(out.instruments[0].as_ref(), &out.curve)
            .unwrap();
        assert!(pv.abs() <= 1e-10);
    }
}
