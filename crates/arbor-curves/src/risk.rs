//! Bumped-curve scenarios, one per input instrument.
//!
//! [`CurveRiskSet::build`] re-quotes each instrument of a finalized curve
//! in turn and rebuilds the curve; the original is never touched. With the
//! `parallel` feature the rebuilds run on the rayon pool and produce the
//! same scenarios in the same order.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::curves::InstrumentCurve;
use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;

/// A curve rebuilt with one instrument's quote bumped.
#[derive(Debug, Clone)]
pub struct CurveScenario<C> {
    /// The bumped instrument.
    pub instrument_id: String,
    /// The quote bump.
    pub bump: f64,
    /// The rebuilt curve.
    pub curve: C,
}

/// One bumped curve per instrument, in pillar order.
#[derive(Debug, Clone)]
pub struct CurveRiskSet<C> {
    scenarios: Vec<CurveScenario<C>>,
}

impl<C> CurveRiskSet<C>
where
    C: InstrumentCurve + Send + Sync,
{
    /// Bumps every instrument of `curve` by `bump` and rebuilds.
    pub fn build(curve: &C, bump: f64) -> CurveResult<Self> {
        let instruments = curve.instruments();
        let rebuild = |index: usize| -> CurveResult<CurveScenario<C>> {
            let bumped = bumped_set(instruments, index, bump);
            let rebuilt = curve.rebuild_with(bumped)?;
            debug!(
                curve = %curve.identifier(),
                instrument = instruments[index].id(),
                bump,
                "risk scenario built"
            );
            Ok(CurveScenario {
                instrument_id: instruments[index].id().to_string(),
                bump,
                curve: rebuilt,
            })
        };

        #[cfg(feature = "parallel")]
        let scenarios = (0..instruments.len())
            .into_par_iter()
            .map(rebuild)
            .collect::<CurveResult<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let scenarios = (0..instruments.len())
            .map(rebuild)
            .collect::<CurveResult<Vec<_>>>()?;

        Ok(Self { scenarios })
    }

    /// Finite-difference sensitivity of `measure` to each instrument:
    /// `(measure(bumped) - measure(base)) / bump`.
    pub fn sensitivities<F>(&self, base: &C, measure: F) -> CurveResult<Vec<(String, f64)>>
    where
        F: Fn(&C) -> CurveResult<f64>,
    {
        let reference = measure(base)?;
        self.scenarios
            .iter()
            .map(|s| {
                Ok((
                    s.instrument_id.clone(),
                    (measure(&s.curve)? - reference) / s.bump,
                ))
            })
            .collect()
    }
}

impl<C> CurveRiskSet<C> {
    /// The scenarios in pillar order.
    #[must_use]
    pub fn scenarios(&self) -> &[CurveScenario<C>] {
        &self.scenarios
    }

    /// The scenario that bumped `instrument_id`.
    #[must_use]
    pub fn get(&self, instrument_id: &str) -> Option<&CurveScenario<C>> {
        self.scenarios.iter().find(|s| s.instrument_id == instrument_id)
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// True when the curve had no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl<C> IntoIterator for CurveRiskSet<C> {
    type Item = CurveScenario<C>;
    type IntoIter = std::vec::IntoIter<CurveScenario<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.into_iter()
    }
}

fn bumped_set(
    instruments: &[Arc<dyn PriceableInstrument>],
    index: usize,
    bump: f64,
) -> Vec<Arc<dyn PriceableInstrument>> {
    instruments
        .iter()
        .enumerate()
        .map(|(i, inst)| {
            if i == index {
                inst.with_quote(inst.market_quote() + bump)
            } else {
                Arc::clone(inst)
            }
        })
        .collect()
}
