//! Instruments and curve owned by a single bootstrap call.

use std::sync::Arc;

use crate::error::{CurveError, CurveResult};
use crate::instruments::PriceableInstrument;
use crate::term_curve::TermCurve;

/// The input of one bootstrap: the instruments and the curve being built.
///
/// The curve may already hold pillars (an anchor at the base date, an FX
/// spot pillar, or externally supplied values); instruments are solved
/// around them. The set is moved into
/// [`NewtonBootstrapper::bootstrap`](super::NewtonBootstrapper::bootstrap)
/// and does not outlive it.
pub struct BootstrapWorkingSet {
    pub(crate) instruments: Vec<Arc<dyn PriceableInstrument>>,
    pub(crate) curve: TermCurve,
}

impl BootstrapWorkingSet {
    /// Creates a working set over an unfinalized curve.
    pub fn new(curve: TermCurve, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        if curve.is_finalized() {
            return Err(CurveError::Finalized {
                name: curve.metadata().name.clone(),
            });
        }
        Ok(Self { instruments, curve })
    }

    /// Number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// True when there are no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// The curve being built.
    #[must_use]
    pub fn curve(&self) -> &TermCurve {
        &self.curve
    }
}
