//! Curve storage keyed by identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::curves::{InstrumentCurve, RateCurve};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::properties::CurveProperties;
use crate::structure::PricingStructure;

/// Save and load finalized curves by unique identifier.
pub trait CurveStore: Send + Sync {
    /// Stores a curve under its identifier, replacing any previous one.
    fn save(&mut self, structure: PricingStructure) -> CurveResult<()>;

    /// Loads a curve.
    ///
    /// # Errors
    ///
    /// [`CurveError::CurveNotFound`] when nothing is stored under `id`.
    fn load(&self, id: &CurveIdentifier) -> CurveResult<PricingStructure>;

    /// True when a curve is stored under `id`.
    fn contains(&self, id: &CurveIdentifier) -> bool {
        self.load(id).is_ok()
    }
}

/// A [`CurveStore`] held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurveStore {
    curves: BTreeMap<CurveIdentifier, PricingStructure>,
}

impl InMemoryCurveStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Identifiers of the stored curves in order.
    pub fn ids(&self) -> impl Iterator<Item = &CurveIdentifier> {
        self.curves.keys()
    }

    /// Removes a curve.
    pub fn remove(&mut self, id: &CurveIdentifier) -> Option<PricingStructure> {
        self.curves.remove(id)
    }
}

impl CurveStore for InMemoryCurveStore {
    fn save(&mut self, structure: PricingStructure) -> CurveResult<()> {
        let id = structure.identifier().clone();
        debug!(curve = %id, "saving curve");
        self.curves.insert(id, structure);
        Ok(())
    }

    fn load(&self, id: &CurveIdentifier) -> CurveResult<PricingStructure> {
        self.curves
            .get(id)
            .cloned()
            .ok_or_else(|| CurveError::curve_not_found(id.to_string()))
    }

    fn contains(&self, id: &CurveIdentifier) -> bool {
        self.curves.contains_key(id)
    }
}

/// The rate curve named by `properties`' `ReferenceCurveUniqueId`.
///
/// # Errors
///
/// [`CurveError::MissingDependency`] when no reference is configured, or
/// the store has no curve under it, or the stored curve is not a
/// [`RateCurve`].
pub fn resolve_rate_curve(
    store: &dyn CurveStore,
    properties: &CurveProperties,
) -> CurveResult<Arc<RateCurve>> {
    let Some(id) = properties.reference_curve()? else {
        return Err(CurveError::missing_dependency(
            "ReferenceCurveUniqueId",
            "no base curve is configured",
        ));
    };
    let structure = store.load(&id).map_err(|err| match err {
        CurveError::CurveNotFound { .. } => {
            CurveError::missing_dependency(id.to_string(), "not in the curve store")
        }
        other => other,
    })?;
    structure.as_rate_curve().cloned().ok_or_else(|| {
        CurveError::missing_dependency(
            id.to_string(),
            format!("stored curve is a {}, not a RateCurve", structure.structure_type()),
        )
    })
}
