//! Curve documents: a pricing structure plus its valuation.
//!
//! ```json
//! {
//!   "pricingStructure": { "id": "Market.EOD.RateCurve.USD-SOFR", "properties": { ... } },
//!   "valuation": {
//!     "baseDate": "2024-01-15",
//!     "termPoints": [{ "date": "2024-01-15", "mid": 1.0 }, ...],
//!     "inputs": [{ "id": "USD-IRSwap-5Y", "quote": 0.04, "conventions": { "frequency": "Annual" } }, ...],
//!     "suppliedPoints": [{ "date": "2025-01-15", "mid": 0.955 }, ...],
//!     "discountFactors": [...],
//!     "zeroRates": [...]
//!   }
//! }
//! ```
//!
//! A document stripped of its discount factor and zero rate arrays rebuilds
//! to the same curve. Inputs are recreated through an
//! [`InstrumentFactory`] with the conventions they were exported with and
//! re-bootstrapped around any supplied pillars; a rate curve without inputs
//! is rebuilt from its term points. Basis, spread and cross-currency
//! documents resolve their base curve from a [`CurveStore`].

use std::sync::Arc;

use arbor_core::Date;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::curves::{InstrumentCurve, RateBasisCurve, RateCurve, RateSpreadCurve, XccySpreadCurve};
use crate::error::{CurveError, CurveResult};
use crate::factory::InstrumentFactory;
use crate::identifier::CurveIdentifier;
use crate::instruments::{InstrumentConventions, PriceableInstrument};
use crate::interpolation::AlgorithmRegistry;
use crate::properties::{CurveProperties, PricingStructureType};
use crate::store::{resolve_rate_curve, CurveStore};
use crate::structure::PricingStructure;
use crate::term_curve::CurvePoint;
use crate::traits::{Curve, DAYS_PER_YEAR};

/// A `(date, mid)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermPoint {
    /// Pillar date.
    pub date: Date,
    /// Mid value.
    pub mid: f64,
}

/// A quoted input instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedInput {
    /// Instrument identifier.
    pub id: String,
    /// Market quote.
    pub quote: f64,
    /// Conventions the identifier does not carry.
    #[serde(default, skip_serializing_if = "InstrumentConventions::is_empty")]
    pub conventions: InstrumentConventions,
}

/// Identity and configuration of the structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingStructureSection {
    /// Unique identifier.
    pub id: CurveIdentifier,
    /// Build configuration.
    pub properties: CurveProperties,
}

/// Values of the structure on its base date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    /// Base date.
    pub base_date: Date,
    /// The structure's own pillars.
    pub term_points: Vec<TermPoint>,
    /// Quoted inputs in pillar order.
    #[serde(default)]
    pub inputs: Vec<QuotedInput>,
    /// Externally supplied discount factor pillars of a rate curve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplied_points: Vec<TermPoint>,
    /// Discount factors at the pillars, for discounting structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_factors: Option<Vec<TermPoint>>,
    /// Zero rates at the pillars after the base date, under the
    /// configured compounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_rates: Option<Vec<TermPoint>>,
}

/// A serializable pricing structure and valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveDocument {
    /// Identity and configuration.
    pub pricing_structure: PricingStructureSection,
    /// Values.
    pub valuation: Valuation,
}

fn pillar_date(base: Date, point: &CurvePoint) -> Date {
    point
        .date
        .unwrap_or_else(|| base.add_days((point.time * DAYS_PER_YEAR).round() as i64))
}

impl CurveDocument {
    /// Exports a structure.
    pub fn from_structure(structure: &PricingStructure) -> CurveResult<Self> {
        let properties = structure.properties();
        let base = structure.reference_date();
        let pillars = structure.pillars()?;

        let term_points = pillars
            .iter()
            .map(|p| TermPoint {
                date: pillar_date(base, p),
                mid: p.value,
            })
            .collect();
        let inputs = structure
            .instruments()
            .iter()
            .map(|inst| QuotedInput {
                id: inst.id().to_string(),
                quote: inst.market_quote(),
                conventions: inst.conventions(),
            })
            .collect();
        let supplied_points = match structure {
            PricingStructure::Rate(curve) => curve
                .supplied_pillars()
                .iter()
                .map(|p| TermPoint {
                    date: pillar_date(base, p),
                    mid: p.value,
                })
                .collect(),
            _ => Vec::new(),
        };

        let (discount_factors, zero_rates) = if structure.discounts() {
            let mut dfs = Vec::with_capacity(pillars.len());
            let mut zeros = Vec::with_capacity(pillars.len());
            for p in &pillars {
                let date = pillar_date(base, p);
                let df = structure.discount_factor(p.time)?;
                dfs.push(TermPoint { date, mid: df });
                if p.time > 0.0 {
                    zeros.push(TermPoint {
                        date,
                        mid: properties.compounding_frequency.zero_rate(df, p.time),
                    });
                }
            }
            (Some(dfs), Some(zeros))
        } else {
            (None, None)
        };

        Ok(Self {
            pricing_structure: PricingStructureSection {
                id: structure.identifier().clone(),
                properties: properties.clone(),
            },
            valuation: Valuation {
                base_date: base,
                term_points,
                inputs,
                supplied_points,
                discount_factors,
                zero_rates,
            },
        })
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> CurveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a JSON document.
    pub fn from_json(input: &str) -> CurveResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Drops the discount factor and zero rate arrays.
    #[must_use]
    pub fn strip_values(mut self) -> Self {
        self.valuation.discount_factors = None;
        self.valuation.zero_rates = None;
        self
    }

    /// Rebuilds the rate curve the document describes.
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidConfig`] for documents of other families; use
    /// [`rebuild_from_store`](Self::rebuild_from_store) for those.
    pub fn rebuild(
        &self,
        factory: &dyn InstrumentFactory,
        registry: &AlgorithmRegistry,
    ) -> CurveResult<RateCurve> {
        let properties = self.properties_for(&[PricingStructureType::RateCurve])?;
        let instruments = self.instruments(factory, None)?;

        let curve = if instruments.is_empty() {
            RateCurve::from_pillars(properties, registry, points(&self.valuation.term_points))?
        } else if self.valuation.supplied_points.is_empty() {
            RateCurve::bootstrap(properties, instruments, registry)?
        } else {
            RateCurve::with_pillars(
                properties,
                registry,
                points(&self.valuation.supplied_points),
                instruments,
            )?
        };
        info!(
            curve = %curve.identifier(),
            inputs = self.valuation.inputs.len(),
            supplied = self.valuation.supplied_points.len(),
            "rebuilt from document"
        );
        Ok(curve)
    }

    /// Rebuilds a rate, basis, spread or cross-currency swap curve, resolving
    /// the base curve named by `ReferenceCurveUniqueId` from `store`.
    ///
    /// # Errors
    ///
    /// [`CurveError::MissingDependency`] when the base curve cannot be
    /// resolved, [`CurveError::InvalidConfig`] for other families and for
    /// FX-implied cross-currency curves, which have no inputs to re-solve.
    pub fn rebuild_from_store(
        &self,
        factory: &dyn InstrumentFactory,
        registry: &AlgorithmRegistry,
        store: &dyn CurveStore,
    ) -> CurveResult<PricingStructure> {
        let kind = self.pricing_structure.properties.pricing_structure_type;
        if kind == PricingStructureType::RateCurve {
            return Ok(self.rebuild(factory, registry)?.into());
        }
        let properties = self.properties_for(&[
            PricingStructureType::RateBasisCurve,
            PricingStructureType::RateSpreadCurve,
            PricingStructureType::XccySpreadCurve,
        ])?;
        if self.valuation.inputs.is_empty() {
            return Err(CurveError::invalid_config(
                "inputs",
                format!("{kind} document has no inputs to rebuild from"),
            ));
        }

        let base = resolve_rate_curve(store, &properties)?;
        let base_id = base.identifier().clone();
        let reference: Arc<dyn Curve> = base.clone();
        let instruments = self.instruments(factory, Some(&reference))?;
        let structure: PricingStructure = match kind {
            PricingStructureType::RateBasisCurve => {
                RateBasisCurve::bootstrap(properties, base, instruments)?.into()
            }
            PricingStructureType::RateSpreadCurve => {
                RateSpreadCurve::bootstrap(properties, base, instruments)?.into()
            }
            _ => XccySpreadCurve::bootstrap(properties, base, instruments)?.into(),
        };
        info!(
            curve = %self.pricing_structure.id,
            base = %base_id,
            inputs = self.valuation.inputs.len(),
            "rebuilt from document"
        );
        Ok(structure)
    }

    fn properties_for(&self, accepted: &[PricingStructureType]) -> CurveResult<CurveProperties> {
        let mut properties = self.pricing_structure.properties.clone();
        if !accepted.contains(&properties.pricing_structure_type) {
            return Err(CurveError::invalid_config(
                "PricingStructureType",
                format!("{} documents cannot be rebuilt here", properties.pricing_structure_type),
            ));
        }
        properties.base_date = Some(self.valuation.base_date);
        Ok(properties)
    }

    fn instruments(
        &self,
        factory: &dyn InstrumentFactory,
        reference: Option<&Arc<dyn Curve>>,
    ) -> CurveResult<Vec<Arc<dyn PriceableInstrument>>> {
        self.valuation
            .inputs
            .iter()
            .map(|input| {
                factory.create_with(
                    &input.id,
                    input.quote,
                    self.valuation.base_date,
                    &input.conventions,
                    reference,
                )
            })
            .collect()
    }
}

fn points(points: &[TermPoint]) -> Vec<(Date, f64)> {
    points.iter().map(|p| (p.date, p.mid)).collect()
}
