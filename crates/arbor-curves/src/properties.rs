//! Curve configuration.
//!
//! [`CurveProperties`] is the property bag that drives curve construction. It
//! can be read from TOML, or from a flat `BTreeMap<String, String>` using the
//! keys below. Unrecognized keys are kept in [`CurveProperties::extra`] and
//! written back out unchanged.
//!
//! | Key | Meaning | Default |
//! |-----|---------|---------|
//! | `PricingStructureType` | curve family | `RateCurve` |
//! | `Algorithm` | registry entry joining pillars | per family |
//! | `Currency`, `Currency1`, `Currency2` | curve / FX pair currencies | |
//! | `IndexName`, `IndexTenor` | projected index | |
//! | `Market`, `Function` | identifier components | `EOD`, `Market` |
//! | `BaseDate` | valuation date | required to build |
//! | `Tolerance` | bootstrap PV tolerance | `1e-10` |
//! | `MaxIterations` | Newton iteration cap | `100` |
//! | `OptimizeBuild` | merge duplicate maturities last-quote-wins | `false` |
//! | `ReferenceCurveUniqueId` | base curve of derived curves | |
//! | `CompoundingFrequency` | zero-rate reporting | `Continuous` |
//! | `CurveName` | explicit curve name | derived |
//! | `SpotLag` | FX spot lag in business days | by currency pair |
//! | `StepDates` | comma-separated gap-step decision dates | |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use arbor_core::types::{Compounding, Currency, Period};
use arbor_core::Date;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;

/// Curve families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PricingStructureType {
    /// Discount curve from deposits, FRAs and swaps.
    #[default]
    RateCurve,
    /// Projection curve of a second index over a base rate curve.
    RateBasisCurve,
    /// Curve quoted as spreads over a base rate curve.
    RateSpreadCurve,
    /// Cross-currency adjusted discount curve.
    XccySpreadCurve,
    /// FX outright forwards.
    FxCurve,
    /// Cross FX rates from two FX curves.
    FxDerivedCurve,
    /// Inflation index ratios.
    InflationCurve,
    /// Commodity forward prices.
    CommodityCurve,
}

impl PricingStructureType {
    /// All curve families.
    pub const ALL: [Self; 8] = [
        Self::RateCurve,
        Self::RateBasisCurve,
        Self::RateSpreadCurve,
        Self::XccySpreadCurve,
        Self::FxCurve,
        Self::FxDerivedCurve,
        Self::InflationCurve,
        Self::CommodityCurve,
    ];

    /// The name used in identifiers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RateCurve => "RateCurve",
            Self::RateBasisCurve => "RateBasisCurve",
            Self::RateSpreadCurve => "RateSpreadCurve",
            Self::XccySpreadCurve => "XccySpreadCurve",
            Self::FxCurve => "FxCurve",
            Self::FxDerivedCurve => "FxDerivedCurve",
            Self::InflationCurve => "InflationCurve",
            Self::CommodityCurve => "CommodityCurve",
        }
    }

    /// Algorithm used when none is configured.
    #[must_use]
    pub fn default_algorithm(&self) -> &'static str {
        match self {
            Self::RateCurve | Self::RateBasisCurve | Self::RateSpreadCurve | Self::XccySpreadCurve => {
                "LinearZero"
            }
            Self::FxCurve | Self::FxDerivedCurve | Self::InflationCurve | Self::CommodityCurve => {
                "LinearForward"
            }
        }
    }

    /// True for families built on two currencies.
    #[must_use]
    pub fn is_fx(&self) -> bool {
        matches!(self, Self::FxCurve | Self::FxDerivedCurve)
    }
}

impl fmt::Display for PricingStructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PricingStructureType {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CurveError::invalid_config(
                    "PricingStructureType",
                    format!("unknown pricing structure type '{s}'"),
                )
            })
    }
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> u32 {
    100
}

fn default_market() -> String {
    "EOD".to_string()
}

fn default_function() -> String {
    "Market".to_string()
}

/// Configuration of a single curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CurveProperties {
    /// Curve family.
    pub pricing_structure_type: PricingStructureType,

    /// Algorithm name; the family default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Curve currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,

    /// First currency of an FX pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency1: Option<Currency>,

    /// Second currency of an FX pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency2: Option<Currency>,

    /// Index name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Index tenor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_tenor: Option<Period>,

    /// Market name.
    #[serde(default = "default_market")]
    pub market: String,

    /// Identifier function.
    #[serde(default = "default_function")]
    pub function: String,

    /// Valuation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_date: Option<Date>,

    /// Bootstrap PV tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Newton iteration cap per pillar.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Merge duplicate maturities instead of rejecting them.
    pub optimize_build: bool,

    /// Identifier of the base curve for derived curves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_curve_unique_id: Option<String>,

    /// Compounding used when reporting zero rates.
    pub compounding_frequency: Compounding,

    /// Explicit curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve_name: Option<String>,

    /// FX spot lag in business days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_lag: Option<i32>,

    /// Gap-step decision dates.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub step_dates: Vec<Date>,

    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Default for CurveProperties {
    fn default() -> Self {
        Self {
            pricing_structure_type: PricingStructureType::default(),
            algorithm: None,
            currency: None,
            currency1: None,
            currency2: None,
            index_name: None,
            index_tenor: None,
            market: default_market(),
            function: default_function(),
            base_date: None,
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            optimize_build: false,
            reference_curve_unique_id: None,
            compounding_frequency: Compounding::default(),
            curve_name: None,
            spot_lag: None,
            step_dates: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

fn config_err(key: &str, value: &str, what: &str) -> CurveError {
    CurveError::invalid_config(key, format!("'{value}' is not {what}"))
}

impl CurveProperties {
    /// Creates properties for a curve family and base date.
    #[must_use]
    pub fn new(pricing_structure_type: PricingStructureType, base_date: Date) -> Self {
        Self {
            pricing_structure_type,
            base_date: Some(base_date),
            ..Self::default()
        }
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Sets the FX pair.
    #[must_use]
    pub fn with_currency_pair(mut self, currency1: Currency, currency2: Currency) -> Self {
        self.currency1 = Some(currency1);
        self.currency2 = Some(currency2);
        self
    }

    /// Sets the index name and tenor.
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, tenor: Option<Period>) -> Self {
        self.index_name = Some(name.into());
        self.index_tenor = tenor;
        self
    }

    /// Sets the algorithm name.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Sets the market.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    /// Sets the bootstrap tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enables last-quote-wins merging of duplicate maturities.
    #[must_use]
    pub fn with_optimize_build(mut self, optimize: bool) -> Self {
        self.optimize_build = optimize;
        self
    }

    /// Sets the base curve reference.
    #[must_use]
    pub fn with_reference_curve(mut self, id: &CurveIdentifier) -> Self {
        self.reference_curve_unique_id = Some(id.to_string());
        self
    }

    /// Sets the zero-rate reporting convention.
    #[must_use]
    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding_frequency = compounding;
        self
    }

    /// Sets the gap-step decision dates.
    #[must_use]
    pub fn with_step_dates(mut self, dates: Vec<Date>) -> Self {
        self.step_dates = dates;
        self
    }

    /// Sets the FX spot lag.
    #[must_use]
    pub fn with_spot_lag(mut self, lag: i32) -> Self {
        self.spot_lag = Some(lag);
        self
    }

    /// Parses TOML.
    pub fn from_toml(input: &str) -> CurveResult<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Builds properties from a flat string property bag.
    pub fn from_property_bag(bag: &BTreeMap<String, String>) -> CurveResult<Self> {
        let mut props = Self::default();
        for (key, value) in bag {
            props.set(key, value)?;
        }
        Ok(props)
    }

    /// Sets a single property by key. Unknown keys are stored in `extra`.
    pub fn set(&mut self, key: &str, value: &str) -> CurveResult<()> {
        let v = value.trim();
        let currency = |v: &str| {
            v.parse::<Currency>()
                .map_err(|_| config_err(key, v, "a currency code"))
        };
        match key {
            "PricingStructureType" => self.pricing_structure_type = v.parse()?,
            "Algorithm" => self.algorithm = Some(v.to_string()),
            "Currency" => self.currency = Some(currency(v)?),
            "Currency1" => self.currency1 = Some(currency(v)?),
            "Currency2" => self.currency2 = Some(currency(v)?),
            "IndexName" => self.index_name = Some(v.to_string()),
            "IndexTenor" => {
                self.index_tenor = Some(v.parse().map_err(|_| config_err(key, v, "a period"))?);
            }
            "Market" => self.market = v.to_string(),
            "Function" => self.function = v.to_string(),
            "BaseDate" => {
                self.base_date = Some(Date::parse(v).map_err(|_| config_err(key, v, "a date"))?);
            }
            "Tolerance" => {
                self.tolerance = v.parse().map_err(|_| config_err(key, v, "a number"))?;
            }
            "MaxIterations" => {
                self.max_iterations = v.parse().map_err(|_| config_err(key, v, "a count"))?;
            }
            "OptimizeBuild" => {
                self.optimize_build = match v.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => return Err(config_err(key, v, "a boolean")),
                };
            }
            "ReferenceCurveUniqueId" => self.reference_curve_unique_id = Some(v.to_string()),
            "CompoundingFrequency" => {
                self.compounding_frequency =
                    v.parse().map_err(|_| config_err(key, v, "a compounding frequency"))?;
            }
            "CurveName" => self.curve_name = Some(v.to_string()),
            "SpotLag" => {
                self.spot_lag = Some(v.parse().map_err(|_| config_err(key, v, "a day count"))?);
            }
            "StepDates" => {
                self.step_dates = v
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Date::parse(s).map_err(|_| config_err(key, s, "a date")))
                    .collect::<CurveResult<_>>()?;
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Flattens the properties back into a string property bag.
    #[must_use]
    pub fn to_property_bag(&self) -> BTreeMap<String, String> {
        let mut bag = self.extra.clone();
        let mut put = |k: &str, v: String| {
            bag.insert(k.to_string(), v);
        };
        put("PricingStructureType", self.pricing_structure_type.to_string());
        put("Market", self.market.clone());
        put("Function", self.function.clone());
        put("Tolerance", self.tolerance.to_string());
        put("MaxIterations", self.max_iterations.to_string());
        put("OptimizeBuild", self.optimize_build.to_string());
        put("CompoundingFrequency", self.compounding_frequency.to_string());
        if let Some(v) = &self.algorithm {
            put("Algorithm", v.clone());
        }
        if let Some(v) = self.currency {
            put("Currency", v.to_string());
        }
        if let Some(v) = self.currency1 {
            put("Currency1", v.to_string());
        }
        if let Some(v) = self.currency2 {
            put("Currency2", v.to_string());
        }
        if let Some(v) = &self.index_name {
            put("IndexName", v.clone());
        }
        if let Some(v) = self.index_tenor {
            put("IndexTenor", v.to_string());
        }
        if let Some(v) = self.base_date {
            put("BaseDate", v.to_string());
        }
        if let Some(v) = &self.reference_curve_unique_id {
            put("ReferenceCurveUniqueId", v.clone());
        }
        if let Some(v) = &self.curve_name {
            put("CurveName", v.clone());
        }
        if let Some(v) = self.spot_lag {
            put("SpotLag", v.to_string());
        }
        if !self.step_dates.is_empty() {
            let dates: Vec<String> = self.step_dates.iter().map(ToString::to_string).collect();
            put("StepDates", dates.join(","));
        }
        bag
    }

    /// The configured or family-default algorithm name.
    #[must_use]
    pub fn algorithm_name(&self) -> &str {
        self.algorithm
            .as_deref()
            .unwrap_or_else(|| self.pricing_structure_type.default_algorithm())
    }

    /// The base date, which every build requires.
    pub fn require_base_date(&self) -> CurveResult<Date> {
        self.base_date
            .ok_or_else(|| CurveError::invalid_config("BaseDate", "missing"))
    }

    /// The curve currency.
    pub fn require_currency(&self) -> CurveResult<Currency> {
        self.currency
            .ok_or_else(|| CurveError::invalid_config("Currency", "missing"))
    }

    /// The FX pair.
    pub fn require_currency_pair(&self) -> CurveResult<(Currency, Currency)> {
        match (self.currency1, self.currency2) {
            (Some(c1), Some(c2)) if c1 != c2 => Ok((c1, c2)),
            (Some(c), Some(_)) => Err(CurveError::invalid_config(
                "Currency2",
                format!("pair needs two different currencies, got {c}/{c}"),
            )),
            _ => Err(CurveError::invalid_config("Currency1", "FX pair is incomplete")),
        }
    }

    /// The curve name: explicit, or derived from currency, index and tenor.
    ///
    /// Rate-type curves are named `<Currency>-<Index>[-<Tenor>]`, FX curves
    /// `<Currency1>-<Currency2>`.
    pub fn curve_name(&self) -> CurveResult<String> {
        if let Some(name) = &self.curve_name {
            return Ok(name.clone());
        }
        if self.pricing_structure_type.is_fx() {
            let (c1, c2) = self.require_currency_pair()?;
            return Ok(format!("{c1}-{c2}"));
        }
        let currency = self.require_currency()?;
        let mut name = currency.to_string();
        if let Some(index) = &self.index_name {
            name.push('-');
            name.push_str(index);
        }
        if let Some(tenor) = self.index_tenor {
            name.push('-');
            name.push_str(&tenor.to_string());
        }
        Ok(name)
    }

    /// The curve's unique identifier.
    pub fn identifier(&self) -> CurveResult<CurveIdentifier> {
        Ok(CurveIdentifier::new(
            self.function.clone(),
            self.market.clone(),
            self.pricing_structure_type,
            self.curve_name()?,
        ))
    }

    /// The parsed base curve reference, if any.
    pub fn reference_curve(&self) -> CurveResult<Option<CurveIdentifier>> {
        self.reference_curve_unique_id
            .as_deref()
            .map(str::parse)
            .transpose()
    }
}
