//! Curve identity: `<Function>.<Market>.<PricingStructureType>.<CurveName>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::properties::PricingStructureType;

/// Unique identifier of a pricing structure.
///
/// ```rust
/// use arbor_curves::identifier::CurveIdentifier;
///
/// let id: CurveIdentifier = "Market.EOD.RateCurve.USD-SOFR-3M".parse().unwrap();
/// assert_eq!(id.curve_name, "USD-SOFR-3M");
/// assert_eq!(id.to_string(), "Market.EOD.RateCurve.USD-SOFR-3M");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurveIdentifier {
    /// Function, e.g. `Market`.
    pub function: String,
    /// Market name.
    pub market: String,
    /// Structure type.
    pub pricing_structure_type: PricingStructureType,
    /// Curve name.
    pub curve_name: String,
}

impl CurveIdentifier {
    /// Creates an identifier.
    #[must_use]
    pub fn new(
        function: impl Into<String>,
        market: impl Into<String>,
        pricing_structure_type: PricingStructureType,
        curve_name: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            market: market.into(),
            pricing_structure_type,
            curve_name: curve_name.into(),
        }
    }
}

impl fmt::Display for CurveIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.function, self.market, self.pricing_structure_type, self.curve_name
        )
    }
}

impl FromStr for CurveIdentifier {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().splitn(4, '.').collect();
        let [function, market, kind, name] = parts.as_slice() else {
            return Err(CurveError::invalid_config(
                "ReferenceCurveUniqueId",
                format!("'{s}' is not <Function>.<Market>.<Type>.<Name>"),
            ));
        };
        if [function, market, name].iter().any(|p| p.is_empty()) {
            return Err(CurveError::invalid_config(
                "ReferenceCurveUniqueId",
                format!("'{s}' has an empty component"),
            ));
        }
        Ok(Self::new(*function, *market, kind.parse()?, *name))
    }
}

impl TryFrom<String> for CurveIdentifier {
    type Error = CurveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurveIdentifier> for String {
    fn from(id: CurveIdentifier) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_dotted_name() {
        let id: CurveIdentifier = "Market.EOD.FxCurve.EUR-USD.v2".parse().unwrap();
        assert_eq!(id.pricing_structure_type, PricingStructureType::FxCurve);
        assert_eq!(id.curve_name, "EUR-USD.v2");
        assert_eq!(id.to_string(), "Market.EOD.FxCurve.EUR-USD.v2");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("Market.EOD.RateCurve".parse::<CurveIdentifier>().is_err());
        assert!("Market..RateCurve.USD".parse::<CurveIdentifier>().is_err());
        assert!("Market.EOD.Bogus.USD".parse::<CurveIdentifier>().is_err());
    }
}
