//! Volatility points and their coordinates.

use std::fmt;

use arbor_core::types::Period;
use serde::{Deserialize, Serialize};

/// Position of a volatility on the expiry × tenor × strike axes.
///
/// Any coordinate may be left unset; an axis that is unset on every point of
/// a structure is absent from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolCoordinate {
    /// Option expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Period>,
    /// Tenor of the underlying (swaptions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor: Option<Period>,
    /// Absolute strike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
}

impl VolCoordinate {
    /// An empty coordinate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expiry.
    #[must_use]
    pub fn with_expiry(mut self, expiry: Period) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the tenor.
    #[must_use]
    pub fn with_tenor(mut self, tenor: Period) -> Self {
        self.tenor = Some(tenor);
        self
    }

    /// Sets the strike.
    #[must_use]
    pub fn with_strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Expiry in years, if set.
    #[must_use]
    pub fn expiry_years(&self) -> Option<f64> {
        self.expiry.map(|p| p.year_fraction())
    }

    /// Tenor in years, if set.
    #[must_use]
    pub fn tenor_years(&self) -> Option<f64> {
        self.tenor.map(|p| p.year_fraction())
    }
}

impl fmt::Display for VolCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(e) = self.expiry {
            parts.push(format!("expiry={e}"));
        }
        if let Some(t) = self.tenor {
            parts.push(format!("tenor={t}"));
        }
        if let Some(k) = self.strike {
            parts.push(format!("strike={k}"));
        }
        write!(f, "({})", parts.join(", "))
    }
}

/// A single quoted volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    /// Where the volatility sits.
    #[serde(flatten)]
    pub coordinate: VolCoordinate,
    /// The volatility.
    pub volatility: f64,
}

impl VolatilityPoint {
    /// Creates a point.
    #[must_use]
    pub fn new(coordinate: VolCoordinate, volatility: f64) -> Self {
        Self {
            coordinate,
            volatility,
        }
    }

    /// A swaption-style point with all three coordinates set.
    #[must_use]
    pub fn swaption(expiry: Period, tenor: Period, strike: f64, volatility: f64) -> Self {
        Self::new(
            VolCoordinate::new()
                .with_expiry(expiry)
                .with_tenor(tenor)
                .with_strike(strike),
            volatility,
        )
    }

    /// An option-style point with expiry and strike set.
    #[must_use]
    pub fn option(expiry: Period, strike: f64, volatility: f64) -> Self {
        Self::new(
            VolCoordinate::new().with_expiry(expiry).with_strike(strike),
            volatility,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let p = VolatilityPoint::swaption(Period::years(1), Period::years(5), 0.03, 0.2);
        assert_eq!(p.coordinate.to_string(), "(expiry=1Y, tenor=5Y, strike=0.03)");
        assert_eq!(VolCoordinate::new().with_strike(0.5).to_string(), "(strike=0.5)");
    }

    #[test]
    fn test_serde_flattened_coordinate() {
        let p = VolatilityPoint::option(Period::months(6), 0.25, 0.31);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"expiry":"6M","strike":0.25,"volatility":0.31}"#);
        let back: VolatilityPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_year_fractions() {
        let c = VolCoordinate::new()
            .with_expiry(Period::months(6))
            .with_tenor(Period::years(2));
        assert_eq!(c.expiry_years(), Some(0.5));
        assert_eq!(c.tenor_years(), Some(2.0));
        assert_eq!(VolCoordinate::new().expiry_years(), None);
    }
}
