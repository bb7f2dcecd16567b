//! Bumped-curve risk scenarios.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use arbor_core::prelude::*;
use arbor_curves::prelude::*;

use common::*;

const BUMP: f64 = 1e-4;

#[test]
fn one_scenario_per_instrument_in_pillar_order() {
    let curve = usd_curve();
    let risk = CurveRiskSet::build(curve.as_ref(), BUMP).unwrap();
    assert_eq!(risk.len(), curve.instruments().len());
    let ids: Vec<&str> = risk.scenarios().iter().map(|s| s.instrument_id.as_str()).collect();
    let expected: Vec<&str> = curve.instruments().iter().map(|i| i.id()).collect();
    assert_eq!(ids, expected);
    assert!(risk.scenarios().iter().all(|s| s.bump == BUMP));
}

#[test]
fn scenarios_leave_the_original_untouched() {
    let curve = usd_curve();
    let before: Vec<f64> = curve.term_curve().points().iter().map(|p| p.value).collect();
    let quotes: Vec<f64> = curve.instruments().iter().map(|i| i.market_quote()).collect();

    let risk = CurveRiskSet::build(curve.as_ref(), BUMP).unwrap();

    let after: Vec<f64> = curve.term_curve().points().iter().map(|p| p.value).collect();
    assert_eq!(before, after);
    let quotes_after: Vec<f64> = curve.instruments().iter().map(|i| i.market_quote()).collect();
    assert_eq!(quotes, quotes_after);

    let scenario = risk.get("USD-IRSwap-5Y").unwrap();
    let bumped: Vec<f64> = scenario.curve.instruments().iter().map(|i| i.market_quote()).collect();
    for ((id, q), b) in expected_ids(&curve).iter().zip(&quotes).zip(&bumped) {
        if id == "USD-IRSwap-5Y" {
            assert_relative_eq!(*b, q + BUMP, epsilon = 1e-15);
        } else {
            assert_eq!(b, q);
        }
    }
    assert_reprices(&scenario.curve);
}

fn expected_ids(curve: &RateCurve) -> Vec<String> {
    curve.instruments().iter().map(|i| i.id().to_string()).collect()
}

#[test]
fn bump_moves_only_later_pillars() {
    let curve = usd_curve();
    let risk = CurveRiskSet::build(curve.as_ref(), BUMP).unwrap();
    let scenario = risk.get("USD-IRSwap-2Y").unwrap();
    let two_years = curve.year_fraction(base_date().add_years(2).unwrap());

    for (orig, bumped) in curve
        .term_curve()
        .points()
        .iter()
        .zip(scenario.curve.term_curve().points())
    {
        if orig.time < two_years {
            assert_eq!(orig.value, bumped.value);
        } else if (orig.time - two_years).abs() < 1e-12 {
            // higher swap rate, lower discount factor
            assert!(bumped.value < orig.value);
        }
    }
}

#[test]
fn sensitivities_of_a_discount_factor() {
    let curve = usd_curve();
    let risk = CurveRiskSet::build(curve.as_ref(), BUMP).unwrap();
    let t = 3.0;
    let sens = risk.sensitivities(curve.as_ref(), |c| c.discount_factor(t)).unwrap();
    assert_eq!(sens.len(), risk.len());

    let by_id = |id: &str| sens.iter().find(|(i, _)| i == id).map(|(_, v)| *v).unwrap();
    // a 3Y DF interpolates between the 2Y and 5Y pillars
    assert!(by_id("USD-IRSwap-2Y") != 0.0);
    assert!(by_id("USD-IRSwap-5Y") < 0.0);
    assert_eq!(by_id("USD-IRSwap-10Y"), 0.0);
}

#[test]
fn risk_over_a_spread_curve() {
    let base = usd_curve();
    let base_dyn: Arc<dyn Curve> = base.clone();
    let b = base_date();
    let instruments: Vec<Arc<dyn PriceableInstrument>> = vec![
        Arc::new(SpreadDeposit::new("S-6M", b, date(2024, 7, 15), 0.001, base_dyn.clone()).unwrap()),
        Arc::new(SpreadDeposit::new("S-1Y", b, date(2025, 1, 15), 0.0015, base_dyn).unwrap()),
    ];
    let props = CurveProperties::new(PricingStructureType::RateSpreadCurve, b)
        .with_currency(Currency::USD)
        .with_index("CORP-BBB", None);
    let curve = RateSpreadCurve::bootstrap(props, base.clone(), instruments).unwrap();
    let risk = CurveRiskSet::build(&curve, BUMP).unwrap();
    assert_eq!(risk.len(), 2);
    for scenario in risk {
        assert!(Arc::ptr_eq(scenario.curve.base(), &base));
        assert_reprices(&scenario.curve);
    }
}

#[test]
fn fx_scenarios_roll_pre_spot_outrights_from_current_quotes() {
    const SPOT: f64 = 1.0850;
    let (on, tn, one_month) = (0.000_02, 0.000_03, 0.0012);
    let props = CurveProperties::new(PricingStructureType::FxCurve, base_date())
        .with_currency_pair(Currency::EUR, Currency::USD);
    let curve = FxCurve::bootstrap(
        props,
        SPOT,
        &[
            FxQuote::new(Tenor::Overnight, on),
            FxQuote::new(Tenor::TomNext, tn),
            FxQuote::new(Tenor::Term(Period::months(1)), one_month),
        ],
        Arc::new(WeekendCalendar),
        &AlgorithmRegistry::standard(),
    )
    .unwrap();
    let risk = CurveRiskSet::build(&curve, BUMP).unwrap();
    assert_eq!(risk.len(), 3);
    let forward = |id: &str, tenor: Tenor| {
        risk.get(id).unwrap().curve.forward_for_tenor(tenor).unwrap()
    };
    let one_m = Tenor::Term(Period::months(1));

    // a TN bump moves ON as well, since ON rolls back from TN
    assert_relative_eq!(forward("EURUSD-FxForward-TN", Tenor::TomNext), SPOT - (tn + BUMP), epsilon = 1e-14);
    assert_relative_eq!(
        forward("EURUSD-FxForward-TN", Tenor::Overnight),
        SPOT - (tn + BUMP) - on,
        epsilon = 1e-14
    );
    assert_relative_eq!(forward("EURUSD-FxForward-TN", one_m), SPOT + one_month, epsilon = 1e-12);

    assert_relative_eq!(forward("EURUSD-FxForward-ON", Tenor::TomNext), SPOT - tn, epsilon = 1e-14);
    assert_relative_eq!(
        forward("EURUSD-FxForward-ON", Tenor::Overnight),
        SPOT - tn - (on + BUMP),
        epsilon = 1e-14
    );

    assert_relative_eq!(forward("EURUSD-FxForward-1M", Tenor::Overnight), SPOT - tn - on, epsilon = 1e-14);
    assert_relative_eq!(forward("EURUSD-FxForward-1M", one_m), SPOT + one_month + BUMP, epsilon = 1e-12);

    for scenario in risk {
        assert_reprices(&scenario.curve);
    }
}
