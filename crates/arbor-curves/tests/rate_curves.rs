//! Rate, basis, spread and cross-currency swap curves.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use arbor_core::prelude::*;
use arbor_curves::prelude::*;

use common::*;

#[test]
fn rate_curve_reprices_its_inputs() {
    init_tracing();
    let curve = usd_curve();
    assert_reprices(curve.as_ref());
    assert_eq!(curve.term_curve().len(), usd_instruments().len() + 1);
    assert!(curve.term_curve().is_finalized());
}

#[test]
fn rate_curve_pillars_are_exact() {
    let curve = usd_curve();
    for p in curve.term_curve().points() {
        assert_eq!(curve.discount_factor(p.time).unwrap(), p.value);
        if let Some(d) = p.date {
            assert_eq!(curve.discount_factor_at(d).unwrap(), p.value);
        }
    }
}

#[test]
fn every_registered_algorithm_reprices() {
    let registry = AlgorithmRegistry::standard();
    for name in ["LinearZero", "LogLinearDiscount", "FlatForward"] {
        let props = usd_properties().with_algorithm(name);
        let curve = RateCurve::bootstrap(props, usd_instruments(), &registry).unwrap();
        assert_reprices(&curve);
    }
}

#[test]
fn gap_step_curve_reprices_with_decision_dates() {
    let props = usd_properties()
        .with_algorithm("GapStep")
        .with_step_dates(vec![date(2024, 3, 20), date(2024, 5, 1), date(2024, 6, 12)]);
    let curve =
        RateCurve::bootstrap(props, usd_instruments(), &AlgorithmRegistry::standard()).unwrap();
    assert_reprices(&curve);
}

#[test]
fn zero_rates_follow_configured_compounding() {
    let continuous = usd_curve();
    let annual = RateCurve::bootstrap(
        usd_properties().with_compounding(Compounding::Annual),
        usd_instruments(),
        &AlgorithmRegistry::standard(),
    )
    .unwrap();
    let d = date(2026, 1, 15);
    let df = continuous.discount_factor_at(d).unwrap();
    let t = continuous.year_fraction(d);
    assert_relative_eq!(continuous.zero_rate_at(d).unwrap(), -df.ln() / t, epsilon = 1e-14);
    assert_relative_eq!(
        annual.zero_rate_at(d).unwrap(),
        df.powf(-1.0 / t) - 1.0,
        epsilon = 1e-12
    );
}

#[test]
fn supplied_pillars_only() {
    let b = base_date();
    let pillars = vec![(b, 1.0), (date(2025, 1, 15), 0.96), (date(2026, 1, 15), 0.92)];
    let curve = RateCurve::from_pillars(
        usd_properties().with_algorithm("LogLinearDiscount"),
        &AlgorithmRegistry::standard(),
        pillars,
    )
    .unwrap();
    assert_eq!(curve.discount_factor_at(date(2025, 1, 15)).unwrap(), 0.96);
    let mid = curve.discount_factor_at(date(2025, 7, 16)).unwrap();
    assert!(mid < 0.96 && mid > 0.92);
    assert!(curve.instruments().is_empty());
}

#[test]
fn instrument_inside_supplied_pillars_is_an_ordering_error() {
    let b = base_date();
    let pillars = vec![(b, 1.0), (date(2026, 1, 15), 0.92)];
    let swap: Arc<dyn PriceableInstrument> = Arc::new(
        Swap::new("USD-IRSwap-1Y", b, date(2025, 1, 15), 0.04, Frequency::SemiAnnual).unwrap(),
    );
    let err = RateCurve::with_pillars(
        usd_properties(),
        &AlgorithmRegistry::standard(),
        pillars,
        vec![swap],
    )
    .unwrap_err();
    assert!(matches!(err, CurveError::Ordering { .. }));
}

#[test]
fn duplicate_maturities_follow_optimize_build() {
    let b = base_date();
    let end = date(2024, 4, 15);
    let instruments = || -> Vec<Arc<dyn PriceableInstrument>> {
        vec![
            Arc::new(Deposit::new("USD-Deposit-3M", b, end, 0.05).unwrap()),
            Arc::new(Fra::new("USD-Fra-0M-3M", b, end, 0.051).unwrap()),
        ]
    };
    let registry = AlgorithmRegistry::standard();

    let err = RateCurve::bootstrap(usd_properties(), instruments(), &registry).unwrap_err();
    assert!(matches!(err, CurveError::Ordering { .. }));

    let merged =
        RateCurve::bootstrap(usd_properties().with_optimize_build(true), instruments(), &registry)
            .unwrap();
    assert_eq!(merged.instruments().len(), 1);
    assert_eq!(merged.instruments()[0].id(), "USD-Fra-0M-3M");
    assert_relative_eq!(
        merged.discount_factor_at(end).unwrap(),
        1.0 / (1.0 + 0.051 * 91.0 / 360.0),
        epsilon = 1e-10
    );
}

#[test]
fn iteration_cap_is_reported_as_non_convergence() {
    let mut props = usd_properties();
    props.max_iterations = 0;
    let err = RateCurve::bootstrap(props, usd_instruments(), &AlgorithmRegistry::standard())
        .unwrap_err();
    match err {
        CurveError::NonConvergence { instrument, iterations, residual } => {
            assert_eq!(instrument, "USD-Deposit-ON");
            assert_eq!(iterations, 0);
            assert!(residual > 1e-10);
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
}

#[test]
fn unknown_algorithm_is_a_config_error() {
    let err = RateCurve::bootstrap(
        usd_properties().with_algorithm("CubicSpline"),
        usd_instruments(),
        &AlgorithmRegistry::standard(),
    )
    .unwrap_err();
    assert!(matches!(err, CurveError::InvalidConfig { .. }));
}

fn basis_properties(base: &RateCurve) -> CurveProperties {
    CurveProperties::new(PricingStructureType::RateBasisCurve, base_date())
        .with_currency(Currency::USD)
        .with_index("LIBOR", Some(Period::months(3)))
        .with_reference_curve(base.identifier())
}

#[test]
fn basis_curve_reprices_basis_swaps() {
    let base = usd_curve();
    let base_dyn: Arc<dyn Curve> = base.clone();
    let b = base_date();
    let instruments: Vec<Arc<dyn PriceableInstrument>> = [(1, 0.0012), (2, 0.0015), (5, 0.0018)]
        .iter()
        .map(|(years, spread)| -> Arc<dyn PriceableInstrument> {
            Arc::new(
                BasisSwap::new(
                    format!("USD-BasisSwap-{years}Y"),
                    b,
                    b.add_years(*years).unwrap(),
                    *spread,
                    Frequency::Quarterly,
                    Frequency::Quarterly,
                    Arc::clone(&base_dyn),
                )
                .unwrap(),
            )
        })
        .collect();
    let curve = RateBasisCurve::bootstrap(basis_properties(&base), base.clone(), instruments).unwrap();
    assert_reprices(&curve);
    assert_eq!(curve.spread(0.0).unwrap(), 0.0);
    // beyond the last pillar the spread is held flat
    let last = curve.spread_curve().points().last().unwrap().value;
    assert_eq!(curve.spread(30.0).unwrap(), last);
    let t = 3.0;
    assert_relative_eq!(
        curve.discount_factor(t).unwrap(),
        base.discount_factor(t).unwrap() * (-curve.spread(t).unwrap() * t).exp(),
        epsilon = 1e-15
    );
}

#[test]
fn spread_curve_reprices_spread_instruments() {
    let base = usd_curve();
    let base_dyn: Arc<dyn Curve> = base.clone();
    let b = base_date();
    let instruments: Vec<Arc<dyn PriceableInstrument>> = vec![
        Arc::new(
            SpreadDeposit::new("USD-SpreadDeposit-3M", b, date(2024, 4, 15), 0.0010, base_dyn.clone())
                .unwrap(),
        ),
        Arc::new(
            SpreadFra::new(
                "USD-SpreadFra-3M-6M",
                date(2024, 4, 15),
                date(2024, 7, 15),
                0.0012,
                base_dyn.clone(),
            )
            .unwrap(),
        ),
        Arc::new(
            SpreadSwap::new(
                "USD-SpreadSwap-3Y",
                b,
                date(2027, 1, 15),
                0.0015,
                Frequency::SemiAnnual,
                base_dyn,
            )
            .unwrap(),
        ),
    ];
    let props = CurveProperties::new(PricingStructureType::RateSpreadCurve, b)
        .with_currency(Currency::USD)
        .with_index("CORP-AA", None);
    let curve = RateSpreadCurve::bootstrap(props, base.clone(), instruments).unwrap();
    assert_reprices(&curve);
    // positive quoted spreads lower discount factors
    assert!(curve.discount_factor(2.0).unwrap() < base.discount_factor(2.0).unwrap());
}

#[test]
fn xccy_curve_reprices_basis_swaps() {
    let eur = eur_curve();
    let projection: Arc<dyn Curve> = eur.clone();
    let b = base_date();
    let instruments: Vec<Arc<dyn PriceableInstrument>> = [(1, -0.0010), (3, -0.0014), (5, -0.0016)]
        .iter()
        .map(|(years, spread)| -> Arc<dyn PriceableInstrument> {
            Arc::new(
                XccyBasisSwap::new(
                    format!("EUR-XccySwap-{years}Y"),
                    b,
                    b.add_years(*years).unwrap(),
                    *spread,
                    Frequency::Quarterly,
                    Arc::clone(&projection),
                )
                .unwrap(),
            )
        })
        .collect();
    let props = CurveProperties::new(PricingStructureType::XccySpreadCurve, b)
        .with_currency(Currency::EUR)
        .with_index("USD-Collateral", None);
    let curve = XccySpreadCurve::bootstrap(props, eur, instruments).unwrap();
    assert_eq!(curve.source(), XccySource::Swaps);
    assert_reprices(&curve);
    // negative basis raises the collateralised discount factors
    assert!(curve.discount_factor(4.0).unwrap() > curve.base().discount_factor(4.0).unwrap());
}

#[test]
fn derived_curve_from_store() {
    let base = usd_curve();
    let mut store = InMemoryCurveStore::new();
    store.save(PricingStructure::from(base.clone())).unwrap();
    let base_dyn: Arc<dyn Curve> = base.clone();
    let b = base_date();
    let swap: Arc<dyn PriceableInstrument> = Arc::new(
        BasisSwap::new(
            "USD-BasisSwap-2Y",
            b,
            date(2026, 1, 15),
            0.0015,
            Frequency::Quarterly,
            Frequency::Quarterly,
            base_dyn,
        )
        .unwrap(),
    );

    let curve = RateBasisCurve::bootstrap_from_store(basis_properties(&base), &store, vec![swap.clone()])
        .unwrap();
    assert_eq!(curve.base().identifier(), base.identifier());

    let missing = basis_properties(&base)
        .with_reference_curve(&"Market.EOD.RateCurve.USD-OIS".parse().unwrap());
    let err = RateBasisCurve::bootstrap_from_store(missing, &store, vec![swap.clone()]).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));

    let mut unset = basis_properties(&base);
    unset.reference_curve_unique_id = None;
    let err = RateBasisCurve::bootstrap_from_store(unset, &store, vec![swap]).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));
}

#[test]
fn mismatched_base_is_a_missing_dependency() {
    let base = usd_curve();
    let later = CurveProperties::new(PricingStructureType::RateBasisCurve, date(2024, 1, 16))
        .with_currency(Currency::USD)
        .with_index("LIBOR", Some(Period::months(3)));
    let err = RateBasisCurve::bootstrap(later, base.clone(), Vec::new()).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));

    let wrong_ccy = CurveProperties::new(PricingStructureType::RateBasisCurve, base_date())
        .with_currency(Currency::GBP)
        .with_index("SONIA", None);
    let err = RateBasisCurve::bootstrap(wrong_ccy, base.clone(), Vec::new()).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));

    let other_ref = basis_properties(&base)
        .with_reference_curve(&"Market.EOD.RateCurve.USD-OIS".parse().unwrap());
    let err = RateBasisCurve::bootstrap(other_ref, base, Vec::new()).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));
}

#[test]
fn wrong_instrument_kind_is_rejected() {
    let base = usd_curve();
    let err = RateBasisCurve::bootstrap(basis_properties(&base), base, usd_instruments()).unwrap_err();
    assert!(matches!(err, CurveError::InvalidInstrument { .. }));
}

#[test]
fn instruments_on_another_base_are_rejected() {
    let base = usd_curve();
    let other: Arc<dyn Curve> = usd_curve();
    let b = base_date();
    let swap: Arc<dyn PriceableInstrument> = Arc::new(
        BasisSwap::new(
            "USD-BasisSwap-2Y",
            b,
            date(2026, 1, 15),
            0.0015,
            Frequency::Quarterly,
            Frequency::Quarterly,
            other,
        )
        .unwrap(),
    );
    let err = RateBasisCurve::bootstrap(basis_properties(&base), base.clone(), vec![swap]).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));

    let eur = eur_curve();
    let projection: Arc<dyn Curve> = eur_curve();
    let xccy: Arc<dyn PriceableInstrument> = Arc::new(
        XccyBasisSwap::new("EUR-XccySwap-1Y", b, date(2025, 1, 15), -0.001, Frequency::Quarterly, projection)
            .unwrap(),
    );
    let props = CurveProperties::new(PricingStructureType::XccySpreadCurve, b)
        .with_currency(Currency::EUR)
        .with_index("USD-Collateral", None);
    let err = XccySpreadCurve::bootstrap(props, eur, vec![xccy]).unwrap_err();
    assert!(matches!(err, CurveError::MissingDependency { .. }));
}
