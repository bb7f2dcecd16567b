#![allow(dead_code)]

use std::sync::Arc;

use arbor_core::prelude::*;
use arbor_curves::prelude::*;

pub fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

pub fn base_date() -> Date {
    date(2024, 1, 15)
}

pub fn usd_properties() -> CurveProperties {
    CurveProperties::new(PricingStructureType::RateCurve, base_date())
        .with_currency(Currency::USD)
        .with_index("SOFR", None)
}

pub fn usd_instruments() -> Vec<Arc<dyn PriceableInstrument>> {
    let factory = StandardInstrumentFactory::new();
    [
        ("USD-Deposit-ON", 0.0531),
        ("USD-Deposit-1M", 0.0532),
        ("USD-Deposit-3M", 0.0535),
        ("USD-Fra-3M-6M", 0.0528),
        ("USD-IRSwap-1Y", 0.0505),
        ("USD-IRSwap-2Y", 0.0462),
        ("USD-IRSwap-5Y", 0.0410),
        ("USD-IRSwap-10Y", 0.0398),
    ]
    .iter()
    .map(|(id, quote)| factory.create(id, *quote, base_date()).unwrap())
    .collect()
}

pub fn usd_curve() -> Arc<RateCurve> {
    Arc::new(
        RateCurve::bootstrap(usd_properties(), usd_instruments(), &AlgorithmRegistry::standard())
            .unwrap(),
    )
}

pub fn eur_curve() -> Arc<RateCurve> {
    let props = CurveProperties::new(PricingStructureType::RateCurve, base_date())
        .with_currency(Currency::EUR)
        .with_index("ESTR", None);
    let factory = StandardInstrumentFactory::new().with_swap_frequency(Frequency::Annual);
    let instruments = [
        ("EUR-Deposit-3M", 0.0390),
        ("EUR-IRSwap-1Y", 0.0355),
        ("EUR-IRSwap-2Y", 0.0310),
        ("EUR-IRSwap-5Y", 0.0275),
    ]
    .iter()
    .map(|(id, quote)| factory.create(id, *quote, base_date()).unwrap())
    .collect();
    Arc::new(RateCurve::bootstrap(props, instruments, &AlgorithmRegistry::standard()).unwrap())
}

pub fn assert_reprices<C: InstrumentCurve>(curve: &C) {
    let report = curve.repricing_report().unwrap();
    assert!(!report.is_empty());
    assert!(report.all_passed(), "{report}");
    assert!(report.max_abs_residual() <= 1e-10);
}

/// Routes `tracing` output through the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
