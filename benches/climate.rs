use chrono::{Datelike, Duration, NaiveDate};
use climatelens::{
    ClimateConfig, ClimateReport, ClimateVariable, DateKey, DateSpecificAverages,
    DateWindowSampler, HeatmapGrid, Location, MonthDay, RawSeries,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

/// 44 years of daily values for every variable, with a seasonal cycle and a
/// sentinel every 97th day.
fn synthetic_store() -> RawSeries {
    let mut raw = RawSeries::default();
    let start = NaiveDate::from_ymd_opt(1981, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let days = (end - start).num_days();
    for i in 0..=days {
        let date = start + Duration::days(i);
        let season = (f64::from(date.ordinal()) / 365.0 * std::f64::consts::TAU).cos();
        for variable in ClimateVariable::ALL {
            let value = if i % 97 == 0 {
                -999.0
            } else {
                10.0 - 8.0 * season + (i % 7) as f64 * 0.3
            };
            raw.series_mut(variable).insert(DateKey::new(date), value);
        }
    }
    raw
}

fn bench_statistics(c: &mut Criterion) {
    let raw = Arc::new(synthetic_store());
    let target = MonthDay::new(6, 15).unwrap();
    let sampler = DateWindowSampler::default();
    let config = ClimateConfig::default();
    let location = Location::new("Bench", 52.0, 5.0);
    let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    c.bench_function("window_sample", |b| {
        b.iter(|| sampler.sample(black_box(&raw), black_box(target)))
    });
    c.bench_function("date_specific_averages", |b| {
        b.iter(|| DateSpecificAverages::build(black_box(&raw), black_box(target)))
    });
    c.bench_function("heatmap_precipitation", |b| {
        b.iter(|| HeatmapGrid::build(black_box(&raw), ClimateVariable::Precipitation))
    });
    c.bench_function("full_report", |b| {
        b.iter(|| ClimateReport::from_raw(&location, Arc::clone(&raw), black_box(date), &config))
    });
}

criterion_group!(benches, bench_statistics);
criterion_main!(benches);
