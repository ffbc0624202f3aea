//! Plain-text weather context handed to the assistant alongside the user's question.

use crate::forecast::hourly::CurrentSummary;
use crate::report::{ClimateReport, VariableCard};
use crate::stats::aggregate::DerivedMetric;
use std::fmt::Write;

/// Summarises a report as a few lines of text, one per variable with data.
pub fn weather_context(report: &ClimateReport, current: Option<&CurrentSummary>) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "Location: {}", report.location);
    let _ = writeln!(out, "Date: {}", report.target_date.format("%Y-%m-%d"));
    if let Some(current) = current {
        let _ = writeln!(out, "Current conditions: {current}");
    }

    for (variable, card) in report.cards.iter() {
        if card.has_no_data() {
            continue;
        }
        let _ = writeln!(out, "{}: {}", variable.label(), describe_card(card));
    }

    let rain: Vec<String> = DerivedMetric::ALL
        .iter()
        .filter_map(|metric| {
            report
                .derived(*metric)
                .map(|stat| format!("{} {:.1}%", metric_label(*metric), stat.average))
        })
        .collect();
    if !rain.is_empty() {
        let _ = writeln!(out, "Rain: {}", rain.join(", "));
    }
    out
}

fn describe_card(card: &VariableCard) -> String {
    let unit = card.unit;
    let mut parts = Vec::new();
    if let Some(stat) = &card.date_average {
        parts.push(format!(
            "historical average {:.1} {unit} (range {:.1} to {:.1} over {} years)",
            stat.average, stat.min, stat.max, stat.years_of_data
        ));
    }
    if let Some(predicted) = card.predicted_value {
        parts.push(format!("trend prediction {predicted:.1} {unit}"));
    }
    if let Some(bands) = &card.bands_around_prediction {
        parts.push(format!(
            "likely between {} and {} {unit}",
            bands.one_std[0], bands.one_std[1]
        ));
    }
    if parts.is_empty() {
        return "no data".to_string();
    }
    parts.join(", ")
}

fn metric_label(metric: DerivedMetric) -> &'static str {
    match metric {
        DerivedMetric::RainProbabilityToday => "chance of rain",
        DerivedMetric::HeavyRainProbabilityToday => "heavy rain",
        DerivedMetric::ExtremeRainProbabilityToday => "extreme rain",
        DerivedMetric::DryDayProbabilityToday => "dry day",
        DerivedMetric::WeeklyRainProbability => "rain within 3 days",
    }
}
