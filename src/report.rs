use std::fmt::Write;

use crate::config::SimulationConfig;
use crate::models::{Category, DayRecord, DaySource};
use crate::pipeline::SimulationOutput;

/// Two decimals, or `n/a` for undefined statistics.
pub fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Crisis days ordered by volatility, largest first.
pub fn most_volatile_crises(records: &[DayRecord], limit: usize) -> Vec<&DayRecord> {
    let mut crises: Vec<&DayRecord> = records
        .iter()
        .filter(|r| r.category == Category::Crisis)
        .collect();
    crises.sort_by(|a, b| b.volatility.total_cmp(&a.volatility));
    crises.truncate(limit);
    crises
}

pub fn build_report(config: &SimulationConfig, output: &SimulationOutput) -> String {
    let mut report = String::new();
    let first = output.records.first().map(|r| r.date);
    let last = output.records.last().map(|r| r.date);

    let _ = writeln!(report, "# Volatility & Utility Report");
    if let (Some(first), Some(last)) = (first, last) {
        let _ = writeln!(
            report,
            "Simulated {} days from {} to {} (seed {}, threshold {:.2}, window {})",
            output.records.len(),
            first,
            last,
            config.seed,
            config.volatility_threshold,
            config.volatility_window
        );
    }

    let recorded = output
        .records
        .iter()
        .filter(|r| r.source == DaySource::Recorded)
        .count();
    if recorded > 0 {
        let _ = writeln!(report, "{recorded} days taken from recorded events.");
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "## Utility by Category");
    let _ = writeln!(
        report,
        "| Category | Days | Mean | Std | Variance | Q1 | Median | Q3 |"
    );
    let _ = writeln!(report, "|---|---|---|---|---|---|---|---|");
    for summary in output.summaries.values() {
        let (q1, median, q3) = summary
            .quartiles()
            .unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        let _ = writeln!(
            report,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            summary.category,
            summary.count,
            fmt_stat(summary.mean_utility),
            fmt_stat(summary.std_dev_utility),
            fmt_stat(summary.variance_utility),
            fmt_stat(q1),
            fmt_stat(median),
            fmt_stat(q3)
        );
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "## Hypothesis");
    match output.crisis_outperforms() {
        Some(true) => {
            let _ = writeln!(
                report,
                "Crisis days averaged more utility than stable days ({} vs {}).",
                fmt_stat(output.mean_utility(Category::Crisis)),
                fmt_stat(output.mean_utility(Category::Stable))
            );
        }
        Some(false) => {
            let _ = writeln!(
                report,
                "Crisis days did not average more utility than stable days ({} vs {}).",
                fmt_stat(output.mean_utility(Category::Crisis)),
                fmt_stat(output.mean_utility(Category::Stable))
            );
        }
        None => {
            let _ = writeln!(report, "Not comparable: one category has no days.");
        }
    }

    if !output.warnings.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "## Warnings");
        for warning in &output.warnings {
            let _ = writeln!(report, "- {warning}");
        }
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "## Most Volatile Crisis Days");
    let crises = most_volatile_crises(&output.records, 5);
    if crises.is_empty() {
        let _ = writeln!(report, "No crisis days in this run.");
    } else {
        for day in crises {
            let _ = writeln!(
                report,
                "- {} (day {}): mood {:.2}, volatility {:.2}, utility {:.1}",
                day.date, day.day_index, day.mood_value, day.volatility, day.utility_score
            );
        }
    }

    report
}
