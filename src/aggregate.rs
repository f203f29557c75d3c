use std::collections::BTreeMap;

use crate::error::SimWarning;
use crate::models::{Category, CategorySummary, DayRecord};

/// Groups records by category. Both categories are always present; an empty
/// one reports `count == 0` and NaN statistics.
pub fn summarize_by_category(records: &[DayRecord]) -> BTreeMap<Category, CategorySummary> {
    let mut values: BTreeMap<Category, Vec<f64>> =
        Category::ALL.iter().map(|&c| (c, Vec::new())).collect();

    for record in records {
        values
            .entry(record.category)
            .or_default()
            .push(record.utility_score);
    }

    values
        .into_iter()
        .map(|(category, sample_values)| (category, summarize(category, sample_values)))
        .collect()
}

fn summarize(category: Category, sample_values: Vec<f64>) -> CategorySummary {
    let count = sample_values.len();
    let (mean_utility, variance_utility) = if count == 0 {
        (f64::NAN, f64::NAN)
    } else {
        let mean = sample_values.iter().sum::<f64>() / count as f64;
        let variance = sample_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        (mean, variance)
    };

    CategorySummary {
        category,
        count,
        mean_utility,
        variance_utility,
        std_dev_utility: variance_utility.sqrt(),
        sample_values,
    }
}

pub fn detect_degenerate_split(
    summaries: &BTreeMap<Category, CategorySummary>,
) -> Vec<SimWarning> {
    Category::ALL
        .into_iter()
        .filter(|category| summaries.get(category).map_or(true, |s| s.count == 0))
        .map(|empty| SimWarning::DegenerateSplit { empty })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DaySource;
    use chrono::NaiveDate;

    fn record(day_index: u32, category: Category, utility_score: f64) -> DayRecord {
        DayRecord {
            day_index,
            date: NaiveDate::from_ymd_opt(2025, 1, day_index).unwrap(),
            mood_value: 0.0,
            volatility: 0.0,
            category,
            utility_score,
            source: DaySource::Simulated,
        }
    }

    #[test]
    fn computes_population_statistics() {
        let records = vec![
            record(1, Category::Stable, 1.0),
            record(2, Category::Crisis, 0.0),
            record(3, Category::Stable, 3.0),
            record(4, Category::Crisis, 5.0),
            record(5, Category::Stable, 2.0),
        ];
        let summaries = summarize_by_category(&records);

        let stable = &summaries[&Category::Stable];
        assert_eq!(stable.count, 3);
        assert!((stable.mean_utility - 2.0).abs() < 1e-12);
        assert!((stable.variance_utility - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stable.sample_values, vec![1.0, 3.0, 2.0]);

        let crisis = &summaries[&Category::Crisis];
        assert_eq!(crisis.count, 2);
        assert!((crisis.mean_utility - 2.5).abs() < 1e-12);
        assert!((crisis.variance_utility - 6.25).abs() < 1e-12);
        assert!((crisis.std_dev_utility - 2.5).abs() < 1e-12);
    }

    #[test]
    fn empty_category_is_reported_not_failed() {
        let records = vec![record(1, Category::Stable, 2.0)];
        let summaries = summarize_by_category(&records);
        let crisis = &summaries[&Category::Crisis];
        assert_eq!(crisis.count, 0);
        assert!(crisis.mean_utility.is_nan());
        assert!(crisis.variance_utility.is_nan());
        assert!(crisis.sample_values.is_empty());

        assert_eq!(
            detect_degenerate_split(&summaries),
            vec![SimWarning::DegenerateSplit {
                empty: Category::Crisis
            }]
        );
    }

    #[test]
    fn balanced_split_has_no_warnings() {
        let records = vec![
            record(1, Category::Stable, 2.0),
            record(2, Category::Crisis, 4.0),
        ];
        assert!(detect_degenerate_split(&summarize_by_category(&records)).is_empty());
    }

    #[test]
    fn counts_cover_every_record() {
        let records: Vec<_> = (1..=20)
            .map(|i| {
                let category = if i % 4 == 0 { Category::Crisis } else { Category::Stable };
                record(i, category, 1.0)
            })
            .collect();
        let total: usize = summarize_by_category(&records)
            .values()
            .map(|s| s.count)
            .sum();
        assert_eq!(total, records.len());
    }
}
