//! Property-based tests for the simulation pipeline.

use proptest::prelude::*;

use volatility_utility::scoring::{MAX_UTILITY, MIN_UTILITY};
use volatility_utility::{run, Category, SimulationConfig};

fn config(num_days: i64, seed: u64, threshold: f64, window: usize) -> SimulationConfig {
    SimulationConfig {
        num_days,
        seed,
        volatility_threshold: threshold,
        volatility_window: window,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. One record per day, indices 1..=N without gaps
    #[test]
    fn day_indices_are_contiguous(
        days in 1..=400i64, seed in any::<u64>(), threshold in 0.0..4.0f64, window in 1..=7usize,
    ) {
        let output = run(&config(days, seed, threshold, window)).unwrap();
        prop_assert_eq!(output.records.len(), days as usize);
        for (i, record) in output.records.iter().enumerate() {
            prop_assert_eq!(record.day_index as usize, i + 1);
        }
    }

    // 2. Utility never leaves [0, 5]
    #[test]
    fn utility_is_bounded(days in 1..=400i64, seed in any::<u64>(), threshold in 0.0..4.0f64) {
        let output = run(&config(days, seed, threshold, 1)).unwrap();
        for record in &output.records {
            prop_assert!((MIN_UTILITY..=MAX_UTILITY).contains(&record.utility_score));
        }
    }

    // 3. Same seed, same output
    #[test]
    fn runs_are_deterministic(days in 1..=200i64, seed in any::<u64>()) {
        let cfg = config(days, seed, 1.5, 1);
        let a = run(&cfg).unwrap();
        let b = run(&cfg).unwrap();
        prop_assert_eq!(a.records, b.records);
    }

    // 4. Summary counts cover every day
    #[test]
    fn summary_counts_sum_to_days(days in 1..=400i64, seed in any::<u64>(), window in 1..=7usize) {
        let output = run(&config(days, seed, 1.5, window)).unwrap();
        let total: usize = output.summaries.values().map(|s| s.count).sum();
        prop_assert_eq!(total, days as usize);
        prop_assert_eq!(output.summaries.len(), Category::ALL.len());
    }

    // 5. Simulated categories follow the threshold rule exactly
    #[test]
    fn category_matches_threshold_rule(seed in any::<u64>(), threshold in 0.0..4.0f64) {
        let output = run(&config(120, seed, threshold, 1)).unwrap();
        for record in &output.records {
            let expected = if record.volatility > threshold {
                Category::Crisis
            } else {
                Category::Stable
            };
            prop_assert_eq!(record.category, expected);
        }
    }

    // 6. Non-positive day counts never produce output
    #[test]
    fn non_positive_days_fail(days in i64::MIN..=0i64) {
        prop_assert!(run(&config(days, 1, 1.5, 1)).is_err());
    }
}
