//! End-to-end behaviour of the simulation engine through the public API.

use chrono::NaiveDate;

use volatility_utility::export::{read_recorded_days, write_day_table};
use volatility_utility::scoring::WeightTable;
use volatility_utility::volatility::classify;
use volatility_utility::{
    run, run_batch, Category, DaySource, SimError, SimWarning, SimulationConfig,
};

#[test]
fn default_year_has_365_days() {
    let output = run(&SimulationConfig::default()).unwrap();
    assert_eq!(output.records.len(), 365);
    assert_eq!(output.records[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(output.records[364].date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    assert!(output.records.iter().all(|r| r.source == DaySource::Simulated));
}

#[test]
fn seed_42_crisis_days_beat_stable_days() {
    let config = SimulationConfig {
        num_days: 365,
        seed: 42,
        volatility_threshold: 1.5,
        ..Default::default()
    };
    let output = run(&config).unwrap();
    let stable = &output.summaries[&Category::Stable];
    let crisis = &output.summaries[&Category::Crisis];

    assert!(stable.count > 0 && crisis.count > 0);
    assert!(output.warnings.is_empty());
    assert!(crisis.mean_utility > stable.mean_utility);
    assert!(crisis.variance_utility > stable.variance_utility);
    assert!((stable.mean_utility - 1.9).abs() < 0.3, "stable mean {}", stable.mean_utility);
}

#[test]
fn different_seeds_give_different_moods() {
    let a = run(&SimulationConfig { seed: 1, ..Default::default() }).unwrap();
    let b = run(&SimulationConfig { seed: 2, ..Default::default() }).unwrap();
    let moods = |o: &volatility_utility::SimulationOutput| {
        o.records.iter().map(|r| r.mood_value).collect::<Vec<_>>()
    };
    assert_ne!(moods(&a), moods(&b));
}

#[test]
fn one_day_run_succeeds() {
    let output = run(&SimulationConfig { num_days: 1, ..Default::default() }).unwrap();
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].day_index, 1);
}

#[test]
fn zero_and_negative_days_are_invalid_parameters() {
    for num_days in [0, -10] {
        let result = run(&SimulationConfig { num_days, ..Default::default() });
        assert!(matches!(result, Err(SimError::InvalidParameter(_))));
    }
}

#[test]
fn empty_weight_table_fails_before_output() {
    let mut config = SimulationConfig::default();
    config
        .category_weight_tables
        .insert(Category::Stable, WeightTable::default());
    assert!(matches!(run(&config), Err(SimError::InvalidConfiguration(_))));
}

#[test]
fn threshold_equality_is_stable() {
    let classes = classify(&[0.5, 2.0, 0.0], 1.5, 1);
    assert_eq!(classes[1].category, Category::Stable);
    assert_eq!(classes[2].category, Category::Crisis);
}

#[test]
fn huge_threshold_reports_degenerate_split() {
    let config = SimulationConfig {
        volatility_threshold: 1_000.0,
        ..Default::default()
    };
    let output = run(&config).unwrap();
    let crisis = &output.summaries[&Category::Crisis];
    assert_eq!(crisis.count, 0);
    assert!(crisis.mean_utility.is_nan());
    assert_eq!(
        output.warnings,
        vec![SimWarning::DegenerateSplit { empty: Category::Crisis }]
    );
}

#[test]
fn recorded_events_flow_through_to_csv() {
    let events = "date,category,utility_score\n2025-01-18,Crisis,1\n2025-03-12,Crisis,5\n";
    let config = SimulationConfig {
        recorded_days: read_recorded_days(events.as_bytes()).unwrap(),
        ..Default::default()
    };
    let output = run(&config).unwrap();

    let recorded: Vec<_> = output
        .records
        .iter()
        .filter(|r| r.source == DaySource::Recorded)
        .collect();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].day_index, 18);
    assert_eq!(recorded[1].utility_score, 5.0);

    let mut buffer = Vec::new();
    write_day_table(&output.records, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().filter(|l| l.ends_with(",RECORDED")).count(), 2);
}

#[test]
fn batch_mostly_favours_crisis_days() {
    let outcome = run_batch(&SimulationConfig::default(), 20).unwrap();
    assert_eq!(outcome.runs, 20);
    assert!(outcome.runs_compared >= 18);
    assert!(outcome.crisis_win_rate() > 0.8, "win rate {}", outcome.crisis_win_rate());
    assert!(outcome.mean_of_means[&Category::Crisis] > outcome.mean_of_means[&Category::Stable]);
}
