use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{detect_degenerate_split, summarize_by_category};
use crate::config::SimulationConfig;
use crate::error::{Result, SimError, SimWarning};
use crate::models::{Category, CategorySummary, DayRecord, DaySource, RecordedDay};
use crate::mood::MoodGenerator;
use crate::scoring::UtilityScorer;
use crate::volatility;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    pub records: Vec<DayRecord>,
    pub summaries: BTreeMap<Category, CategorySummary>,
    pub warnings: Vec<SimWarning>,
}

impl SimulationOutput {
    pub fn mean_utility(&self, category: Category) -> f64 {
        self.summaries
            .get(&category)
            .map_or(f64::NAN, |s| s.mean_utility)
    }

    /// `Some(true)` when crisis days averaged more utility than stable days.
    /// `None` if either category is empty.
    pub fn crisis_outperforms(&self) -> Option<bool> {
        let crisis = self.mean_utility(Category::Crisis);
        let stable = self.mean_utility(Category::Stable);
        if crisis.is_nan() || stable.is_nan() {
            None
        } else {
            Some(crisis > stable)
        }
    }
}

pub fn run(config: &SimulationConfig) -> Result<SimulationOutput> {
    config.validate()?;
    let generator = MoodGenerator::new(&config.mood)?;
    let scorer = UtilityScorer::new(&config.category_weight_tables, config.mood_bias)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let moods = generator.generate(config.num_days, &mut rng)?;
    debug!(days = moods.len(), seed = config.seed, "generated moods");

    let classifications = volatility::classify(
        &moods,
        config.volatility_threshold,
        config.volatility_window,
    );

    let mut records = Vec::with_capacity(moods.len());
    for (offset, (mood_value, classification)) in moods.iter().zip(classifications).enumerate() {
        let day_index = offset as u32 + 1;
        let utility_score = scorer.score(*mood_value, classification.category, &mut rng)?;
        records.push(DayRecord {
            day_index,
            date: config.date_of(day_index)?,
            mood_value: *mood_value,
            volatility: classification.volatility,
            category: classification.category,
            utility_score,
            source: DaySource::Simulated,
        });
    }
    debug!(days = records.len(), "scored days");

    apply_recorded_days(&mut records, &config.recorded_days)?;

    let summaries = summarize_by_category(&records);
    let warnings = detect_degenerate_split(&summaries);
    for warning in &warnings {
        warn!(seed = config.seed, "{warning}");
    }

    info!(
        seed = config.seed,
        stable_days = summaries[&Category::Stable].count,
        crisis_days = summaries[&Category::Crisis].count,
        stable_mean = summaries[&Category::Stable].mean_utility,
        crisis_mean = summaries[&Category::Crisis].mean_utility,
        "simulation complete"
    );

    Ok(SimulationOutput {
        records,
        summaries,
        warnings,
    })
}

/// Replaces simulated days with remembered ones. Later entries for the same
/// date win.
fn apply_recorded_days(records: &mut [DayRecord], recorded_days: &[RecordedDay]) -> Result<()> {
    let Some(start) = records.first().map(|r| r.date) else {
        return Ok(());
    };

    for recorded in recorded_days {
        let offset = (recorded.date - start).num_days();
        let record = usize::try_from(offset)
            .ok()
            .and_then(|index| records.get_mut(index))
            .ok_or_else(|| {
                SimError::InvalidParameter(format!(
                    "recorded day {} is outside the simulated range",
                    recorded.date
                ))
            })?;

        record.category = recorded.category;
        record.utility_score = recorded.utility_score;
        record.source = DaySource::Recorded;
    }

    if !recorded_days.is_empty() {
        debug!(count = recorded_days.len(), "applied recorded days");
    }
    Ok(())
}

/// Aggregate of independent runs with consecutive seeds.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub runs: usize,
    pub base_seed: u64,
    /// Mean of per-run means, skipping runs where the category was empty.
    pub mean_of_means: BTreeMap<Category, f64>,
    /// Runs where both categories were populated.
    pub runs_compared: usize,
    pub crisis_wins: usize,
    pub degenerate_runs: usize,
}

impl BatchOutcome {
    pub fn crisis_win_rate(&self) -> f64 {
        if self.runs_compared == 0 {
            f64::NAN
        } else {
            self.crisis_wins as f64 / self.runs_compared as f64
        }
    }
}

/// Run `i` uses seed `config.seed + i` (wrapping).
pub fn run_batch(config: &SimulationConfig, runs: usize) -> Result<BatchOutcome> {
    if runs == 0 {
        return Err(SimError::InvalidParameter(
            "batch needs at least one run".to_string(),
        ));
    }
    config.validate()?;

    let mut sums: BTreeMap<Category, (f64, usize)> =
        Category::ALL.iter().map(|&c| (c, (0.0, 0))).collect();
    let mut runs_compared = 0;
    let mut crisis_wins = 0;
    let mut degenerate_runs = 0;

    for i in 0..runs {
        let run_config = SimulationConfig {
            seed: config.seed.wrapping_add(i as u64),
            ..config.clone()
        };
        let output = run(&run_config)?;

        for (category, summary) in &output.summaries {
            if summary.count > 0 {
                let entry = sums.entry(*category).or_insert((0.0, 0));
                entry.0 += summary.mean_utility;
                entry.1 += 1;
            }
        }
        if !output.warnings.is_empty() {
            degenerate_runs += 1;
        }
        if let Some(outperforms) = output.crisis_outperforms() {
            runs_compared += 1;
            if outperforms {
                crisis_wins += 1;
            }
        }
    }

    let mean_of_means = sums
        .into_iter()
        .map(|(category, (sum, n))| {
            let mean = if n == 0 { f64::NAN } else { sum / n as f64 };
            (category, mean)
        })
        .collect();

    let outcome = BatchOutcome {
        runs,
        base_seed: config.seed,
        mean_of_means,
        runs_compared,
        crisis_wins,
        degenerate_runs,
    };
    info!(runs, crisis_wins, runs_compared, "batch complete");
    Ok(outcome)
}
