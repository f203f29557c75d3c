use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::{Category, RecordedDay};
use crate::scoring::{check_mood_bias, WeightTable, MAX_UTILITY, MIN_UTILITY};

/// Parameters of the regime-switching mood walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub baseline: f64,
    /// Fraction of yesterday's deviation from `baseline` that carries over.
    pub persistence: f64,
    pub calm_noise: f64,
    pub turbulent_noise: f64,
    pub crisis_onset_probability: f64,
    pub crisis_recovery_probability: f64,
    /// Moods are clamped to `[-bound, bound]`.
    pub bound: f64,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            baseline: 0.0,
            persistence: 0.8,
            calm_noise: 0.5,
            turbulent_noise: 2.5,
            crisis_onset_probability: 0.05,
            crisis_recovery_probability: 0.3,
            bound: 10.0,
        }
    }
}

impl MoodConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.bound.is_finite() && self.bound > 0.0) {
            return Err(invalid(format!("mood bound must be positive, got {}", self.bound)));
        }
        if !(self.baseline.is_finite() && self.baseline.abs() <= self.bound) {
            return Err(invalid(format!(
                "mood baseline {} must lie within ±{}",
                self.baseline, self.bound
            )));
        }
        if !(0.0..1.0).contains(&self.persistence) {
            return Err(invalid(format!(
                "mood persistence must be in [0, 1), got {}",
                self.persistence
            )));
        }
        for (name, noise) in [
            ("calm_noise", self.calm_noise),
            ("turbulent_noise", self.turbulent_noise),
        ] {
            if !(noise.is_finite() && noise > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {noise}")));
            }
        }
        for (name, probability) in [
            ("crisis_onset_probability", self.crisis_onset_probability),
            ("crisis_recovery_probability", self.crisis_recovery_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(invalid(format!(
                    "{name} must be in [0, 1], got {probability}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_days: i64,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub volatility_threshold: f64,
    /// Number of preceding days the volatility measure compares against.
    pub volatility_window: usize,
    /// Strength of the mood tilt applied to weight-table draws.
    pub mood_bias: f64,
    pub mood: MoodConfig,
    pub category_weight_tables: BTreeMap<Category, WeightTable>,
    pub recorded_days: Vec<RecordedDay>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_days: 365,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            volatility_threshold: 1.5,
            volatility_window: 1,
            mood_bias: 0.25,
            mood: MoodConfig::default(),
            category_weight_tables: default_weight_tables(),
            recorded_days: Vec::new(),
        }
    }
}

/// STABLE clusters around 1.9; CRISIS is bimodal around 2.9.
pub fn default_weight_tables() -> BTreeMap<Category, WeightTable> {
    BTreeMap::from([
        (
            Category::Stable,
            WeightTable::from_pairs(&[(1.0, 0.35), (2.0, 0.40), (3.0, 0.25)]),
        ),
        (
            Category::Crisis,
            WeightTable::from_pairs(&[(0.0, 0.25), (1.0, 0.15), (4.0, 0.25), (5.0, 0.35)]),
        ),
    ])
}

impl SimulationConfig {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks every option; a run never starts on a config that fails here.
    pub fn validate(&self) -> Result<()> {
        let days = self.day_count()?;
        self.end_date(days)?;

        if !(self.volatility_threshold.is_finite() && self.volatility_threshold >= 0.0) {
            return Err(invalid(format!(
                "volatility_threshold must be a non-negative number, got {}",
                self.volatility_threshold
            )));
        }
        if self.volatility_window == 0 {
            return Err(invalid("volatility_window must be at least 1".to_string()));
        }
        check_mood_bias(self.mood_bias)?;
        self.mood.validate()?;

        for category in Category::ALL {
            let table = self.category_weight_tables.get(&category).ok_or_else(|| {
                invalid(format!("no weight table configured for {category}"))
            })?;
            table.validate(category)?;
        }

        self.validate_recorded_days(days)
    }

    pub fn day_count(&self) -> Result<usize> {
        if self.num_days <= 0 {
            return Err(SimError::InvalidParameter(format!(
                "num_days must be positive, got {}",
                self.num_days
            )));
        }
        u32::try_from(self.num_days)
            .map(|days| days as usize)
            .map_err(|_| {
                SimError::InvalidParameter(format!("num_days {} is too large", self.num_days))
            })
    }

    /// Calendar date of a 1-based day index.
    pub fn date_of(&self, day_index: u32) -> Result<NaiveDate> {
        let offset = u64::from(day_index.saturating_sub(1));
        self.start_date
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| {
                SimError::InvalidParameter(format!(
                    "day {day_index} after {} is outside the calendar",
                    self.start_date
                ))
            })
    }

    fn end_date(&self, days: usize) -> Result<NaiveDate> {
        self.date_of(days as u32)
    }

    fn validate_recorded_days(&self, days: usize) -> Result<()> {
        let end = self.end_date(days)?;
        for recorded in &self.recorded_days {
            if recorded.date < self.start_date || recorded.date > end {
                return Err(SimError::InvalidParameter(format!(
                    "recorded day {} is outside the simulated range {} to {}",
                    recorded.date, self.start_date, end
                )));
            }
            let score = recorded.utility_score;
            if !(MIN_UTILITY..=MAX_UTILITY).contains(&score) {
                return Err(invalid(format!(
                    "recorded day {} has utility {} outside [{}, {}]",
                    recorded.date, score, MIN_UTILITY, MAX_UTILITY
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidConfiguration(message)
}
