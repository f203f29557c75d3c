use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Volatility regime of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Category {
    Stable,
    Crisis,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Stable, Category::Crisis];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Crisis => "Crisis",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" | "routine" => Ok(Self::Stable),
            "crisis" => Ok(Self::Crisis),
            other => Err(SimError::InvalidConfiguration(format!(
                "unknown category '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where a day's category and utility came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DaySource {
    Simulated,
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub day_index: u32,
    pub date: NaiveDate,
    pub mood_value: f64,
    pub volatility: f64,
    pub category: Category,
    pub utility_score: f64,
    pub source: DaySource,
}

/// A remembered real day that replaces the simulated one for the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDay {
    pub date: NaiveDate,
    pub category: Category,
    pub utility_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    /// NaN when `count == 0`.
    pub mean_utility: f64,
    /// Population variance; NaN when `count == 0`.
    pub variance_utility: f64,
    pub std_dev_utility: f64,
    pub sample_values: Vec<f64>,
}

impl CategorySummary {
    /// First quartile, median and third quartile with linear interpolation.
    pub fn quartiles(&self) -> Option<(f64, f64, f64)> {
        if self.sample_values.is_empty() {
            return None;
        }

        let mut sorted = self.sample_values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some((
            percentile(&sorted, 0.25),
            percentile(&sorted, 0.5),
            percentile(&sorted, 0.75),
        ))
    }
}

fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let rank = fraction * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
