use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::Category;

pub const MIN_UTILITY: f64 = 0.0;
pub const MAX_UTILITY: f64 = 5.0;
/// Largest accepted `|mood_bias|`; keeps every tilt exponent finite.
pub const MAX_MOOD_BIAS: f64 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedOutcome {
    pub value: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    outcomes: Vec<WeightedOutcome>,
}

impl WeightTable {
    pub fn new(outcomes: Vec<WeightedOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(value, weight)| WeightedOutcome { value, weight })
                .collect(),
        )
    }

    pub fn outcomes(&self) -> &[WeightedOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn total_weight(&self) -> f64 {
        self.outcomes.iter().map(|o| o.weight).sum()
    }

    /// Expected utility of an untilted draw.
    pub fn mean(&self) -> f64 {
        let total = self.total_weight();
        self.outcomes.iter().map(|o| o.value * o.weight).sum::<f64>() / total
    }

    pub fn variance(&self) -> f64 {
        let total = self.total_weight();
        let mean = self.mean();
        self.outcomes
            .iter()
            .map(|o| o.weight * (o.value - mean).powi(2))
            .sum::<f64>()
            / total
    }

    pub fn validate(&self, category: Category) -> Result<()> {
        if self.outcomes.is_empty() {
            return Err(SimError::InvalidConfiguration(format!(
                "weight table for {category} is empty"
            )));
        }

        for outcome in &self.outcomes {
            if !(outcome.weight.is_finite() && outcome.weight >= 0.0) {
                return Err(SimError::InvalidConfiguration(format!(
                    "weight table for {category} has invalid weight {}",
                    outcome.weight
                )));
            }
            if !(MIN_UTILITY..=MAX_UTILITY).contains(&outcome.value) {
                return Err(SimError::InvalidConfiguration(format!(
                    "weight table for {category} has value {} outside [{MIN_UTILITY}, {MAX_UTILITY}]",
                    outcome.value
                )));
            }
        }

        let total = self.total_weight();
        if !(total.is_finite() && total > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "weight table for {category} needs a positive, finite total weight, got {total}"
            )));
        }

        Ok(())
    }
}

pub fn check_mood_bias(mood_bias: f64) -> Result<()> {
    if !(mood_bias.is_finite() && mood_bias.abs() <= MAX_MOOD_BIAS) {
        return Err(SimError::InvalidConfiguration(format!(
            "mood_bias must be within ±{MAX_MOOD_BIAS}, got {mood_bias}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct UtilityScorer {
    tables: BTreeMap<Category, WeightTable>,
    mood_bias: f64,
}

impl UtilityScorer {
    pub fn new(tables: &BTreeMap<Category, WeightTable>, mood_bias: f64) -> Result<Self> {
        for category in Category::ALL {
            tables
                .get(&category)
                .ok_or_else(|| {
                    SimError::InvalidConfiguration(format!(
                        "no weight table configured for {category}"
                    ))
                })?
                .validate(category)?;
        }
        check_mood_bias(mood_bias)?;

        Ok(Self {
            tables: tables.clone(),
            mood_bias,
        })
    }

    pub fn table(&self, category: Category) -> Option<&WeightTable> {
        self.tables.get(&category)
    }

    /// Weights after the mood tilt. Positive moods favour outcomes above the
    /// table mean; `mood_bias == 0` leaves the table unchanged.
    ///
    /// Exponents are shifted by the largest one among positive-weight
    /// outcomes, so every tilt factor lies in (0, 1] and the favoured outcome
    /// keeps its configured weight.
    pub fn tilted_weights(&self, mood_value: f64, category: Category) -> Result<Vec<f64>> {
        let table = self.table(category).ok_or_else(|| {
            SimError::InvalidConfiguration(format!("no weight table configured for {category}"))
        })?;
        let mean = table.mean();
        let pull = self.mood_bias * mood_value.tanh();
        let exponent = |value: f64| pull * (value - mean) / MAX_UTILITY;

        let peak = table
            .outcomes()
            .iter()
            .filter(|o| o.weight > 0.0)
            .map(|o| exponent(o.value))
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(table
            .outcomes()
            .iter()
            .map(|o| {
                if o.weight > 0.0 {
                    o.weight * (exponent(o.value) - peak).exp()
                } else {
                    0.0
                }
            })
            .collect())
    }

    pub fn score<R: Rng + ?Sized>(
        &self,
        mood_value: f64,
        category: Category,
        rng: &mut R,
    ) -> Result<f64> {
        let weights = self.tilted_weights(mood_value, category)?;
        let index = WeightedIndex::new(&weights).map_err(|err| {
            SimError::InvalidConfiguration(format!("weight table for {category}: {err}"))
        })?;
        let outcome = self.tables[&category].outcomes()[index.sample(rng)];
        Ok(outcome.value.clamp(MIN_UTILITY, MAX_UTILITY))
    }
}
