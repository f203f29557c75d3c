use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::MoodConfig;
use crate::error::{Result, SimError};

/// Capacity reserved up front; longer runs grow the vector as they go.
const PREALLOCATED_DAYS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    Calm,
    Turbulent,
}

pub struct MoodGenerator {
    config: MoodConfig,
    calm: Normal<f64>,
    turbulent: Normal<f64>,
}

impl MoodGenerator {
    pub fn new(config: &MoodConfig) -> Result<Self> {
        config.validate()?;
        let calm = Normal::new(0.0, config.calm_noise)
            .map_err(|err| SimError::InvalidConfiguration(format!("calm_noise: {err}")))?;
        let turbulent = Normal::new(0.0, config.turbulent_noise)
            .map_err(|err| SimError::InvalidConfiguration(format!("turbulent_noise: {err}")))?;

        Ok(Self {
            config: config.clone(),
            calm,
            turbulent,
        })
    }

    /// Draws `num_days` moods from `rng`. The same generator and an equally
    /// seeded `rng` always produce the same sequence.
    pub fn generate<R: Rng + ?Sized>(&self, num_days: i64, rng: &mut R) -> Result<Vec<f64>> {
        if num_days <= 0 {
            return Err(SimError::InvalidParameter(format!(
                "num_days must be positive, got {num_days}"
            )));
        }
        let days = u32::try_from(num_days).map_err(|_| {
            SimError::InvalidParameter(format!("num_days {num_days} is too large"))
        })? as usize;

        let cfg = &self.config;
        let mut regime = Regime::Calm;
        let mut mood = cfg.baseline;
        let mut moods = Vec::with_capacity(days.min(PREALLOCATED_DAYS));

        for _ in 0..days {
            regime = match regime {
                Regime::Calm if rng.gen_bool(cfg.crisis_onset_probability) => Regime::Turbulent,
                Regime::Turbulent if rng.gen_bool(cfg.crisis_recovery_probability) => {
                    Regime::Calm
                }
                current => current,
            };

            let shock = match regime {
                Regime::Calm => self.calm.sample(rng),
                Regime::Turbulent => self.turbulent.sample(rng),
            };

            mood = (cfg.baseline + cfg.persistence * (mood - cfg.baseline) + shock)
                .clamp(-cfg.bound, cfg.bound);
            moods.push(mood);
        }

        Ok(moods)
    }
}
