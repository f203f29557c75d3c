use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub volatility: f64,
    pub category: Category,
}

/// Absolute deviation of each mood from the mean of the up-to `window`
/// preceding moods. The first day has no history and measures zero.
pub fn volatility_measures(moods: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    moods
        .iter()
        .enumerate()
        .map(|(index, mood)| {
            let history = &moods[index.saturating_sub(window)..index];
            if history.is_empty() {
                0.0
            } else {
                let mean = history.iter().sum::<f64>() / history.len() as f64;
                (mood - mean).abs()
            }
        })
        .collect()
}

/// A measure equal to the threshold is still stable.
pub fn categorize(volatility: f64, threshold: f64) -> Category {
    if volatility > threshold {
        Category::Crisis
    } else {
        Category::Stable
    }
}

pub fn classify(moods: &[f64], threshold: f64, window: usize) -> Vec<Classification> {
    volatility_measures(moods, window)
        .into_iter()
        .map(|volatility| Classification {
            volatility,
            category: categorize(volatility, threshold),
        })
        .collect()
}
