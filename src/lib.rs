pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod mood;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod volatility;

pub use config::{MoodConfig, SimulationConfig};
pub use error::{SimError, SimWarning};
pub use models::{Category, CategorySummary, DayRecord, DaySource, RecordedDay};
pub use pipeline::{run, run_batch, BatchOutcome, SimulationOutput};
