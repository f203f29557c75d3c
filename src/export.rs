use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::{Result, SimWarning};
use crate::models::{Category, CategorySummary, DayRecord, RecordedDay};
use crate::pipeline::SimulationOutput;

/// Writes one CSV row per day:
/// `day_index,date,mood_value,volatility,category,utility_score,source`.
pub fn write_day_table<W: Write>(records: &[DayRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_day_table_to_path(records: &[DayRecord], path: &Path) -> Result<()> {
    write_day_table(records, BufWriter::new(File::create(path)?))
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    config: &'a SimulationConfig,
    summaries: &'a BTreeMap<Category, CategorySummary>,
    warnings: &'a [SimWarning],
}

/// Pretty JSON of the config, per-category summaries and warnings. Undefined
/// statistics of empty categories come out as `null`.
pub fn write_summary_json<W: Write>(
    config: &SimulationConfig,
    output: &SimulationOutput,
    writer: W,
) -> Result<()> {
    let document = SummaryDocument {
        config,
        summaries: &output.summaries,
        warnings: &output.warnings,
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

pub fn write_summary_json_to_path(
    config: &SimulationConfig,
    output: &SimulationOutput,
    path: &Path,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_summary_json(config, output, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads `date,category,utility_score` rows. Range checks happen when the
/// config holding them is validated.
pub fn read_recorded_days<R: Read>(reader: R) -> Result<Vec<RecordedDay>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut recorded = Vec::new();
    for row in csv_reader.deserialize::<RecordedDay>() {
        recorded.push(row?);
    }
    Ok(recorded)
}

pub fn load_recorded_days(path: &Path) -> Result<Vec<RecordedDay>> {
    read_recorded_days(File::open(path)?)
}
