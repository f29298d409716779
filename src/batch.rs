//! Predicts a CSV file of patients in one run.
//!
//! Input rows carry the same snake_case columns as [`PatientRecord`], with
//! categorical values written as their labels. Each row goes through the
//! same pipeline as a single form submission.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use clap::ValueEnum;
use log::{debug, info};
use serde::Serialize;

use crate::codec::{
    ChestPainType, ExerciseAngina, FastingBloodSugar, RestingEcg, Sex, Slope, Thal,
};
use crate::error::{HeartError, Result};
use crate::features::OldpeakMode;
use crate::pipeline::predict_record;
use crate::predictor::Predictor;
use crate::records::PatientRecord;
use crate::report::PredictionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// A prediction as written to the CSV output: the inputs plus the outcome.
#[derive(Debug, Serialize)]
struct OutputRow {
    age: u32,
    sex: Sex,
    chest_pain_type: ChestPainType,
    resting_bp: u32,
    cholesterol: u32,
    fasting_bs: FastingBloodSugar,
    resting_ecg: RestingEcg,
    max_heart_rate: u32,
    exercise_angina: ExerciseAngina,
    oldpeak: f64,
    slope: Slope,
    major_vessels: u32,
    thal: Thal,
    class_code: i32,
    diagnosis: &'static str,
}

impl OutputRow {
    fn new(record: PatientRecord, report: &PredictionReport) -> Self {
        OutputRow {
            age: record.age,
            sex: record.sex,
            chest_pain_type: record.chest_pain_type,
            resting_bp: record.resting_bp,
            cholesterol: record.cholesterol,
            fasting_bs: record.fasting_bs,
            resting_ecg: record.resting_ecg,
            max_heart_rate: record.max_heart_rate,
            exercise_angina: record.exercise_angina,
            oldpeak: record.oldpeak,
            slope: record.slope,
            major_vessels: record.major_vessels,
            thal: record.thal,
            class_code: report.class_code,
            diagnosis: report.diagnosis,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub positive: usize,
}

/// Like [`run_batch`], but the file at `path` is only created once every row
/// has been predicted. A failed run leaves any existing file untouched.
pub fn run_batch_to_file<R: Read, P: AsRef<Path>>(
    predictor: &dyn Predictor,
    input: R,
    path: P,
    format: OutputFormat,
    oldpeak: OldpeakMode,
) -> Result<BatchSummary> {
    let mut buffer = Vec::new();
    let summary = run_batch(predictor, input, &mut buffer, format, oldpeak)?;
    fs::write(path, buffer)?;
    Ok(summary)
}

/// Reads every row from `input`, predicts it, and writes the results to
/// `output`. The first bad row stops the run and nothing is written.
pub fn run_batch<R: Read, W: Write>(
    predictor: &dyn Predictor,
    input: R,
    output: W,
    format: OutputFormat,
    oldpeak: OldpeakMode,
) -> Result<BatchSummary> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);

    let mut predictions = Vec::new();
    for (i, row) in reader.deserialize::<PatientRecord>().enumerate() {
        let row_number = i + 1;
        let wrap = |source: HeartError| HeartError::BatchRow {
            row: row_number,
            source: Box::new(source),
        };
        let record = row.map_err(|e| wrap(e.into()))?;
        let report = predict_record(predictor, &record, oldpeak).map_err(wrap)?;
        debug!("row {}: {}", row_number, report.diagnosis);
        predictions.push((record, report));
    }

    let summary = BatchSummary {
        rows: predictions.len(),
        positive: predictions.iter().filter(|(_, r)| r.class_code == 1).count(),
    };

    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(output);
            for (record, report) in predictions {
                writer.serialize(OutputRow::new(record, &report))?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let reports: Vec<&PredictionReport> = predictions.iter().map(|(_, r)| r).collect();
            serde_json::to_writer_pretty(output, &reports)?;
        }
    }

    info!(
        "predicted {} rows, {} with heart disease",
        summary.rows, summary.positive
    );
    Ok(summary)
}
