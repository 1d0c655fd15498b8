//! Parquet snapshot read/write operations
//!
//! A snapshot holds one row per feedback item. Timestamps are stored as
//! RFC 3339 strings, metrics and tags as JSON text.

use crate::models::{Feedback, MetricValue};
use crate::{Error, Result};
use arrow_array::{Array, ArrayRef, RecordBatch, StringArray, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Return the Arrow schema shared by snapshot writers and readers.
#[must_use]
pub fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("plan_id", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("severity", DataType::Utf8, false),
        Field::new("status", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("description", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("updated_at", DataType::Utf8, false),
        Field::new("step_index", DataType::UInt32, true),
        Field::new("metrics_json", DataType::Utf8, false),
        Field::new("tags_json", DataType::Utf8, false),
    ]))
}

/// Write feedback to a Parquet file, creating parent directories.
pub fn write_snapshot<P: AsRef<Path>>(path: P, feedbacks: &[Feedback]) -> Result<()> {
    let file_path = path.as_ref();
    for feedback in feedbacks {
        super::ensure_finite_metrics(feedback)?;
    }

    if let Some(parent) = file_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(file_path)?;
    let schema = snapshot_schema();
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    if !feedbacks.is_empty() {
        let batch = create_feedback_batch(&schema, feedbacks)?;
        writer.write(&batch)?;
    }

    writer.close()?;
    log::debug!(
        "Wrote {} feedback to snapshot {}",
        feedbacks.len(),
        file_path.display()
    );
    Ok(())
}

/// Read every feedback row from a Parquet snapshot.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<Feedback>> {
    let file = File::open(path.as_ref())?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut feedbacks = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            feedbacks.push(extract_feedback(&batch, row)?);
        }
    }
    Ok(feedbacks)
}

pub fn create_feedback_batch(schema: &Arc<Schema>, feedbacks: &[Feedback]) -> Result<RecordBatch> {
    let created: Vec<String> = feedbacks
        .iter()
        .map(|f| format_time(f.created_at))
        .collect::<Result<_>>()?;
    let updated: Vec<String> = feedbacks
        .iter()
        .map(|f| format_time(f.updated_at))
        .collect::<Result<_>>()?;
    let metrics: Vec<String> = feedbacks
        .iter()
        .map(|f| serde_json::to_string(&f.metrics))
        .collect::<serde_json::Result<_>>()?;
    let tags: Vec<String> = feedbacks
        .iter()
        .map(|f| serde_json::to_string(&f.tags))
        .collect::<serde_json::Result<_>>()?;

    let string_column = |values: Vec<&str>| -> ArrayRef { Arc::new(StringArray::from(values)) };

    let columns: Vec<ArrayRef> = vec![
        string_column(feedbacks.iter().map(|f| f.id.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.plan_id.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.feedback_type.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.severity.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.status.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.title.as_str()).collect()),
        string_column(feedbacks.iter().map(|f| f.description.as_str()).collect()),
        string_column(created.iter().map(String::as_str).collect()),
        string_column(updated.iter().map(String::as_str).collect()),
        Arc::new(UInt32Array::from(
            feedbacks.iter().map(|f| f.step_index).collect::<Vec<_>>(),
        )),
        string_column(metrics.iter().map(String::as_str).collect()),
        string_column(tags.iter().map(String::as_str).collect()),
    ];

    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

fn extract_feedback(batch: &RecordBatch, row: usize) -> Result<Feedback> {
    let required = |col: &str| -> Result<String> {
        get_string_value(batch, col, row)?
            .ok_or_else(|| Error::InvalidData(format!("Missing {col} in row {row}")))
    };

    let feedback_type = parse_enum(&required("type")?, "type")?;
    let severity = parse_enum(&required("severity")?, "severity")?;
    let status = parse_enum(&required("status")?, "status")?;

    let metrics: BTreeMap<String, MetricValue> = serde_json::from_str(&required("metrics_json")?)?;
    let tags: Vec<String> = serde_json::from_str(&required("tags_json")?)?;

    Ok(Feedback {
        id: required("id")?,
        plan_id: required("plan_id")?,
        feedback_type,
        severity,
        status,
        title: required("title")?,
        description: required("description")?,
        created_at: parse_time(&required("created_at")?)?,
        updated_at: parse_time(&required("updated_at")?)?,
        step_index: get_u32_value(batch, "step_index", row)?,
        metrics,
        tags,
    })
}

fn parse_enum<T: FromStr<Err = String>>(raw: &str, col: &str) -> Result<T> {
    raw.parse()
        .map_err(|e| Error::InvalidData(format!("Invalid {col}: {e}")))
}

fn format_time(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339)
        .map_err(|e| Error::InvalidData(format!("Unformattable timestamp: {e}")))
}

fn parse_time(raw: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| Error::InvalidData(format!("Invalid timestamp {raw:?}: {e}")))
}

fn get_string_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<String>> {
    let col = batch
        .column_by_name(col_name)
        .ok_or_else(|| Error::InvalidData(format!("Missing column: {col_name}")))?;

    let array = col
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::InvalidData(format!("Invalid type for: {col_name}")))?;

    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row).to_string()))
    }
}

fn get_u32_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<u32>> {
    let col = batch
        .column_by_name(col_name)
        .ok_or_else(|| Error::InvalidData(format!("Missing column: {col_name}")))?;

    let array = col
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| Error::InvalidData(format!("Invalid type for: {col_name}")))?;

    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row)))
    }
}
