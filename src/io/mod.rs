//! Persistence: JSON file store and Parquet snapshots

pub mod snapshot;
pub mod storage;

use crate::models::Feedback;
use crate::{Error, Result};

/// JSON writes NaN and infinity as `null`, which would not load back.
pub(crate) fn ensure_finite_metrics(feedback: &Feedback) -> Result<()> {
    match feedback.non_finite_metric() {
        Some(name) => Err(Error::InvalidInput(format!(
            "feedback {}: metric {name} is not a finite number",
            feedback.id
        ))),
        None => Ok(()),
    }
}
