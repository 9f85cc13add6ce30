use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

pub const FORWARD_CYCLES: usize = 12;
pub const BACKWARD_CYCLES: usize = 3;

/// Fixed luteal-phase assumption: ovulation is projected 14 days before
/// each predicted period start, independent of cycle length.
const OVULATION_OFFSET_DAYS: i64 = 14;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("Cycle length must be at least one day")]
    NonPositiveCycleLength,
}

/// Project period start dates around `last_start`: the seed itself, twelve
/// cycles forward and three back, deduplicated by date.
pub fn predict_period_starts(
    last_start: NaiveDate,
    cycle_length: i32,
) -> Result<BTreeSet<NaiveDate>, PredictionError> {
    if cycle_length < 1 {
        return Err(PredictionError::NonPositiveCycleLength);
    }
    let step = Duration::days(cycle_length as i64);

    let mut starts = BTreeSet::new();
    starts.insert(last_start);

    let mut cursor = last_start;
    for _ in 0..FORWARD_CYCLES {
        cursor += step;
        starts.insert(cursor);
    }

    cursor = last_start;
    for _ in 0..BACKWARD_CYCLES {
        cursor -= step;
        starts.insert(cursor);
    }

    Ok(starts)
}

pub fn predict_ovulation_days(
    last_start: NaiveDate,
    cycle_length: i32,
) -> Result<BTreeSet<NaiveDate>, PredictionError> {
    let starts = predict_period_starts(last_start, cycle_length)?;
    Ok(starts
        .into_iter()
        .map(|start| start - Duration::days(OVULATION_OFFSET_DAYS))
        .collect())
}
