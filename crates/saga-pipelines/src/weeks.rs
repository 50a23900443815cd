//! Calendar-week partition of an ordered message log.
//!
//! A chunk ends on the Sunday of the Monday-to-Sunday week that contains its
//! first message. The first message dated after that Sunday opens the next
//! chunk, whose boundary is computed from its own date. Chunks are contiguous
//! slices of the input; an empty log yields no chunks.

use chrono::{Datelike, Duration, NaiveDate};
use saga_core::{Message, Result, SagaError};

/// Sunday closing the week that contains `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Split `messages` into weekly chunks.
///
/// Every timestamp must parse; an unparseable `ts` is a
/// [`SagaError::Timestamp`] because the partition would be undefined.
pub fn partition_by_week(messages: &[Message]) -> Result<Vec<&[Message]>> {
    let dates = messages
        .iter()
        .map(|msg| {
            msg.date().ok_or_else(|| SagaError::Timestamp {
                id: msg.id.clone(),
                ts: msg.ts.clone(),
            })
        })
        .collect::<Result<Vec<NaiveDate>>>()?;

    let Some(&first) = dates.first() else {
        return Ok(Vec::new());
    };

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut boundary = end_of_week(first);
    for (index, &date) in dates.iter().enumerate().skip(1) {
        if date > boundary {
            chunks.push(&messages[start..index]);
            start = index;
            boundary = end_of_week(date);
        }
    }
    chunks.push(&messages[start..]);
    Ok(chunks)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
