//! Exercise history scrubbing.
//!
//! A client looking at one exercise steps through the sessions where it was
//! performed, newest first. Each request names a reference date and an offset
//! relative to it; the answer is the entry at that position plus its immediate
//! neighbours, so the UI can show "previous" and "next" without refetching the
//! whole history.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{date_format, Workout};

/// One performance of an exercise: the workout plus the session it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub session_id: String,
    pub name: String,
    #[serde(serialize_with = "date_format::serialize")]
    pub date: NaiveDate,
    pub location: String,
    pub workout: Workout,
}

/// Anything positioned on the history timeline.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for HistoryEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryWindow<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub older_session: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newer_session: Option<T>,
}

impl<T> Default for HistoryWindow<T> {
    fn default() -> Self {
        Self {
            session: None,
            older_session: None,
            newer_session: None,
        }
    }
}

/// Position of `reference` in `entries`, which must be sorted newest first.
///
/// A reference on or before the oldest entry anchors at the oldest entry;
/// otherwise the anchor is the first entry dated on or before the reference.
pub fn anchor_index<T: Dated>(entries: &[T], reference: NaiveDate) -> Option<usize> {
    let oldest = entries.last()?;
    if reference <= oldest.date() {
        return Some(entries.len() - 1);
    }
    entries.iter().position(|entry| entry.date() <= reference)
}

/// Entry at `anchor + offset` together with its older and newer neighbours.
///
/// Positions outside `entries` are left empty rather than clamped.
pub fn window<T: Dated + Clone>(
    entries: &[T],
    reference: NaiveDate,
    offset: i64,
) -> HistoryWindow<T> {
    let Some(anchor) = anchor_index(entries, reference) else {
        return HistoryWindow::default();
    };
    let index = (anchor as i64).saturating_add(offset);
    let at = |i: i64| -> Option<T> {
        usize::try_from(i)
            .ok()
            .and_then(|i| entries.get(i))
            .cloned()
    };

    HistoryWindow {
        session: at(index),
        older_session: at(index.saturating_add(1)),
        newer_session: at(index.saturating_sub(1)),
    }
}
