//! Visit journal matching
//!
//! Journal entries name the place they were written about. Every POI whose name equals
//! such a place name exactly is annotated as visited, with the emotion found in the
//! entry text and the entry date. Matching is by name only.

use std::collections::HashMap;

use chrono::{Local, NaiveDate, TimeZone};

use crate::dto::JournalEntry;
use crate::model::Poi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitEmotion {
    pub emoji: char,
    pub name: &'static str,
    pub color: u32,
}

pub const VISIT_EMOTIONS: [VisitEmotion; 6] = [
    VisitEmotion {
        emoji: '😍',
        name: "Delightful",
        color: 0xE91E63,
    },
    VisitEmotion {
        emoji: '😊',
        name: "Liked it",
        color: 0x4CAF50,
    },
    VisitEmotion {
        emoji: '🙂',
        name: "Not bad",
        color: 0x2196F3,
    },
    VisitEmotion {
        emoji: '😐',
        name: "Ordinary",
        color: 0x9E9E9E,
    },
    VisitEmotion {
        emoji: '😞',
        name: "Disappointing",
        color: 0xFF9800,
    },
    VisitEmotion {
        emoji: '😤',
        name: "Terrible",
        color: 0xF44336,
    },
];

/// What the journal says about one place
#[derive(Debug, Clone, PartialEq)]
pub struct JournalVisit {
    pub emotion: Option<&'static str>,
    /// Epoch milliseconds
    pub date: i64,
}

/// First emoji in `text` (in reading order) that names a known emotion
pub fn parse_emotion(text: &str) -> Option<&'static VisitEmotion> {
    text.chars()
        .find_map(|c| VISIT_EMOTIONS.iter().find(|e| e.emoji == c))
}

pub fn emotion_by_name(name: &str) -> Option<&'static VisitEmotion> {
    VISIT_EMOTIONS.iter().find(|e| e.name == name)
}

/// Local midnight of `date` in epoch milliseconds
pub fn local_midnight_millis(date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

pub fn today_start_millis() -> i64 {
    let now = Local::now();
    local_midnight_millis(now.date_naive()).unwrap_or_else(|| now.timestamp_millis())
}

/// `YYYY-MM-DD` → local midnight in epoch milliseconds, `now_ms` when unparseable
pub fn parse_visit_date(date: &str, now_ms: i64) -> i64 {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(local_midnight_millis)
    {
        Some(ms) => ms,
        None => {
            tracing::warn!(date, "Unparseable journal date, using now");
            now_ms
        }
    }
}

/// Place name → visit, for entries that name a place. Later entries win.
pub fn build_journal_map(entries: &[JournalEntry], now_ms: i64) -> HashMap<String, JournalVisit> {
    entries
        .iter()
        .filter_map(|entry| {
            let place = entry.poi_name.as_ref()?;
            let visit = JournalVisit {
                emotion: parse_emotion(&entry.text).map(|e| e.name),
                date: parse_visit_date(&entry.date, now_ms),
            };
            tracing::trace!(place = %place, emotion = ?visit.emotion, date = visit.date, "Journal entry");
            Some((place.clone(), visit))
        })
        .collect()
}

/// New POI values with journal annotations applied by exact name
pub fn annotate_pois(pois: Vec<Poi>, journal: &HashMap<String, JournalVisit>) -> Vec<Poi> {
    let mut matched = 0usize;
    let total = pois.len();
    let annotated: Vec<Poi> = pois
        .into_iter()
        .map(|poi| match journal.get(&poi.name) {
            Some(visit) => {
                matched += 1;
                Poi {
                    is_visited: true,
                    impression: visit.emotion.map(str::to_string),
                    visit_date: Some(visit.date),
                    ..poi
                }
            }
            None => poi,
        })
        .collect();
    tracing::debug!(matched, total, "Matched POIs with journal");
    annotated
}
