//! CSV loading of event rows.
//!
//! Rows are matched to the `date,time,category,description,location` header
//! by column name. Rows whose date or time cannot be parsed are skipped and
//! reported instead of failing the whole load.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::EventlineError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRow {
    /// Calendar day of the event.
    pub day: NaiveDate,
    /// Wall-clock time as it appeared in the file.
    pub time: String,
    /// Minutes since midnight, 0..=1439.
    pub minutes: u16,
    pub category: String,
    pub description: String,
    pub location: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the source file, when known.
    pub line: Option<u64>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct LoadedEvents {
    pub events: Vec<EventRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse `H:MM` / `HH:MM` 24-hour wall time into minutes since midnight.
pub fn parse_time_of_day(input: &str) -> Result<u16, EventlineError> {
    let invalid = || EventlineError::InvalidTime(input.to_string());
    let (hour, minute) = input.trim().split_once(':').ok_or_else(invalid)?;
    let hour = parse_clock_field(hour).ok_or_else(invalid)?;
    let minute = parse_clock_field(minute).ok_or_else(invalid)?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

fn parse_clock_field(field: &str) -> Option<u16> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parse a calendar day. Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, or a date-time
/// whose first ten characters are one of those (`2024-01-01T10:00:00`).
pub fn parse_day(input: &str) -> Result<NaiveDate, EventlineError> {
    let trimmed = input.trim();
    let date_part = match trimmed.get(..10) {
        Some(head) if trimmed.len() > 10 => {
            let sep = trimmed[10..].chars().next();
            if matches!(sep, Some('T') | Some(' ')) {
                head
            } else {
                trimmed
            }
        }
        _ => trimmed,
    };
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| EventlineError::InvalidDate(input.to_string()))
}

struct Columns {
    date: usize,
    time: usize,
    category: usize,
    description: usize,
    location: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, EventlineError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(EventlineError::MissingColumn(name))
        };
        Ok(Self {
            date: find("date")?,
            time: find("time")?,
            category: find("category")?,
            description: find("description")?,
            location: find("location")?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<EventRow, EventlineError> {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let day = parse_day(field(self.date))?;
        let time = field(self.time).to_string();
        let minutes = parse_time_of_day(&time)?;
        Ok(EventRow {
            day,
            time,
            minutes,
            category: field(self.category).to_string(),
            description: field(self.description).to_string(),
            location: field(self.location).to_string(),
        })
    }
}

/// Load events from CSV bytes, preserving row order.
pub fn load_events(input: &[u8]) -> Result<LoadedEvents, EventlineError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut loaded = LoadedEvents::default();
    for result in reader.records() {
        let parsed = result
            .map_err(|err| {
                let line = err.position().map(|p| p.line());
                (line, err.to_string())
            })
            .and_then(|record| {
                let line = record.position().map(|p| p.line());
                columns
                    .parse(&record)
                    .map_err(|err| (line, err.to_string()))
            });
        match parsed {
            Ok(event) => loaded.events.push(event),
            Err((line, reason)) => {
                warn!(line = ?line, %reason, "skipping malformed event row");
                loaded.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    debug!(
        events = loaded.events.len(),
        skipped = loaded.skipped.len(),
        "loaded event rows"
    );
    Ok(loaded)
}
