//! Session filtering
//!
//! A filter is conjunctive: a record must pass every populated criterion.
//! Filtering happens once, before aggregation, so every view downstream
//! sees the same subset.

use chrono::NaiveDate;

use crate::types::SessionRecord;

/// Studio locations that appear in the exports
pub const KNOWN_LOCATIONS: [&str; 3] = [
    "Kwality House, Kemps Corner",
    "Supreme HQ, Bandra",
    "Kenkere House, Bengaluru",
];

/// Resolve a location query against the known studios, exact first and
/// then case-insensitive substring.
pub fn resolve_location(query: &str) -> Option<&'static str> {
    if let Some(&loc) = KNOWN_LOCATIONS.iter().find(|&&loc| loc == query) {
        return Some(loc);
    }
    let lowered = query.to_lowercase();
    KNOWN_LOCATIONS
        .iter()
        .find(|loc| loc.to_lowercase().contains(&lowered))
        .copied()
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub location: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub class_formats: Vec<String>,
    pub trainers: Vec<String>,
}

impl SessionFilter {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.class_formats.is_empty()
            && self.trainers.is_empty()
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        if let Some(query) = &self.location {
            let lowered = query.to_lowercase();
            let hit = record.location.as_deref().is_some_and(|loc| {
                loc == query.as_str() || loc.to_lowercase().contains(&lowered)
            });
            if !hit {
                return false;
            }
        }

        if let Some(from) = self.from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.date > to {
                return false;
            }
        }

        if !self.class_formats.is_empty() {
            let format = record.class_format();
            if !self
                .class_formats
                .iter()
                .any(|f| f.eq_ignore_ascii_case(format.as_str()))
            {
                return false;
            }
        }

        if !self.trainers.is_empty() {
            let hit = record.trainer_name.as_deref().is_some_and(|trainer| {
                self.trainers.iter().any(|t| t.eq_ignore_ascii_case(trainer))
            });
            if !hit {
                return false;
            }
        }

        true
    }

    /// Keep matching records, preserving input order
    pub fn apply(&self, records: &[SessionRecord]) -> Vec<SessionRecord> {
        if self.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// Distinct class formats present in the records, sorted
pub fn available_formats(records: &[SessionRecord]) -> Vec<String> {
    let mut formats: Vec<String> = records
        .iter()
        .map(|r| r.class_format().as_str().to_string())
        .collect();
    formats.sort();
    formats.dedup();
    formats
}

/// Distinct trainer names present in the records, sorted
pub fn available_trainers(records: &[SessionRecord]) -> Vec<String> {
    let mut trainers: Vec<String> = records
        .iter()
        .filter_map(|r| r.trainer_name.clone())
        .collect();
    trainers.sort();
    trainers.dedup();
    trainers
}
