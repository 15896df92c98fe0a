//! CSV loading for studio session exports
//!
//! Discovers export files, parses them in parallel, and hands back clean
//! `SessionRecord`s. Rows whose date cannot be parsed are dropped and
//! counted, never silently bucketed.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Deserialize;

use crate::services::normalizer::clean_class_name;
use crate::types::{Result, SessionRecord, StudioError};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// One row as it appears in the export, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    cleaned_class: Option<String>,
    #[serde(default)]
    class_type: Option<String>,
    #[serde(default)]
    trainer_name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    checked_in_count: Option<String>,
    #[serde(default)]
    capacity: Option<String>,
    #[serde(default)]
    total_paid: Option<String>,
    #[serde(default)]
    booked_count: Option<String>,
    #[serde(default)]
    late_cancelled_count: Option<String>,
    #[serde(default)]
    new_client_count: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    day_of_week: Option<String>,
}

impl RawRow {
    /// Validate into a `SessionRecord`. `None` means the row has no
    /// usable date and must be skipped.
    fn into_record(self) -> Option<SessionRecord> {
        let date = parse_date(self.date.as_deref()?)?;
        Some(SessionRecord {
            date,
            cleaned_class: self.cleaned_class.as_deref().and_then(clean_class_name),
            class_type: self.class_type.as_deref().and_then(clean_class_name),
            trainer_name: clean_optional(self.trainer_name),
            location: clean_optional(self.location),
            checked_in_count: parse_count(self.checked_in_count.as_deref()),
            capacity: parse_count(self.capacity.as_deref()),
            total_paid: parse_amount(self.total_paid.as_deref()),
            booked_count: parse_count(self.booked_count.as_deref()),
            late_cancelled_count: parse_count(self.late_cancelled_count.as_deref()),
            new_client_count: parse_count(self.new_client_count.as_deref()),
            time: clean_optional(self.time),
            day_of_week: clean_optional(self.day_of_week),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

fn parse_count(raw: Option<&str>) -> u32 {
    raw.map_or(0, |v| v.trim().parse().unwrap_or(0))
}

fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map_or(0.0, |v| {
        v.trim().replace(',', "").parse().unwrap_or(0.0)
    })
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Result of loading every discovered export
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Valid records, sorted by date
    pub records: Vec<SessionRecord>,
    /// Rows dropped because their date failed to parse
    pub skipped_rows: usize,
    /// Number of files read
    pub files: usize,
}

/// Loader rooted at a file or a directory of `*.csv` exports
pub struct DataLoader {
    root: PathBuf,
}

impl DataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory used when no path is given on the
    /// command line.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "studiopulse")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn load(&self) -> Result<LoadResult> {
        let files = self.discover()?;
        if files.is_empty() {
            return Err(StudioError::Data(format!(
                "no csv exports found under {}",
                self.root.display()
            )));
        }

        let parsed: Vec<(Vec<SessionRecord>, usize)> = files
            .par_iter()
            .map(|path| load_file(path))
            .collect::<Result<Vec<_>>>()?;

        let mut result = LoadResult {
            files: files.len(),
            ..LoadResult::default()
        };
        for (records, skipped) in parsed {
            result.records.extend(records);
            result.skipped_rows += skipped;
        }
        result.records.sort_by_key(|r| r.date);
        Ok(result)
    }

    fn discover(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let pattern = self.root.join("*.csv");
        let pattern = pattern
            .to_str()
            .ok_or_else(|| StudioError::Data("non-utf8 data path".into()))?;

        let mut files: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| StudioError::Data(format!("bad glob pattern: {e}")))?
            .filter_map(std::result::Result::ok)
            .collect();
        files.sort();
        Ok(files)
    }
}

fn load_file(path: &Path) -> Result<(Vec<SessionRecord>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<RawRow>() {
        match row {
            Ok(raw) => match raw.into_record() {
                Some(record) => records.push(record),
                None => skipped += 1,
            },
            Err(_) => skipped += 1,
        }
    }
    Ok((records, skipped))
}
