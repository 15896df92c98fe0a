//! Session record types for studio analytics

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One conducted class instance, as exported from the booking system.
/// Immutable input; the aggregator never mutates records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub date: NaiveDate,
    /// Normalized class format name, when the export provides one
    #[serde(default)]
    pub cleaned_class: Option<String>,
    /// Raw class type, used as fallback when `cleaned_class` is absent
    #[serde(default)]
    pub class_type: Option<String>,
    #[serde(default)]
    pub trainer_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub checked_in_count: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub booked_count: u32,
    #[serde(default)]
    pub late_cancelled_count: u32,
    #[serde(default)]
    pub new_client_count: u32,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<String>,
}

impl SessionRecord {
    /// Class format for grouping, with the `cleaned_class` → `class_type`
    /// fallback chain. Blank values count as absent.
    pub fn class_format(&self) -> ClassFormat {
        ClassFormat::from_raw(
            self.cleaned_class
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .or(self.class_type.as_deref()),
        )
    }

    /// Calendar month key (`YYYY-MM`). Lexicographic order on these keys
    /// matches chronological order.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }

    /// A session nobody attended
    pub fn is_empty_session(&self) -> bool {
        self.checked_in_count == 0
    }

    /// Below 30% of capacity. Zero-capacity sessions are never flagged.
    pub fn is_underperforming(&self) -> bool {
        self.capacity > 0 && (self.checked_in_count as f64 / self.capacity as f64) < 0.3
    }

    /// Above 80% of capacity. Zero-capacity sessions are never flagged.
    pub fn is_peak(&self) -> bool {
        self.capacity > 0 && (self.checked_in_count as f64 / self.capacity as f64) > 0.8
    }
}

/// Validated class-format key. Records without a usable format name are
/// bucketed under `Unknown` rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassFormat {
    Named(String),
    Unknown,
}

impl ClassFormat {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ClassFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How rows are grouped by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// One row per class format
    #[default]
    ClassFormat,
    /// One row per (class format, trainer) pair
    FormatAndTrainer,
}

/// Grouping key for one comparison row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryKey {
    pub format: ClassFormat,
    /// Present only when grouping by format and trainer
    pub trainer: Option<String>,
}

impl CategoryKey {
    pub fn for_record(record: &SessionRecord, group_by: GroupBy) -> Self {
        let trainer = match group_by {
            GroupBy::ClassFormat => None,
            GroupBy::FormatAndTrainer => Some(
                record
                    .trainer_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or("Unknown")
                    .to_string(),
            ),
        };
        Self {
            format: record.class_format(),
            trainer,
        }
    }

    /// Display label, "Format • Trainer" when grouped by trainer
    pub fn label(&self) -> String {
        match &self.trainer {
            Some(trainer) => format!("{} • {}", self.format, trainer),
            None => self.format.to_string(),
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Studio-wide totals backing the metric cards
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudioSummary {
    pub total_sessions: u64,
    pub total_attendance: u64,
    pub total_capacity: u64,
    pub total_revenue: f64,
    pub empty_sessions: u64,
    /// attendance / capacity × 100
    pub avg_fill_rate: f64,
    pub avg_revenue_per_session: f64,
    /// share of sessions with at least one attendee, percent
    pub utilization_rate: f64,
}
