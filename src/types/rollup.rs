//! Rollup and comparison types produced by the aggregator

use serde::Serialize;

use super::session::{CategoryKey, SessionRecord};

/// Guard a ratio against a zero denominator. Every derived metric flows
/// through this, so the output never carries NaN or infinity.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Running sums for one category within one month (or all-time)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketStats {
    pub sessions: u64,
    pub attendance: u64,
    pub capacity: u64,
    pub revenue: f64,
    pub empty_sessions: u64,
    pub underperforming_sessions: u64,
    pub peak_sessions: u64,
}

impl BucketStats {
    pub fn add(&mut self, record: &SessionRecord) {
        self.sessions = self.sessions.saturating_add(1);
        self.attendance = self.attendance.saturating_add(record.checked_in_count as u64);
        self.capacity = self.capacity.saturating_add(record.capacity as u64);
        self.revenue += record.total_paid;
        if record.is_empty_session() {
            self.empty_sessions = self.empty_sessions.saturating_add(1);
        }
        if record.is_underperforming() {
            self.underperforming_sessions = self.underperforming_sessions.saturating_add(1);
        }
        if record.is_peak() {
            self.peak_sessions = self.peak_sessions.saturating_add(1);
        }
    }

    /// Derive the ratio metrics for this bucket. Full precision; rounding
    /// is left to the rendering layer.
    pub fn metrics(&self) -> MetricSet {
        let sessions = self.sessions as f64;
        let attendance = self.attendance as f64;
        let capacity = self.capacity as f64;
        MetricSet {
            fill_rate: ratio(attendance, capacity) * 100.0,
            avg_per_session: ratio(attendance, sessions),
            utilization_rate: ratio(sessions - self.empty_sessions as f64, sessions) * 100.0,
            waste_rate: ratio(self.empty_sessions as f64, sessions) * 100.0,
            revenue_per_session: ratio(self.revenue, sessions),
            revenue_per_attendee: ratio(self.revenue, attendance),
            underperforming_rate: ratio(self.underperforming_sessions as f64, sessions) * 100.0,
            peak_utilization: ratio(self.peak_sessions as f64, sessions) * 100.0,
        }
    }
}

/// Derived ratio metrics for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSet {
    pub fill_rate: f64,
    pub avg_per_session: f64,
    pub utilization_rate: f64,
    pub waste_rate: f64,
    pub revenue_per_session: f64,
    pub revenue_per_attendee: f64,
    pub underperforming_rate: f64,
    pub peak_utilization: f64,
}

/// The "current vs previous" month pair, derived once from the whole
/// filtered input. Categories idle in the globally-latest month show
/// all-zero current figures; that is deliberate, not a per-category
/// window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthWindow {
    pub current: Option<String>,
    pub previous: Option<String>,
}

/// A displayable metric over comparison rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Attendance,
    Sessions,
    Capacity,
    FillRate,
    AvgAttendance,
    UtilizationRate,
    EmptySessions,
    WasteRate,
    TotalRevenue,
    RevenuePerSession,
    RevenuePerAttendee,
    RevenueGrowth,
    UnderperformingSessions,
    PeakUtilization,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Attendance => "Total Attendance",
            Self::Sessions => "Total Sessions",
            Self::Capacity => "Total Capacity",
            Self::FillRate => "Fill Rate %",
            Self::AvgAttendance => "Avg Attendance",
            Self::UtilizationRate => "Utilization Rate %",
            Self::EmptySessions => "Empty Sessions",
            Self::WasteRate => "Waste Rate %",
            Self::TotalRevenue => "Total Revenue",
            Self::RevenuePerSession => "Avg Revenue/Session",
            Self::RevenuePerAttendee => "Revenue/Attendee",
            Self::RevenueGrowth => "Revenue Growth %",
            Self::UnderperformingSessions => "Underperforming",
            Self::PeakUtilization => "Peak Utilization %",
        }
    }

    /// Rendered with a `%` suffix and one decimal place
    pub fn is_percent(self) -> bool {
        matches!(
            self,
            Self::FillRate
                | Self::UtilizationRate
                | Self::WasteRate
                | Self::RevenueGrowth
                | Self::PeakUtilization
        )
    }

    pub fn is_currency(self) -> bool {
        matches!(
            self,
            Self::TotalRevenue | Self::RevenuePerSession | Self::RevenuePerAttendee
        )
    }

    /// A falling value is the good direction for these
    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            Self::EmptySessions | Self::WasteRate | Self::UnderperformingSessions
        )
    }

    fn pick(self, stats: &BucketStats, metrics: &MetricSet) -> f64 {
        match self {
            Self::Attendance => stats.attendance as f64,
            Self::Sessions => stats.sessions as f64,
            Self::Capacity => stats.capacity as f64,
            Self::FillRate => metrics.fill_rate,
            Self::AvgAttendance => metrics.avg_per_session,
            Self::UtilizationRate => metrics.utilization_rate,
            Self::EmptySessions => stats.empty_sessions as f64,
            Self::WasteRate => metrics.waste_rate,
            Self::TotalRevenue => stats.revenue,
            Self::RevenuePerSession => metrics.revenue_per_session,
            Self::RevenuePerAttendee => metrics.revenue_per_attendee,
            Self::UnderperformingSessions => stats.underperforming_sessions as f64,
            Self::PeakUtilization => metrics.peak_utilization,
            // growth is a row-level value, handled by ComparisonRow
            Self::RevenueGrowth => 0.0,
        }
    }
}

/// One output row: all-time, current-month, and previous-month figures
/// for a single category
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub category: CategoryKey,
    pub overall: BucketStats,
    pub current: BucketStats,
    pub previous: BucketStats,
    pub overall_metrics: MetricSet,
    pub current_metrics: MetricSet,
    pub previous_metrics: MetricSet,
    /// (current − previous) / previous × 100; 0 when previous revenue is 0
    pub revenue_growth: f64,
}

impl ComparisonRow {
    pub fn current_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RevenueGrowth => self.revenue_growth,
            _ => metric.pick(&self.current, &self.current_metrics),
        }
    }

    pub fn previous_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RevenueGrowth => 0.0,
            _ => metric.pick(&self.previous, &self.previous_metrics),
        }
    }

    pub fn overall_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RevenueGrowth => self.revenue_growth,
            _ => metric.pick(&self.overall, &self.overall_metrics),
        }
    }

    /// Signed month-on-month change. Absolute difference per metric;
    /// revenue growth is already a percent and stands for itself.
    pub fn change(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RevenueGrowth => self.revenue_growth,
            _ => self.current_value(metric) - self.previous_value(metric),
        }
    }
}

/// Format-comparison row with conversion/retention/score figures.
/// Rates are whole percents, matching the comparison view's rounding.
#[derive(Debug, Clone, Serialize)]
pub struct FormatComparisonRow {
    pub category: CategoryKey,
    pub sessions: u64,
    pub total_attendance: u64,
    pub avg_attendance: f64,
    pub total_revenue: f64,
    pub avg_revenue: f64,
    pub fill_rate: f64,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub cancellation_rate: f64,
    /// fill·0.3 + (100−cancellation)·0.25 + retention·0.25 + conversion·0.2
    pub score: f64,
}
