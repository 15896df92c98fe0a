//! Chart series derivation
//!
//! Small pure transforms feeding the dashboard bar and trend views.

use std::collections::HashMap;

use crate::types::{ratio, BucketStats, SessionRecord};

/// Metric a bar chart ranks categories by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMetric {
    #[default]
    Attendance,
    Revenue,
    Sessions,
    FillRate,
}

impl ChartMetric {
    pub fn label(&self) -> &'static str {
        match self {
            ChartMetric::Attendance => "Attendance",
            ChartMetric::Revenue => "Revenue",
            ChartMetric::Sessions => "Sessions",
            ChartMetric::FillRate => "Fill Rate",
        }
    }

    fn pick(&self, stats: &BucketStats) -> f64 {
        match self {
            ChartMetric::Attendance => stats.attendance as f64,
            ChartMetric::Revenue => stats.revenue,
            ChartMetric::Sessions => stats.sessions as f64,
            ChartMetric::FillRate => ratio(stats.attendance as f64, stats.capacity as f64) * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    pub month: String,
    pub sessions: u64,
    pub attendance: u64,
    pub capacity: u64,
    pub revenue: f64,
    pub fill_rate: f64,
}

/// Top `limit` categories by the chosen metric, descending
pub fn category_totals(
    records: &[SessionRecord],
    metric: ChartMetric,
    limit: usize,
) -> Vec<CategoryTotal> {
    let mut buckets: HashMap<String, (usize, BucketStats)> = HashMap::new();
    for record in records {
        let label = record.class_format().as_str().to_string();
        let next_index = buckets.len();
        let (_, stats) = buckets
            .entry(label)
            .or_insert_with(|| (next_index, BucketStats::default()));
        stats.add(record);
    }

    let mut totals: Vec<(usize, CategoryTotal)> = buckets
        .into_iter()
        .map(|(label, (order, stats))| {
            (
                order,
                CategoryTotal {
                    label,
                    value: metric.pick(&stats),
                },
            )
        })
        .collect();

    totals.sort_by(|(order_a, a), (order_b, b)| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(order_a.cmp(order_b))
    });
    totals.truncate(limit);
    totals.into_iter().map(|(_, t)| t).collect()
}

/// Month-by-month totals, ascending by month key
pub fn monthly_trends(records: &[SessionRecord]) -> Vec<MonthlyTrend> {
    let mut buckets: HashMap<String, BucketStats> = HashMap::new();
    for record in records {
        buckets.entry(record.month_key()).or_default().add(record);
    }

    let mut trends: Vec<MonthlyTrend> = buckets
        .into_iter()
        .map(|(month, stats)| MonthlyTrend {
            month,
            sessions: stats.sessions,
            attendance: stats.attendance,
            capacity: stats.capacity,
            revenue: stats.revenue,
            fill_rate: ratio(stats.attendance as f64, stats.capacity as f64) * 100.0,
        })
        .collect();

    trends.sort_by(|a, b| a.month.cmp(&b.month));
    trends
}

/// Session-count share per class format, top 8, descending
pub fn class_distribution(records: &[SessionRecord]) -> Vec<CategoryTotal> {
    category_totals(records, ChartMetric::Sessions, 8)
}
