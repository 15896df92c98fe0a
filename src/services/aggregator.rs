//! Aggregator service for category rollups and month-on-month comparisons
//!
//! One parameterized group-and-roll-up pass backs every table view:
//! counters are accumulated once, and each view selects which metrics
//! to display.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{
    ratio, BucketStats, CategoryKey, ComparisonRow, FormatComparisonRow, GroupBy, Metric,
    MonthWindow, SessionRecord, StudioSummary,
};

/// Per-category accumulator, alive for one aggregation call only
struct CategoryRollup {
    totals: BucketStats,
    months: HashMap<String, BucketStats>,
    /// Input order of first appearance, used as the sort tie-breaker
    first_seen: usize,
}

impl CategoryRollup {
    fn new(first_seen: usize) -> Self {
        Self {
            totals: BucketStats::default(),
            months: HashMap::new(),
            first_seen,
        }
    }
}

/// Aggregator for session analytics
pub struct Aggregator;

impl Aggregator {
    /// The last two distinct calendar months present anywhere in the
    /// input. Global across categories: a category idle in the latest
    /// month still reports against that month, with zero figures.
    pub fn month_window(records: &[SessionRecord]) -> MonthWindow {
        let mut months: Vec<String> = records.iter().map(SessionRecord::month_key).collect();
        months.sort_unstable();
        months.dedup();

        let current = months.pop();
        let previous = months.pop();
        MonthWindow { current, previous }
    }

    /// Roll records up per category and derive the comparison rows,
    /// sorted descending by the category's overall `sort_by` value.
    pub fn compare(
        records: &[SessionRecord],
        group_by: GroupBy,
        sort_by: Metric,
    ) -> Vec<ComparisonRow> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut rollups: HashMap<CategoryKey, CategoryRollup> = HashMap::new();
        for record in records {
            let key = CategoryKey::for_record(record, group_by);
            let next_index = rollups.len();
            let rollup = rollups
                .entry(key)
                .or_insert_with(|| CategoryRollup::new(next_index));
            rollup.totals.add(record);
            rollup.months.entry(record.month_key()).or_default().add(record);
        }

        let window = Self::month_window(records);

        let mut rows: Vec<(usize, ComparisonRow)> = rollups
            .into_iter()
            .map(|(category, rollup)| {
                let current = month_bucket(&rollup.months, window.current.as_deref());
                let previous = month_bucket(&rollup.months, window.previous.as_deref());
                let revenue_growth = if previous.revenue > 0.0 {
                    (current.revenue - previous.revenue) / previous.revenue * 100.0
                } else {
                    0.0
                };

                let row = ComparisonRow {
                    category,
                    overall: rollup.totals,
                    current,
                    previous,
                    overall_metrics: rollup.totals.metrics(),
                    current_metrics: current.metrics(),
                    previous_metrics: previous.metrics(),
                    revenue_growth,
                };
                (rollup.first_seen, row)
            })
            .collect();

        rows.sort_by(|(order_a, a), (order_b, b)| {
            b.overall_value(sort_by)
                .partial_cmp(&a.overall_value(sort_by))
                .unwrap_or(Ordering::Equal)
                .then(order_a.cmp(order_b))
        });

        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Studio-wide totals for the metric cards
    pub fn summary(records: &[SessionRecord]) -> StudioSummary {
        if records.is_empty() {
            return StudioSummary::default();
        }

        let mut totals = BucketStats::default();
        for record in records {
            totals.add(record);
        }

        let metrics = totals.metrics();
        StudioSummary {
            total_sessions: totals.sessions,
            total_attendance: totals.attendance,
            total_capacity: totals.capacity,
            total_revenue: totals.revenue,
            empty_sessions: totals.empty_sessions,
            avg_fill_rate: metrics.fill_rate,
            avg_revenue_per_session: metrics.revenue_per_session,
            utilization_rate: metrics.utilization_rate,
        }
    }

    /// Format comparison with conversion, retention, cancellation, and a
    /// weighted score. Rates are whole percents, as displayed.
    pub fn format_comparison(
        records: &[SessionRecord],
        with_trainer: bool,
    ) -> Vec<FormatComparisonRow> {
        #[derive(Default)]
        struct FormatAcc {
            sessions: u64,
            attendance: u64,
            capacity: u64,
            revenue: f64,
            new_clients: u64,
            booked: u64,
            cancelled: u64,
            first_seen: usize,
        }

        let group_by = if with_trainer {
            GroupBy::FormatAndTrainer
        } else {
            GroupBy::ClassFormat
        };

        let mut groups: HashMap<CategoryKey, FormatAcc> = HashMap::new();
        for record in records {
            let key = CategoryKey::for_record(record, group_by);
            let next_index = groups.len();
            let acc = groups.entry(key).or_insert_with(|| FormatAcc {
                first_seen: next_index,
                ..FormatAcc::default()
            });
            acc.sessions += 1;
            acc.attendance += record.checked_in_count as u64;
            acc.capacity += record.capacity as u64;
            acc.revenue += record.total_paid;
            acc.new_clients += record.new_client_count as u64;
            acc.booked += record.booked_count as u64;
            acc.cancelled += record.late_cancelled_count as u64;
        }

        let mut rows: Vec<(usize, FormatComparisonRow)> = groups
            .into_iter()
            .map(|(category, acc)| {
                let attendance = acc.attendance as f64;
                let fill_rate = (ratio(attendance, acc.capacity as f64) * 100.0).round();
                let conversion_rate =
                    (ratio(acc.new_clients as f64, attendance) * 100.0).round();
                let retention_rate =
                    (ratio(attendance - acc.new_clients as f64, attendance) * 100.0).round();
                let cancellation_rate =
                    (ratio(acc.cancelled as f64, acc.booked as f64) * 100.0).round();
                let score = (fill_rate * 0.3
                    + (100.0 - cancellation_rate) * 0.25
                    + retention_rate * 0.25
                    + conversion_rate * 0.2)
                    .round();

                let row = FormatComparisonRow {
                    category,
                    sessions: acc.sessions,
                    total_attendance: acc.attendance,
                    avg_attendance: ratio(attendance, acc.sessions as f64).round(),
                    total_revenue: acc.revenue,
                    avg_revenue: ratio(acc.revenue, acc.sessions as f64).round(),
                    fill_rate,
                    conversion_rate,
                    retention_rate,
                    cancellation_rate,
                    score,
                };
                (acc.first_seen, row)
            })
            .collect();

        rows.sort_by(|(order_a, a), (order_b, b)| {
            b.total_attendance
                .cmp(&a.total_attendance)
                .then(order_a.cmp(order_b))
        });

        rows.into_iter().map(|(_, row)| row).collect()
    }
}

fn month_bucket(months: &HashMap<String, BucketStats>, key: Option<&str>) -> BucketStats {
    key.and_then(|k| months.get(k)).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(date: &str, class: Option<&str>, checked_in: u32, capacity: u32) -> SessionRecord {
        SessionRecord {
            date: date.parse().unwrap(),
            cleaned_class: class.map(String::from),
            class_type: None,
            trainer_name: None,
            location: None,
            checked_in_count: checked_in,
            capacity,
            total_paid: 0.0,
            booked_count: 0,
            late_cancelled_count: 0,
            new_client_count: 0,
            time: None,
            day_of_week: None,
        }
    }

    fn make_paid_record(date: &str, class: &str, checked_in: u32, paid: f64) -> SessionRecord {
        let mut record = make_record(date, Some(class), checked_in, 20);
        record.total_paid = paid;
        record
    }

    // ========== month_window() tests ==========

    #[test]
    fn test_month_window_empty() {
        let window = Aggregator::month_window(&[]);
        assert_eq!(window.current, None);
        assert_eq!(window.previous, None);
    }

    #[test]
    fn test_month_window_single_month() {
        let records = vec![
            make_record("2024-06-01", Some("Yoga"), 10, 20),
            make_record("2024-06-15", Some("Yoga"), 12, 20),
        ];
        let window = Aggregator::month_window(&records);
        assert_eq!(window.current.as_deref(), Some("2024-06"));
        assert_eq!(window.previous, None);
    }

    #[test]
    fn test_month_window_takes_two_largest() {
        let records = vec![
            make_record("2024-03-01", Some("Yoga"), 10, 20),
            make_record("2024-06-01", Some("Barre"), 10, 20),
            make_record("2024-05-01", Some("Yoga"), 10, 20),
        ];
        let window = Aggregator::month_window(&records);
        assert_eq!(window.current.as_deref(), Some("2024-06"));
        assert_eq!(window.previous.as_deref(), Some("2024-05"));
    }

    #[test]
    fn test_month_window_is_global_across_categories() {
        // Barre has no June activity, but the window is derived from the
        // whole input, so June is still the current month for Barre.
        let records = vec![
            make_record("2024-05-01", Some("Barre"), 8, 20),
            make_record("2024-06-01", Some("Yoga"), 10, 20),
        ];
        let window = Aggregator::month_window(&records);
        assert_eq!(window.current.as_deref(), Some("2024-06"));

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let barre = rows.iter().find(|r| r.category.label() == "Barre").unwrap();
        assert_eq!(barre.current.sessions, 0);
        assert_eq!(barre.previous.sessions, 1);
    }

    // ========== compare() tests ==========

    #[test]
    fn test_compare_empty_input() {
        let rows = Aggregator::compare(&[], GroupBy::ClassFormat, Metric::Attendance);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_compare_worked_example() {
        // Yoga: May 10/20, June 15/20 → fill 50% then 75%, change +25
        let records = vec![
            make_record("2024-05-01", Some("Yoga"), 10, 20),
            make_record("2024-06-01", Some("Yoga"), 15, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.category.label(), "Yoga");
        assert_eq!(row.overall.attendance, 25);
        assert!((row.current_metrics.fill_rate - 75.0).abs() < 1e-9);
        assert!((row.previous_metrics.fill_rate - 50.0).abs() < 1e-9);
        assert!((row.change(Metric::FillRate) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_session_count_matches_input_length() {
        let records = vec![
            make_record("2024-05-01", Some("Yoga"), 10, 20),
            make_record("2024-05-02", Some("Barre"), 8, 15),
            make_record("2024-06-01", None, 0, 12),
            make_record("2024-06-02", Some("Yoga"), 12, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let total_sessions: u64 = rows.iter().map(|r| r.overall.sessions).sum();
        assert_eq!(total_sessions, records.len() as u64);
    }

    #[test]
    fn test_compare_missing_category_buckets_under_unknown() {
        let records = vec![
            make_record("2024-06-01", None, 5, 20),
            make_record("2024-06-02", Some("Yoga"), 10, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        assert_eq!(rows.len(), 2);
        let unknown = rows
            .iter()
            .find(|r| r.category.label() == "Unknown")
            .expect("Unknown bucket present");
        assert_eq!(unknown.overall.sessions, 1);
        assert_eq!(unknown.overall.attendance, 5);
    }

    #[test]
    fn test_compare_sorted_descending_by_metric() {
        let records = vec![
            make_record("2024-06-01", Some("Barre"), 5, 20),
            make_record("2024-06-02", Some("Yoga"), 18, 20),
            make_record("2024-06-03", Some("Cycle"), 11, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let labels: Vec<String> = rows.iter().map(|r| r.category.label()).collect();
        assert_eq!(labels, vec!["Yoga", "Cycle", "Barre"]);
    }

    #[test]
    fn test_compare_tie_keeps_input_order() {
        let records = vec![
            make_record("2024-06-01", Some("Barre"), 10, 20),
            make_record("2024-06-02", Some("Yoga"), 10, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let labels: Vec<String> = rows.iter().map(|r| r.category.label()).collect();
        assert_eq!(labels, vec!["Barre", "Yoga"]);
    }

    #[test]
    fn test_compare_deterministic() {
        let records = vec![
            make_record("2024-05-01", Some("Yoga"), 10, 20),
            make_record("2024-05-02", Some("Barre"), 8, 15),
            make_record("2024-06-01", Some("Cycle"), 12, 18),
            make_record("2024-06-02", None, 0, 10),
        ];

        let first = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let second = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.category, b.category);
            assert_eq!(a.overall, b.overall);
            assert_eq!(a.current, b.current);
            assert_eq!(a.previous, b.previous);
        }
    }

    #[test]
    fn test_compare_rates_within_bounds() {
        let records = vec![
            make_record("2024-05-01", Some("Yoga"), 10, 20),
            make_record("2024-05-02", Some("Yoga"), 0, 20),
            make_record("2024-06-01", Some("Barre"), 19, 20),
            make_record("2024-06-02", Some("Cycle"), 3, 20),
        ];

        for row in Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance) {
            for metrics in [
                &row.overall_metrics,
                &row.current_metrics,
                &row.previous_metrics,
            ] {
                assert!((0.0..=100.0).contains(&metrics.fill_rate));
                assert!((0.0..=100.0).contains(&metrics.utilization_rate));
                assert!((0.0..=100.0).contains(&metrics.waste_rate));
                assert!((0.0..=100.0).contains(&metrics.peak_utilization));
            }
        }
    }

    #[test]
    fn test_compare_zero_capacity_category() {
        let records = vec![
            make_record("2024-06-01", Some("Community"), 5, 0),
            make_record("2024-06-02", Some("Community"), 8, 0),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        assert_eq!(rows[0].overall_metrics.fill_rate, 0.0);
        assert!(rows[0].overall_metrics.fill_rate.is_finite());
    }

    #[test]
    fn test_compare_revenue_growth_zero_guard() {
        let records = vec![
            make_paid_record("2024-05-01", "Yoga", 10, 0.0),
            make_paid_record("2024-06-01", "Yoga", 10, 500.0),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::TotalRevenue);
        // previous revenue is 0 → growth clamps to 0, not infinity
        assert_eq!(rows[0].revenue_growth, 0.0);
    }

    #[test]
    fn test_compare_revenue_growth() {
        let records = vec![
            make_paid_record("2024-05-01", "Yoga", 10, 400.0),
            make_paid_record("2024-06-01", "Yoga", 10, 500.0),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::TotalRevenue);
        assert!((rows[0].revenue_growth - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_monthly_attendance_sums_to_total() {
        let records = vec![
            make_record("2024-04-01", Some("Yoga"), 7, 20),
            make_record("2024-05-01", Some("Yoga"), 10, 20),
            make_record("2024-06-01", Some("Yoga"), 15, 20),
        ];

        let rows = Aggregator::compare(&records, GroupBy::ClassFormat, Metric::Attendance);
        let row = &rows[0];
        // April falls outside the two-month window but still counts in
        // the all-time totals.
        assert_eq!(row.overall.attendance, 32);
        assert_eq!(row.current.attendance + row.previous.attendance, 25);
    }

    #[test]
    fn test_compare_by_format_and_trainer() {
        let mut a = make_record("2024-06-01", Some("Yoga"), 10, 20);
        a.trainer_name = Some("Anisha".into());
        let mut b = make_record("2024-06-02", Some("Yoga"), 8, 20);
        b.trainer_name = Some("Rohan".into());

        let rows =
            Aggregator::compare(&[a, b], GroupBy::FormatAndTrainer, Metric::Attendance);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.label(), "Yoga • Anisha");
        assert_eq!(rows[1].category.label(), "Yoga • Rohan");
    }

    // ========== summary() tests ==========

    #[test]
    fn test_summary_empty() {
        let summary = Aggregator::summary(&[]);
        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.avg_fill_rate, 0.0);
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            make_paid_record("2024-06-01", "Yoga", 10, 600.0),
            make_paid_record("2024-06-02", "Barre", 0, 0.0),
        ];

        let summary = Aggregator::summary(&records);
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.total_attendance, 10);
        assert_eq!(summary.total_capacity, 40);
        assert_eq!(summary.empty_sessions, 1);
        assert!((summary.total_revenue - 600.0).abs() < f64::EPSILON);
        assert!((summary.avg_fill_rate - 25.0).abs() < 1e-9);
        assert!((summary.avg_revenue_per_session - 300.0).abs() < 1e-9);
        assert!((summary.utilization_rate - 50.0).abs() < 1e-9);
    }

    // ========== format_comparison() tests ==========

    #[test]
    fn test_format_comparison_rates() {
        let mut record = make_record("2024-06-01", Some("Yoga"), 20, 25);
        record.new_client_count = 5;
        record.booked_count = 25;
        record.late_cancelled_count = 5;
        record.total_paid = 2000.0;

        let rows = Aggregator::format_comparison(&[record], false);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.fill_rate, 80.0);
        assert_eq!(row.conversion_rate, 25.0); // 5/20
        assert_eq!(row.retention_rate, 75.0); // 15/20
        assert_eq!(row.cancellation_rate, 20.0); // 5/25
        // 80·0.3 + 80·0.25 + 75·0.25 + 25·0.2 = 67.75 → 68
        assert_eq!(row.score, 68.0);
    }

    #[test]
    fn test_format_comparison_zero_attendance() {
        let record = make_record("2024-06-01", Some("Yoga"), 0, 25);
        let rows = Aggregator::format_comparison(&[record], false);
        assert_eq!(rows[0].conversion_rate, 0.0);
        assert_eq!(rows[0].retention_rate, 0.0);
    }

    #[test]
    fn test_format_comparison_with_trainer_splits_rows() {
        let mut a = make_record("2024-06-01", Some("Yoga"), 12, 20);
        a.trainer_name = Some("Anisha".into());
        let mut b = make_record("2024-06-02", Some("Yoga"), 9, 20);
        b.trainer_name = Some("Rohan".into());
        let records = vec![a, b];

        assert_eq!(Aggregator::format_comparison(&records, false).len(), 1);
        assert_eq!(Aggregator::format_comparison(&records, true).len(), 2);
    }
}
