//! Plain-text and JSON report rendering for the CLI subcommands
//!
//! Tables are described as column descriptors (header, alignment, cell
//! formatter) so every report shares one renderer.

use comfy_table::{CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::tui::widgets::comparison::{format_metric_change, format_metric_value};
use crate::tui::widgets::overview::{format_currency, format_number};
use crate::types::{ComparisonRow, FormatComparisonRow, Metric, MonthWindow, StudioSummary};

/// One table column: header, alignment, and a cell formatter over the row
struct Column<'a, T> {
    header: String,
    align: CellAlignment,
    format: Box<dyn Fn(&T) -> String + 'a>,
}

impl<'a, T> Column<'a, T> {
    fn left(header: impl Into<String>, format: impl Fn(&T) -> String + 'a) -> Self {
        Self {
            header: header.into(),
            align: CellAlignment::Left,
            format: Box::new(format),
        }
    }

    fn right(header: impl Into<String>, format: impl Fn(&T) -> String + 'a) -> Self {
        Self {
            header: header.into(),
            align: CellAlignment::Right,
            format: Box::new(format),
        }
    }
}

/// Render rows through column descriptors into a comfy table
fn render_table<T>(rows: &[T], columns: &[Column<'_, T>]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.iter().map(|c| c.header.clone()).collect::<Vec<_>>());

    for row in rows {
        table.add_row(columns.iter().map(|c| (c.format)(row)).collect::<Vec<_>>());
    }

    for (i, column) in columns.iter().enumerate() {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(column.align);
        }
    }

    table
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonRowJson {
    category: String,
    current: f64,
    previous: f64,
    change: f64,
    overall: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonReportJson {
    metric: String,
    current_month: Option<String>,
    previous_month: Option<String>,
    rows: Vec<ComparisonRowJson>,
}

/// Print a month-on-month comparison for one metric
pub fn print_comparison(
    rows: &[ComparisonRow],
    window: &MonthWindow,
    metric: Metric,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let output = ComparisonReportJson {
            metric: metric.label().to_string(),
            current_month: window.current.clone(),
            previous_month: window.previous.clone(),
            rows: rows
                .iter()
                .map(|row| ComparisonRowJson {
                    category: row.category.label(),
                    current: row.current_value(metric),
                    previous: row.previous_value(metric),
                    change: row.change(metric),
                    overall: row.overall_value(metric),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let current = window.current.as_deref().unwrap_or("-");
    let previous = window.previous.as_deref().unwrap_or("-");

    let columns: Vec<Column<'_, ComparisonRow>> = vec![
        Column::left("Category", |row: &ComparisonRow| row.category.label()),
        Column::right(format!("Current ({current})"), move |row: &ComparisonRow| {
            format_metric_value(metric, row.current_value(metric))
        }),
        Column::right(format!("Previous ({previous})"), move |row: &ComparisonRow| {
            format_metric_value(metric, row.previous_value(metric))
        }),
        Column::right("Change", move |row: &ComparisonRow| {
            format_metric_change(metric, row.change(metric))
        }),
        Column::right("Overall", move |row: &ComparisonRow| {
            format_metric_value(metric, row.overall_value(metric))
        }),
    ];

    println!("{} by category", metric.label());
    println!("{}", render_table(rows, &columns));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatComparisonJson {
    category: String,
    sessions: u64,
    total_attendance: u64,
    avg_attendance: f64,
    total_revenue: f64,
    fill_rate: f64,
    conversion_rate: f64,
    retention_rate: f64,
    cancellation_rate: f64,
    score: f64,
}

/// Print the all-metric format comparison with the weighted score
pub fn print_format_comparison(rows: &[FormatComparisonRow], json: bool) -> anyhow::Result<()> {
    if json {
        let output: Vec<FormatComparisonJson> = rows
            .iter()
            .map(|row| FormatComparisonJson {
                category: row.category.label(),
                sessions: row.sessions,
                total_attendance: row.total_attendance,
                avg_attendance: row.avg_attendance,
                total_revenue: row.total_revenue,
                fill_rate: row.fill_rate,
                conversion_rate: row.conversion_rate,
                retention_rate: row.retention_rate,
                cancellation_rate: row.cancellation_rate,
                score: row.score,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let columns: Vec<Column<'_, FormatComparisonRow>> = vec![
        Column::left("Category", |row: &FormatComparisonRow| row.category.label()),
        Column::right("Sessions", |row: &FormatComparisonRow| {
            format_number(row.sessions)
        }),
        Column::right("Attendance", |row: &FormatComparisonRow| {
            format_number(row.total_attendance)
        }),
        Column::right("Avg", |row: &FormatComparisonRow| {
            format!("{:.0}", row.avg_attendance)
        }),
        Column::right("Revenue", |row: &FormatComparisonRow| {
            format_currency(row.total_revenue)
        }),
        Column::right("Fill", |row: &FormatComparisonRow| {
            format!("{:.0}%", row.fill_rate)
        }),
        Column::right("Conv", |row: &FormatComparisonRow| {
            format!("{:.0}%", row.conversion_rate)
        }),
        Column::right("Retain", |row: &FormatComparisonRow| {
            format!("{:.0}%", row.retention_rate)
        }),
        Column::right("Cancel", |row: &FormatComparisonRow| {
            format!("{:.0}%", row.cancellation_rate)
        }),
        Column::right("Score", |row: &FormatComparisonRow| {
            format!("{:.0}", row.score)
        }),
    ];

    println!("Class format comparison");
    println!("{}", render_table(rows, &columns));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryJson {
    total_sessions: u64,
    total_attendance: u64,
    total_capacity: u64,
    total_revenue: f64,
    empty_sessions: u64,
    avg_fill_rate: f64,
    avg_revenue_per_session: f64,
    utilization_rate: f64,
}

/// Print the studio-wide summary card
pub fn print_summary(summary: &StudioSummary, json: bool) -> anyhow::Result<()> {
    if json {
        let output = SummaryJson {
            total_sessions: summary.total_sessions,
            total_attendance: summary.total_attendance,
            total_capacity: summary.total_capacity,
            total_revenue: summary.total_revenue,
            empty_sessions: summary.empty_sessions,
            avg_fill_rate: summary.avg_fill_rate,
            avg_revenue_per_session: summary.avg_revenue_per_session,
            utilization_rate: summary.utilization_rate,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let entries: Vec<(&str, String)> = vec![
        ("Sessions", format_number(summary.total_sessions)),
        ("Attendance", format_number(summary.total_attendance)),
        ("Capacity", format_number(summary.total_capacity)),
        ("Revenue", format_currency(summary.total_revenue)),
        ("Empty sessions", format_number(summary.empty_sessions)),
        ("Avg fill rate", format!("{:.1}%", summary.avg_fill_rate)),
        (
            "Revenue / session",
            format_currency(summary.avg_revenue_per_session),
        ),
        ("Utilization", format!("{:.1}%", summary.utilization_rate)),
    ];

    let columns: Vec<Column<'_, (&str, String)>> = vec![
        Column::left("Metric", |entry: &(&str, String)| entry.0.to_string()),
        Column::right("Value", |entry: &(&str, String)| entry.1.clone()),
    ];

    println!("{}", render_table(&entries, &columns));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BucketStats, CategoryKey, ClassFormat};

    fn make_row(name: &str, attendance: u64) -> ComparisonRow {
        let stats = BucketStats {
            sessions: 2,
            attendance,
            capacity: attendance * 2,
            revenue: 100.0,
            ..BucketStats::default()
        };
        ComparisonRow {
            category: CategoryKey {
                format: ClassFormat::Named(name.to_string()),
                trainer: None,
            },
            overall: stats,
            current: stats,
            previous: BucketStats::default(),
            overall_metrics: stats.metrics(),
            current_metrics: stats.metrics(),
            previous_metrics: BucketStats::default().metrics(),
            revenue_growth: 0.0,
        }
    }

    #[test]
    fn test_render_table_shape() {
        let rows = vec![make_row("Yoga", 20), make_row("Barre", 10)];
        let columns: Vec<Column<'_, ComparisonRow>> = vec![
            Column::left("Category", |row: &ComparisonRow| row.category.label()),
            Column::right("Attendance", |row: &ComparisonRow| {
                format_number(row.overall.attendance)
            }),
        ];

        let rendered = render_table(&rows, &columns).to_string();
        assert!(rendered.contains("Category"));
        assert!(rendered.contains("Yoga"));
        assert!(rendered.contains("Barre"));
        assert!(rendered.contains("20"));
    }

    #[test]
    fn test_print_comparison_table_renders() {
        let rows = vec![make_row("Yoga", 20)];
        let window = MonthWindow {
            current: Some("2024-06".to_string()),
            previous: Some("2024-05".to_string()),
        };
        print_comparison(&rows, &window, Metric::FillRate, false).unwrap();
    }

    #[test]
    fn test_print_format_comparison_table_renders() {
        let rows = vec![FormatComparisonRow {
            category: CategoryKey {
                format: ClassFormat::Named("Yoga".to_string()),
                trainer: None,
            },
            sessions: 4,
            total_attendance: 64,
            avg_attendance: 16.0,
            total_revenue: 3200.0,
            avg_revenue: 800.0,
            fill_rate: 80.0,
            conversion_rate: 20.0,
            retention_rate: 75.0,
            cancellation_rate: 25.0,
            score: 68.0,
        }];
        print_format_comparison(&rows, false).unwrap();
    }

    #[test]
    fn test_print_comparison_json_is_stable() {
        // JSON path must not panic on empty windows
        let rows = vec![make_row("Yoga", 20)];
        let window = MonthWindow::default();
        print_comparison(&rows, &window, Metric::Attendance, true).unwrap();
    }
}
