//! Comparison table widget - per-category metrics across the month window
//!
//! One widget backs the Attendance, Efficiency, Revenue, and Utilization
//! tabs. The tab only changes which metric is displayed and which cycle
//! the `m` key walks through.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::overview::{format_currency, format_number};
use super::tabs::{Tab, TabBar};
use crate::tui::theme::{fill_band, Theme};
use crate::types::{ComparisonRow, Metric, MonthWindow};

/// Rows shown before scrolling kicks in
const VISIBLE_ROWS: usize = 20;

/// Maximum content width, consistent with the overview
const MAX_CONTENT_WIDTH: u16 = 170;

/// Table width: Category(30) + Current(14) + Previous(14) + Change(12) + Overall(14) = 84
const TABLE_WIDTH: u16 = 84;

/// Format a metric value in its display unit
pub fn format_metric_value(metric: Metric, value: f64) -> String {
    if metric.is_percent() {
        format!("{:.1}%", value)
    } else if metric.is_currency() {
        format_currency(value)
    } else {
        format_number(value.round().max(0.0) as u64)
    }
}

/// Format a signed month-on-month change in the metric's unit
pub fn format_metric_change(metric: Metric, change: f64) -> String {
    let sign = if change > 0.0 { "+" } else { "" };
    if metric.is_percent() {
        format!("{sign}{change:.1}%")
    } else if metric.is_currency() {
        if change < 0.0 {
            format!("-{}", format_currency(-change))
        } else {
            format!("+{}", format_currency(change))
        }
    } else {
        format!("{sign}{:.0}", change)
    }
}

/// Comparison table view
pub struct ComparisonView<'a> {
    rows: &'a [ComparisonRow],
    window: &'a MonthWindow,
    metric: Metric,
    scroll: usize,
    theme: Theme,
    tab: Tab,
}

impl<'a> ComparisonView<'a> {
    pub fn new(
        rows: &'a [ComparisonRow],
        window: &'a MonthWindow,
        metric: Metric,
        scroll: usize,
        theme: Theme,
    ) -> Self {
        Self {
            rows,
            window,
            metric,
            scroll,
            theme,
            tab: Tab::Attendance,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    /// Largest scroll offset that still shows a full page
    pub fn max_scroll_offset(row_count: usize) -> usize {
        row_count.saturating_sub(VISIBLE_ROWS)
    }
}

impl Widget for ComparisonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // Top padding
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Metric line
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Rows
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.tab, self.theme).render(chunks[1], buf);
        self.render_separator(chunks[2], buf);
        self.render_metric_line(chunks[3], buf);
        self.render_header(chunks[4], buf);
        self.render_rows(chunks[5], buf);
        self.render_keybindings(chunks[6], buf);
    }
}

impl ComparisonView<'_> {
    fn table_offset(&self, area_width: u16) -> u16 {
        area_width.saturating_sub(TABLE_WIDTH) / 2
    }

    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        let line = "─".repeat(area.width as usize);
        buf.set_string(
            area.x,
            area.y,
            &line,
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_metric_line(&self, area: Rect, buf: &mut Buffer) {
        let months = match (&self.window.current, &self.window.previous) {
            (Some(cur), Some(prev)) => format!("{prev} → {cur}"),
            (Some(cur), None) => cur.clone(),
            _ => "no data".to_string(),
        };
        let line = Line::from(vec![
            Span::styled("Metric: ", Style::default().fg(self.theme.muted())),
            Span::styled(
                self.metric.label(),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {months}"),
                Style::default().fg(self.theme.month()),
            ),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let offset = self.table_offset(area.width);
        let bold = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);

        let header = Line::from(vec![
            Span::styled(format!("{:<30}", "Category"), bold),
            Span::styled(format!("{:>14}", "Current"), bold),
            Span::styled(format!("{:>14}", "Previous"), bold),
            Span::styled(format!("{:>12}", "Change"), bold),
            Span::styled(format!("{:>14}", "Overall"), bold),
        ]);

        Paragraph::new(header).render(
            Rect {
                x: area.x + offset,
                y: area.y,
                width: TABLE_WIDTH.min(area.width),
                height: area.height,
            },
            buf,
        );
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let offset = self.table_offset(area.width);

        for (i, row) in self
            .rows
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;

            let label = row.category.label();
            let label = if label.chars().count() > 28 {
                format!("{}…", label.chars().take(27).collect::<String>())
            } else {
                label
            };

            let change = row.change(self.metric);
            let change_style =
                Style::default().fg(self.theme.change_color(change, self.metric.lower_is_better()));
            let current_style = if self.metric == Metric::FillRate {
                Style::default()
                    .fg(self.theme.fill_color(fill_band(row.current_value(self.metric))))
            } else {
                Style::default().fg(self.theme.text())
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<30}", label),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(
                    format!(
                        "{:>14}",
                        format_metric_value(self.metric, row.current_value(self.metric))
                    ),
                    current_style,
                ),
                Span::styled(
                    format!(
                        "{:>14}",
                        format_metric_value(self.metric, row.previous_value(self.metric))
                    ),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(
                    format!("{:>12}", format_metric_change(self.metric, change)),
                    change_style,
                ),
                Span::styled(
                    format!(
                        "{:>14}",
                        format_metric_value(self.metric, row.overall_value(self.metric))
                    ),
                    Style::default().fg(self.theme.text()),
                ),
            ]);

            Paragraph::new(line).render(
                Rect {
                    x: area.x + offset,
                    y,
                    width: TABLE_WIDTH.min(area.width),
                    height: 1,
                },
                buf,
            );
        }
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let hint = "m: cycle metric   t: trainer split   j/k: scroll   ?: help";
        let x = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
        buf.set_string(x, area.y, hint, Style::default().fg(self.theme.muted()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metric_value_units() {
        assert_eq!(format_metric_value(Metric::FillRate, 75.25), "75.2%");
        assert_eq!(format_metric_value(Metric::TotalRevenue, 1500.0), "₹1,500");
        assert_eq!(format_metric_value(Metric::Attendance, 1234.0), "1,234");
    }

    #[test]
    fn test_format_metric_change_signs() {
        assert_eq!(format_metric_change(Metric::FillRate, 2.5), "+2.5%");
        assert_eq!(format_metric_change(Metric::FillRate, -2.5), "-2.5%");
        assert_eq!(format_metric_change(Metric::Attendance, 12.0), "+12");
        assert_eq!(format_metric_change(Metric::TotalRevenue, -300.0), "-₹300");
    }

    #[test]
    fn test_max_scroll_offset() {
        assert_eq!(ComparisonView::max_scroll_offset(5), 0);
        assert_eq!(ComparisonView::max_scroll_offset(25), 5);
    }
}
