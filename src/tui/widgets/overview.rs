//! Overview widget - studio summary cards, top formats, and monthly trend

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{Tab, TabBar};
use crate::services::{CategoryTotal, MonthlyTrend};
use crate::tui::theme::Theme;
use crate::types::StudioSummary;

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Format a currency amount, whole units with thousand separators
pub fn format_currency(amount: f64) -> String {
    format!("₹{}", format_number(amount.round().max(0.0) as u64))
}

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Data for the overview display (references to avoid cloning)
pub struct OverviewData<'a> {
    pub summary: &'a StudioSummary,
    pub top_formats: &'a [CategoryTotal],
    pub trends: &'a [MonthlyTrend],
    pub distribution: &'a [CategoryTotal],
}

/// Maximum content width for the overview
const MAX_CONTENT_WIDTH: u16 = 170;

/// Overview widget
pub struct Overview<'a> {
    data: OverviewData<'a>,
    theme: Theme,
    tab: Tab,
}

impl<'a> Overview<'a> {
    pub fn new(data: OverviewData<'a>, theme: Theme) -> Self {
        Self {
            data,
            theme,
            tab: Tab::Overview,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let format_rows = self.data.top_formats.len().min(8) as u16;
        let trend_rows = self.data.trends.len().min(6) as u16;
        let distribution_rows = self.data.distribution.len().min(4) as u16;
        let chunks = Layout::vertical([
            Constraint::Length(1),                 // Top padding
            Constraint::Length(1),                 // Tabs
            Constraint::Length(1),                 // Separator
            Constraint::Length(3),                 // Summary cards
            Constraint::Length(1),                 // Padding
            Constraint::Length(1),                 // Top formats header
            Constraint::Length(format_rows),       // Format bars
            Constraint::Length(1),                 // Padding
            Constraint::Length(1),                 // Trend header
            Constraint::Length(trend_rows),        // Trend rows
            Constraint::Length(1),                 // Padding
            Constraint::Length(1),                 // Distribution header
            Constraint::Length(distribution_rows), // Distribution bars
            Constraint::Min(0),                    // Remaining
        ])
        .split(centered_area);

        TabBar::new(self.tab, self.theme).render(chunks[1], buf);
        self.render_separator(chunks[2], buf);
        self.render_cards(chunks[3], buf);
        self.render_section_header(chunks[5], buf, "Top Class Formats by Attendance");
        self.render_bars(chunks[6], buf, self.data.top_formats);
        self.render_section_header(chunks[8], buf, "Monthly Trend");
        self.render_trends(chunks[9], buf);
        self.render_section_header(chunks[11], buf, "Class Distribution by Sessions");
        self.render_bars(chunks[12], buf, self.data.distribution);
    }
}

impl Overview<'_> {
    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        let line = "─".repeat(area.width as usize);
        buf.set_string(
            area.x,
            area.y,
            &line,
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_section_header(&self, area: Rect, buf: &mut Buffer, title: &str) {
        buf.set_string(
            area.x,
            area.y,
            title,
            Style::default()
                .fg(self.theme.month())
                .add_modifier(Modifier::BOLD),
        );
    }

    fn render_cards(&self, area: Rect, buf: &mut Buffer) {
        let summary = self.data.summary;
        let cards: [(&str, String, ratatui::style::Color); 5] = [
            (
                "Sessions",
                format_number(summary.total_sessions),
                self.theme.text(),
            ),
            (
                "Attendance",
                format_number(summary.total_attendance),
                self.theme.accent(),
            ),
            (
                "Fill Rate",
                format!("{:.1}%", summary.avg_fill_rate),
                self.theme.bar(),
            ),
            (
                "Revenue",
                format_currency(summary.total_revenue),
                self.theme.revenue(),
            ),
            (
                "Empty Sessions",
                format_number(summary.empty_sessions),
                self.theme.stat_blue(),
            ),
        ];

        let columns = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);
        for (chunk, (label, value, color)) in columns.iter().zip(cards) {
            let lines = vec![
                Line::from(Span::styled(
                    label,
                    Style::default().fg(self.theme.muted()),
                )),
                Line::from(Span::styled(
                    value,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(*chunk, buf);
        }
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer, totals: &[CategoryTotal]) {
        let max_value = totals.iter().map(|t| t.value).fold(0.0_f64, f64::max);

        for (i, total) in totals.iter().take(area.height as usize).enumerate() {
            let y = area.y + i as u16;
            let percent = if max_value > 0.0 {
                total.value / max_value * 100.0
            } else {
                0.0
            };
            let bar = format_percentage_bar(percent, 24);

            let label = if total.label.chars().count() > 22 {
                format!("{}…", total.label.chars().take(21).collect::<String>())
            } else {
                total.label.clone()
            };

            let row = Line::from(vec![
                Span::styled(
                    format!("{:<24}", label),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(bar, Style::default().fg(self.theme.bar())),
                Span::styled(
                    format!("  {:>8}", format_number(total.value.round() as u64)),
                    Style::default().fg(self.theme.text()),
                ),
            ]);
            Paragraph::new(row).render(
                Rect {
                    x: area.x,
                    y,
                    width: area.width,
                    height: 1,
                },
                buf,
            );
        }
    }

    fn render_trends(&self, area: Rect, buf: &mut Buffer) {
        // Most recent months when the list is longer than the area
        let visible = area.height as usize;
        let start = self.data.trends.len().saturating_sub(visible);

        for (i, trend) in self.data.trends[start..].iter().enumerate() {
            let y = area.y + i as u16;
            let bar = format_percentage_bar(trend.fill_rate, 16);
            let row = Line::from(vec![
                Span::styled(
                    format!("{:<9}", trend.month),
                    Style::default().fg(self.theme.month()),
                ),
                Span::styled(
                    format!("{:>9} att  ", format_number(trend.attendance)),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(bar, Style::default().fg(self.theme.bar())),
                Span::styled(
                    format!(" {:>5.1}%  ", trend.fill_rate),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format_currency(trend.revenue),
                    Style::default().fg(self.theme.revenue()),
                ),
            ]);
            Paragraph::new(row).render(
                Rect {
                    x: area.x,
                    y,
                    width: area.width,
                    height: 1,
                },
                buf,
            );
        }
    }
}
