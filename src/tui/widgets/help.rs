//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 16;

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let title = format!(" studiopulse v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // [0] Padding
            Constraint::Length(1), // [1] Navigation header
            Constraint::Length(1), // [2] Separator
            Constraint::Length(1), // [3] Tab/Shift+Tab
            Constraint::Length(1), // [4] 1-5
            Constraint::Length(1), // [5] Up/Down
            Constraint::Length(1), // [6] Padding
            Constraint::Length(1), // [7] Tables header
            Constraint::Length(1), // [8] Separator
            Constraint::Length(1), // [9] m
            Constraint::Length(1), // [10] t
            Constraint::Length(1), // [11] Padding
            Constraint::Length(1), // [12] q/Esc
            Constraint::Min(0),    // Remaining
        ])
        .split(inner);

        let section = |text: &'static str| {
            Line::from(vec![Span::styled(
                text,
                Style::default()
                    .fg(self.theme.month())
                    .add_modifier(Modifier::BOLD),
            )])
        };

        Paragraph::new(section("Navigation"))
            .alignment(Alignment::Left)
            .render(chunks[1], buf);

        let sep = "─".repeat(inner.width as usize);
        buf.set_string(
            chunks[2].x,
            chunks[2].y,
            &sep,
            Style::default().fg(self.theme.muted()),
        );

        render_keybinding(chunks[3], buf, "Tab / Shift+Tab", "Switch view", self.theme);
        render_keybinding(chunks[4], buf, "1-5", "Jump to view", self.theme);
        render_keybinding(chunks[5], buf, "Up/Down or j/k", "Scroll table", self.theme);

        Paragraph::new(section("Tables"))
            .alignment(Alignment::Left)
            .render(chunks[7], buf);
        buf.set_string(
            chunks[8].x,
            chunks[8].y,
            &sep,
            Style::default().fg(self.theme.muted()),
        );

        render_keybinding(chunks[9], buf, "m", "Cycle displayed metric", self.theme);
        render_keybinding(chunks[10], buf, "t", "Toggle trainer split", self.theme);
        render_keybinding(chunks[12], buf, "q / Esc", "Quit (or close help)", self.theme);
    }
}

/// Render a single keybinding row: key (accent) + description (text)
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<17}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_area_fits_inside() {
        let area = Rect::new(0, 0, 120, 40);
        let popup = HelpPopup::centered_area(area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
        assert!(popup.x >= area.x);
        assert!(popup.y >= area.y);
    }

    #[test]
    fn test_centered_area_small_terminal() {
        let area = Rect::new(0, 0, 30, 8);
        let popup = HelpPopup::centered_area(area);
        assert_eq!(popup.width, 30);
        assert_eq!(popup.height, 8);
    }
}
