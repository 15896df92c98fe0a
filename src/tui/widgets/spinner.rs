//! Loading spinner widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Spinner animation frames
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// App branding
const APP_NAME: &str = "studiopulse";
const TAGLINE: &str = "Fitness studio session analytics";

/// Loading stage for display, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadingStage {
    Scanning,
    Parsing,
    Aggregating,
}

impl LoadingStage {
    pub const ALL: [LoadingStage; 3] = [Self::Scanning, Self::Parsing, Self::Aggregating];

    pub fn message(self) -> &'static str {
        match self {
            Self::Scanning => "Scanning exports",
            Self::Parsing => "Parsing sessions",
            Self::Aggregating => "Aggregating results",
        }
    }
}

/// Loading spinner widget
pub struct Spinner {
    frame: usize,
    stage: LoadingStage,
}

impl Spinner {
    pub fn new(frame: usize, stage: LoadingStage) -> Self {
        Self { frame, stage }
    }

    /// Get the current spinner character
    pub fn current_char(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Advance to next frame, returning the new frame index
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % SPINNER_FRAMES.len()
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 8 || area.width < 35 {
            return;
        }

        let center_y = area.y + area.height / 2;

        let name_y = center_y.saturating_sub(3);
        let name_x = area.x + (area.width.saturating_sub(APP_NAME.len() as u16)) / 2;
        buf.set_string(
            name_x,
            name_y,
            APP_NAME,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let tag_y = name_y + 1;
        let tag_x = area.x + (area.width.saturating_sub(TAGLINE.len() as u16)) / 2;
        buf.set_string(tag_x, tag_y, TAGLINE, Style::default().fg(Color::DarkGray));

        // One line per pipeline stage: done, running, or pending
        let list_x = area.x + (area.width.saturating_sub(24)) / 2;
        for (i, stage) in LoadingStage::ALL.iter().enumerate() {
            let (marker, style) = if *stage < self.stage {
                ('✓', Style::default().fg(Color::Green))
            } else if *stage == self.stage {
                (self.current_char(), Style::default().fg(Color::Cyan))
            } else {
                ('·', Style::default().fg(Color::DarkGray))
            };
            let line = format!("{} {}", marker, stage.message());
            buf.set_string(list_x, tag_y + 2 + i as u16, &line, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_frames() {
        assert_eq!(SPINNER_FRAMES.len(), 10);
    }

    #[test]
    fn test_spinner_current_char() {
        let spinner = Spinner::new(0, LoadingStage::Scanning);
        assert_eq!(spinner.current_char(), '⠋');

        let spinner = Spinner::new(5, LoadingStage::Parsing);
        assert_eq!(spinner.current_char(), '⠴');
    }

    #[test]
    fn test_spinner_wraps() {
        let spinner = Spinner::new(10, LoadingStage::Aggregating);
        assert_eq!(spinner.current_char(), '⠋');
    }

    #[test]
    fn test_next_frame_wraps() {
        assert_eq!(Spinner::next_frame(0), 1);
        assert_eq!(Spinner::next_frame(9), 0);
    }

    #[test]
    fn test_stages_ordered_as_pipeline() {
        assert!(LoadingStage::Scanning < LoadingStage::Parsing);
        assert!(LoadingStage::Parsing < LoadingStage::Aggregating);
        assert_eq!(LoadingStage::ALL.len(), 3);
    }

    #[test]
    fn test_render_marks_completed_stages() {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        Spinner::new(0, LoadingStage::Aggregating).render(area, &mut buf);

        let text: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("✓ Scanning exports"));
        assert!(text.contains("✓ Parsing sessions"));
        assert!(text.contains("Aggregating results"));
    }
}
