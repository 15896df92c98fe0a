//! Terminal theme detection and color definitions

use ratatui::style::Color;

/// Fill-rate banding for table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillBand {
    Low,
    Normal,
    Peak,
}

/// Band a fill percentage against the under/peak thresholds
pub fn fill_band(percent: f64) -> FillBand {
    if percent < 30.0 {
        FillBand::Low
    } else if percent > 80.0 {
        FillBand::Peak
    } else {
        FillBand::Normal
    }
}

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selected tabs, keybinding keys, category names)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, inactive tabs, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Month/date text color
    pub fn month(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Revenue/money text color
    pub fn revenue(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90), // dark magenta (ANSI 256)
        }
    }

    /// Bar/positive indicator color
    pub fn bar(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    /// Error/negative indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Warning color for underfilled sessions
    pub fn warn(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(208), // orange (ANSI 256)
            Self::Light => Color::Indexed(166), // dark orange (ANSI 256)
        }
    }

    /// Stats accent color (summary cards)
    pub fn stat_blue(self) -> Color {
        match self {
            Self::Dark => Color::Blue,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Color for a signed month-on-month change
    pub fn change_color(self, change: f64, lower_is_better: bool) -> Color {
        let improved = if lower_is_better {
            change < 0.0
        } else {
            change > 0.0
        };
        if change == 0.0 {
            self.muted()
        } else if improved {
            self.bar()
        } else {
            self.error()
        }
    }

    /// Fill-rate band color for table rows
    pub fn fill_color(self, band: FillBand) -> Color {
        match band {
            FillBand::Low => self.warn(),
            FillBand::Normal => self.text(),
            FillBand::Peak => self.bar(),
        }
    }
}
