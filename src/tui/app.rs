//! Application state and event loop

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::services::{
    category_totals, class_distribution, monthly_trends, Aggregator, CategoryTotal, ChartMetric,
    DataLoader, MonthlyTrend, SessionFilter,
};
use crate::types::{ComparisonRow, GroupBy, Metric, MonthWindow, SessionRecord, StudioSummary};

use super::theme::Theme;
use super::widgets::{
    comparison::ComparisonView,
    help::HelpPopup,
    overview::{Overview, OverviewData},
    spinner::{LoadingStage, Spinner},
    tabs::Tab,
};

/// Metric cycles per table tab, walked by the `m` key
const ATTENDANCE_METRICS: [Metric; 4] = [
    Metric::Attendance,
    Metric::Sessions,
    Metric::AvgAttendance,
    Metric::EmptySessions,
];
const EFFICIENCY_METRICS: [Metric; 4] = [
    Metric::FillRate,
    Metric::AvgAttendance,
    Metric::UtilizationRate,
    Metric::WasteRate,
];
const REVENUE_METRICS: [Metric; 4] = [
    Metric::TotalRevenue,
    Metric::RevenuePerSession,
    Metric::RevenuePerAttendee,
    Metric::RevenueGrowth,
];
const UTILIZATION_METRICS: [Metric; 4] = [
    Metric::UtilizationRate,
    Metric::PeakUtilization,
    Metric::UnderperformingSessions,
    Metric::Capacity,
];

fn metric_cycle(tab: Tab) -> &'static [Metric; 4] {
    match tab {
        Tab::Efficiency => &EFFICIENCY_METRICS,
        Tab::Revenue => &REVENUE_METRICS,
        Tab::Utilization => &UTILIZATION_METRICS,
        _ => &ATTENDANCE_METRICS,
    }
}

/// Index into the per-table-tab state arrays
fn table_index(tab: Tab) -> Option<usize> {
    match tab {
        Tab::Overview => None,
        Tab::Attendance => Some(0),
        Tab::Efficiency => Some(1),
        Tab::Revenue => Some(2),
        Tab::Utilization => Some(3),
    }
}

/// Messages from the background loader
pub enum LoadMessage {
    /// The loader moved on to a new stage
    Stage(LoadingStage),
    /// Loading finished
    Done(Result<Box<AppData>, String>),
}

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Error state
    Error { message: String },
}

/// Loaded application data
pub struct AppData {
    pub records: Vec<SessionRecord>,
    pub summary: StudioSummary,
    pub top_formats: Vec<CategoryTotal>,
    pub trends: Vec<MonthlyTrend>,
    pub distribution: Vec<CategoryTotal>,
    pub window: MonthWindow,
}

impl AppData {
    pub fn from_records(records: Vec<SessionRecord>) -> Box<Self> {
        Box::new(Self {
            summary: Aggregator::summary(&records),
            top_formats: category_totals(&records, ChartMetric::Attendance, 10),
            trends: monthly_trends(&records),
            distribution: class_distribution(&records),
            window: Aggregator::month_window(&records),
            records,
        })
    }
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    group_by: GroupBy,
    metric_index: [usize; 4],
    scroll: [usize; 4],
    /// Comparison rows for the active table tab, re-derived whenever the
    /// tab, metric, or grouping changes
    rows: Vec<ComparisonRow>,
    show_help: bool,
    theme: Theme,
}

impl App {
    /// Create a new app in loading state
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Scanning,
            },
            should_quit: false,
            current_tab: Tab::default(),
            group_by: GroupBy::default(),
            metric_index: [0; 4],
            scroll: [0; 4],
            rows: Vec::new(),
            show_help: false,
            theme,
        }
    }

    /// Metric currently displayed on the active table tab
    fn current_metric(&self) -> Metric {
        match table_index(self.current_tab) {
            Some(i) => metric_cycle(self.current_tab)[self.metric_index[i] % 4],
            None => Metric::Attendance,
        }
    }

    /// Recompute comparison rows for the active table tab
    fn refresh_rows(&mut self) {
        if !self.current_tab.is_table() {
            return;
        }
        let metric = self.current_metric();
        if let AppState::Ready { data } = &self.state {
            self.rows = Aggregator::compare(&data.records, self.group_by, metric);
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        self.should_quit = true;
                    }
                    KeyCode::Esc => {
                        if self.show_help {
                            self.show_help = false;
                        } else {
                            self.should_quit = true;
                        }
                    }
                    KeyCode::Tab => {
                        self.current_tab = self.current_tab.next();
                        self.refresh_rows();
                    }
                    KeyCode::BackTab => {
                        self.current_tab = self.current_tab.prev();
                        self.refresh_rows();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.scroll_up();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.scroll_down();
                    }
                    KeyCode::Char(c @ '1'..='5') => {
                        if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                            self.current_tab = tab;
                            self.refresh_rows();
                        }
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Char('m') if self.current_tab.is_table() => {
                        if let Some(i) = table_index(self.current_tab) {
                            self.metric_index[i] = (self.metric_index[i] + 1) % 4;
                            self.scroll[i] = 0;
                            self.refresh_rows();
                        }
                    }
                    KeyCode::Char('t') if self.current_tab.is_table() => {
                        self.group_by = match self.group_by {
                            GroupBy::ClassFormat => GroupBy::FormatAndTrainer,
                            GroupBy::FormatAndTrainer => GroupBy::ClassFormat,
                        };
                        self.scroll = [0; 4];
                        self.refresh_rows();
                    }
                    _ => {}
                }
            }
        }
    }

    /// Apply a loader message to app state
    fn apply_message(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Stage(next) => {
                if let AppState::Loading { spinner_frame, .. } = &self.state {
                    self.state = AppState::Loading {
                        spinner_frame: *spinner_frame,
                        stage: next,
                    };
                }
            }
            LoadMessage::Done(result) => self.apply_data_result(result),
        }
    }

    /// Apply data loading result to app state
    fn apply_data_result(&mut self, result: Result<Box<AppData>, String>) {
        match result {
            Ok(data) => {
                self.state = AppState::Ready { data };
                self.refresh_rows();
            }
            Err(message) => self.state = AppState::Error { message },
        }
    }

    fn scroll_up(&mut self) {
        if let Some(i) = table_index(self.current_tab) {
            self.scroll[i] = self.scroll[i].saturating_sub(1);
        }
    }

    fn scroll_down(&mut self) {
        if let Some(i) = table_index(self.current_tab) {
            let max = ComparisonView::max_scroll_offset(self.rows.len());
            self.scroll[i] = (self.scroll[i] + 1).min(max);
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                let spinner = Spinner::new(*spinner_frame, *stage);
                spinner.render(area, buf);
            }
            AppState::Ready { data } => {
                match self.current_tab {
                    Tab::Overview => {
                        let overview_data = OverviewData {
                            summary: &data.summary,
                            top_formats: &data.top_formats,
                            trends: &data.trends,
                            distribution: &data.distribution,
                        };
                        Overview::new(overview_data, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    tab => {
                        let i = table_index(tab).unwrap_or(0);
                        ComparisonView::new(
                            &self.rows,
                            &data.window,
                            self.current_metric(),
                            self.scroll[i],
                            self.theme,
                        )
                        .with_tab(tab)
                        .render(area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(Color::Red));
            }
        }
    }
}

/// Run the TUI application
pub fn run(data_path: Option<PathBuf>, filter: SessionFilter) -> anyhow::Result<()> {
    // Theme detection queries the terminal, so it must happen before raw mode
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, theme, data_path, filter);
    ratatui::restore();
    result
}

/// Load data, reporting stage transitions back to the event loop
fn load_data_sync(
    data_path: Option<PathBuf>,
    filter: SessionFilter,
    progress: &mpsc::Sender<LoadMessage>,
) -> Result<Box<AppData>, String> {
    let root = data_path
        .or_else(DataLoader::default_dir)
        .ok_or_else(|| "no data directory available".to_string())?;

    let _ = progress.send(LoadMessage::Stage(LoadingStage::Parsing));
    let loaded = DataLoader::new(root).load().map_err(|e| e.to_string())?;
    let records = filter.apply(&loaded.records);
    if records.is_empty() {
        return Err("no sessions match the current filters".to_string());
    }

    let _ = progress.send(LoadMessage::Stage(LoadingStage::Aggregating));
    Ok(AppData::from_records(records))
}

fn run_app(
    terminal: &mut DefaultTerminal,
    theme: Theme,
    data_path: Option<PathBuf>,
    filter: SessionFilter,
) -> anyhow::Result<()> {
    let mut app = App::new(theme);

    // Load in the background so the spinner stays responsive
    let (data_tx, data_rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_data_sync(data_path, filter, &data_tx);
        let _ = data_tx.send(LoadMessage::Done(result));
    });

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        if matches!(app.state, AppState::Loading { .. }) {
            while let Ok(message) = data_rx.try_recv() {
                app.apply_message(message);
            }
        }

        // Poll with 100ms timeout so the spinner keeps animating
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
