//! Main application state and TUI event loop for the usage dashboard.
//!
//! [`App`] is the parent container: it owns the session list, the usage
//! blocks, the active tab, the theme and the display timezone. Components are
//! rebuilt from that state on every frame and report user actions back as
//! [`DashboardEvent`]s, which [`App::handle_event`] applies.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use dashboard_core::daily::DailyCostAggregator;
use dashboard_core::formatting::{cost_color, CostBand};
use dashboard_core::models::{DashboardEvent, SessionRecord};
use dashboard_core::tabs::{Tab, TabKey, TabSelector, TabStatus};
use dashboard_core::time_utils::format_clock;
use dashboard_core::usage::{NamedUsage, UsageSummaryView};
use dashboard_runtime::data::summary::default_blocks;
use dashboard_runtime::orchestrator::{DashboardSnapshot, RefreshTrigger};

use crate::components::cost_banner::CostBanner;
use crate::components::header::Header;
use crate::components::sessions_list::render_sessions_table;
use crate::components::tab_bar::TabBar;
use crate::components::usage_summary::UsageSummaryPanel;
use crate::themes::Theme;

/// Id of the tab showing today's cost and sessions.
pub const TODAY_TAB: &str = "today";
/// Id of the tab showing the usage summary blocks.
pub const USAGE_TAB: &str = "usage";

// ── AppCommand ────────────────────────────────────────────────────────────────

/// Side effects the event loop must perform after an event is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Ask the orchestrator for an immediate reload.
    Refresh,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Timezone for clock display only; "today" is always a UTC day.
    pub timezone: Tz,
    /// Id of the selected tab.
    pub active_tab: String,
    /// Latest session list, most recently updated first.
    pub sessions: Vec<SessionRecord>,
    /// Latest usage blocks.
    pub usage: [NamedUsage; 2],
    /// When the current data was loaded; `None` until the first snapshot.
    pub loaded_at: Option<DateTime<Utc>>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(theme_name: &str, timezone: Tz, active_tab: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            timezone,
            active_tab: active_tab.to_string(),
            sessions: Vec::new(),
            usage: default_blocks(&[], Utc::now()),
            loaded_at: None,
            should_quit: false,
        }
    }

    // ── State ─────────────────────────────────────────────────────────────────

    /// Replace the data with a freshly loaded snapshot.
    pub fn update_from_snapshot(&mut self, snapshot: DashboardSnapshot) {
        tracing::debug!(
            sessions = snapshot.sessions.len(),
            "applying snapshot"
        );
        self.sessions = snapshot.sessions;
        self.usage = snapshot.usage;
        self.loaded_at = Some(snapshot.loaded_at);
    }

    /// The tab set as of `now`.
    ///
    /// The "today" tab carries today's session count as its badge and a status
    /// derived from today's records: error beats warning beats running, and
    /// any other non-empty day is idle. It is urgent when a record is in error
    /// and asks for attention once the day's cost leaves the nominal band.
    pub fn build_tabs(&self, now: DateTime<Utc>) -> Vec<Tab> {
        let today = DailyCostAggregator::todays_sessions(&self.sessions, now);
        let statuses: Vec<TabStatus> = today
            .iter()
            .filter_map(|s| s.status.as_deref().and_then(TabStatus::parse))
            .collect();

        let has_error = statuses.contains(&TabStatus::Error);
        let status = if has_error {
            Some(TabStatus::Error)
        } else if statuses.contains(&TabStatus::Warning) {
            Some(TabStatus::Warning)
        } else if statuses.contains(&TabStatus::Running) {
            Some(TabStatus::Running)
        } else if !today.is_empty() {
            Some(TabStatus::Idle)
        } else {
            None
        };

        let total_cost: f64 = today.iter().map(|s| s.cost).sum();

        vec![
            Tab::new(TODAY_TAB, "Today")
                .with_badge(today.len() as u64)
                .with_status(status)
                .urgent(has_error)
                .attention(cost_color(total_cost) != CostBand::Nominal),
            Tab::new(USAGE_TAB, "Usage"),
        ]
    }

    // ── Events ────────────────────────────────────────────────────────────────

    /// Apply an event reported by a component.
    pub fn handle_event(&mut self, event: DashboardEvent) -> Option<AppCommand> {
        match event {
            DashboardEvent::SelectTab(id) => {
                tracing::debug!(tab = %id, "tab selected");
                self.active_tab = id;
                None
            }
            DashboardEvent::RefreshRequested => Some(AppCommand::Refresh),
        }
    }

    /// Translate a key press into component events and apply them.
    ///
    /// `q`, `Q` and `Ctrl+C` quit; arrows, Tab, Home, End and `1`–`9` move
    /// between tabs; `r` requests a refresh.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let tabs = self.build_tabs(Utc::now());
        let active = self.active_tab.clone();
        let nav = |k| TabSelector::navigate(&tabs, &active, k);

        let event = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Right | KeyCode::Tab => nav(TabKey::Next),
            KeyCode::Left | KeyCode::BackTab => nav(TabKey::Previous),
            KeyCode::Home => nav(TabKey::First),
            KeyCode::End => nav(TabKey::Last),
            KeyCode::Char(c @ '1'..='9') => {
                let position = c.to_digit(10).map(|d| d as usize).unwrap_or(0);
                TabSelector::select_position(&tabs, &active, position)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Some(UsageSummaryView::request_refresh()),
            _ => None,
        };

        event.and_then(|e| self.handle_event(e))
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame` as of `now`.
    pub fn render(&self, frame: &mut Frame, now: DateTime<Utc>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let tz_name = self.timezone.name();
        let clock = format_clock(now, self.timezone);
        frame.render_widget(
            Paragraph::new(Text::from(
                Header::new(tz_name, &clock, &self.theme).to_lines(),
            )),
            chunks[0],
        );

        let tabs = self.build_tabs(now);
        let views = TabSelector::render(&tabs, &self.active_tab);
        frame.render_widget(
            Paragraph::new(TabBar::new(&views, &self.theme).to_line()),
            chunks[1],
        );

        match self.active_tab.as_str() {
            USAGE_TAB => {
                let blocks = UsageSummaryView::render(&self.usage[0], &self.usage[1]);
                UsageSummaryPanel::new(&blocks, &self.theme).render(frame, chunks[3]);
            }
            _ => self.render_today(frame, chunks[3], now),
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("←/→", self.theme.value),
                Span::styled(" switch tab  ", self.theme.dim),
                Span::styled("r", self.theme.value),
                Span::styled(" refresh  ", self.theme.dim),
                Span::styled("q", self.theme.value),
                Span::styled(" quit", self.theme.dim),
            ])),
            chunks[4],
        );
    }

    fn render_today(&self, frame: &mut Frame, area: ratatui::layout::Rect, now: DateTime<Utc>) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let (_, display) = DailyCostAggregator::compute_display(&self.sessions, now);
        let updated = match self.loaded_at {
            Some(at) => format_clock(at, self.timezone),
            None => "loading…".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Text::from(
                CostBanner::new(&display, &updated, &self.theme).to_lines(),
            )),
            parts[0],
        );

        let today = DailyCostAggregator::todays_sessions(&self.sessions, now);
        render_sessions_table(frame, parts[1], &today, now, &self.theme);
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the live dashboard, receiving snapshots from `rx`.
    ///
    /// Keys are read with `crossterm::event::poll` (250 ms timeout) while data
    /// updates arrive on the async channel via `try_recv`. The terminal is
    /// restored when this future completes or is dropped.
    pub async fn run_live(
        mut self,
        mut rx: mpsc::Receiver<DashboardSnapshot>,
        refresh: RefreshTrigger,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let _guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        let tick_rate = Duration::from_millis(250);
        self.event_loop(
            &mut rx,
            &refresh,
            |app| {
                terminal
                    .draw(|frame| app.render(frame, Utc::now()))
                    .map(|_| ())
            },
            || poll_key(tick_rate),
        )
        .await
    }

    /// Drive the dashboard until a quit key or until the snapshot sender
    /// goes away.
    ///
    /// Each iteration draws, handles at most one key from `next_key`, drains
    /// pending snapshots and then yields to the runtime.
    pub async fn event_loop(
        &mut self,
        rx: &mut mpsc::Receiver<DashboardSnapshot>,
        refresh: &RefreshTrigger,
        mut draw: impl FnMut(&App) -> io::Result<()>,
        mut next_key: impl FnMut() -> io::Result<Option<KeyEvent>>,
    ) -> io::Result<()> {
        loop {
            draw(self)?;

            if let Some(key) = next_key()? {
                if let Some(AppCommand::Refresh) = self.handle_key(key) {
                    if !refresh.request_refresh() {
                        tracing::warn!("refresh requested but the loader has stopped");
                    }
                }
            }

            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.update_from_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }

            tokio::task::yield_now().await;
        }
    }
}

/// Wait up to `timeout` for a key press.
fn poll_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Leaves raw mode and the alternate screen on drop.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
