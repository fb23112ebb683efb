//! Table of the sessions that count toward today's cost.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per session,
//! most recently updated first.

use chrono::{DateTime, Utc};
use dashboard_core::formatting::{format_age, format_cost, format_number};
use dashboard_core::models::SessionRecord;
use dashboard_core::tabs::{StatusBand, TabStatus};
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::components::tab_bar::truncate_label;
use crate::themes::{status_symbol, Theme};

const NAME_WIDTH: usize = 28;

/// One display row, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub name: String,
    pub status: StatusBand,
    pub status_label: String,
    pub age: String,
    pub cost: String,
    pub tokens_in: String,
    pub tokens_out: String,
}

impl SessionRow {
    /// Format one record relative to `now`.
    pub fn from_record(record: &SessionRecord, now: DateTime<Utc>) -> Self {
        let status = record.status.as_deref().and_then(TabStatus::parse);
        let age_minutes = (now.timestamp_millis() - record.updated_at) as f64 / 60_000.0;

        Self {
            name: truncate_label(record.display_name(), NAME_WIDTH),
            status: StatusBand::from(status),
            status_label: record
                .status
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("-")
                .to_lowercase(),
            age: format_age(age_minutes),
            cost: format_cost(record.cost),
            tokens_in: format_number(record.tokens_in as f64, 0),
            tokens_out: format_number(record.tokens_out as f64, 0),
        }
    }
}

/// Render today's sessions into `area`, or a placeholder when there are none.
pub fn render_sessions_table(
    frame: &mut Frame,
    area: Rect,
    sessions: &[&SessionRecord],
    now: DateTime<Utc>,
    theme: &Theme,
) {
    if sessions.is_empty() {
        render_no_sessions(frame, area, theme);
        return;
    }

    let header_cells = ["Session", "Status", "Age", "Cost", "In", "Out"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = sessions
        .iter()
        .map(|record| SessionRow::from_record(record, now))
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.name),
                Cell::from(Line::from(vec![
                    Span::styled(status_symbol(row.status), theme.status_style(row.status)),
                    Span::raw(" "),
                    Span::raw(row.status_label),
                ])),
                Cell::from(row.age),
                Cell::from(row.cost),
                Cell::from(row.tokens_in),
                Cell::from(row.tokens_out),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(NAME_WIDTH as u16 + 2),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Today's sessions "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when no session has been updated today.
pub fn render_no_sessions(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No sessions today", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Sessions appear here once a tool writes a record.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Today's sessions "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn records() -> Vec<SessionRecord> {
        let at = |mins: i64| now().timestamp_millis() - mins * 60_000;
        vec![
            SessionRecord::new("build", at(5))
                .with_cost(1.5)
                .with_tokens(12_345, 678)
                .with_status("Running"),
            SessionRecord::new("review", at(225)).with_status("mystery"),
            SessionRecord::new("", at(30)),
        ]
    }

    #[test]
    fn test_session_row_formatting() {
        let records = records();
        let row = SessionRow::from_record(&records[0], now());
        assert_eq!(row.name, "build");
        assert_eq!(row.status, StatusBand::PulsingSuccess);
        assert_eq!(row.status_label, "running");
        assert_eq!(row.age, "5m");
        assert_eq!(row.cost, "$1.50");
        assert_eq!(row.tokens_in, "12,345");
        assert_eq!(row.tokens_out, "678");
    }

    #[test]
    fn test_session_row_unknown_status_is_muted() {
        let records = records();
        let row = SessionRow::from_record(&records[1], now());
        assert_eq!(row.status, StatusBand::Muted);
        assert_eq!(row.status_label, "mystery");
        assert_eq!(row.age, "3h 45m");
    }

    #[test]
    fn test_session_row_missing_fields() {
        let records = records();
        let row = SessionRow::from_record(&records[2], now());
        assert_eq!(row.name, "untitled");
        assert_eq!(row.status_label, "-");
        assert_eq!(row.cost, "$0.00");
    }

    #[test]
    fn test_session_row_future_record_has_zero_age() {
        let record = SessionRecord::new("ahead", now().timestamp_millis() + 600_000);
        assert_eq!(SessionRow::from_record(&record, now()).age, "0m");
    }

    #[test]
    fn test_render_sessions_table_does_not_panic() {
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let records = records();
        let refs: Vec<&SessionRecord> = records.iter().collect();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_sessions_table(frame, area, &refs, now(), &theme);
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("build"));
        assert!(content.contains("$1.50"));
    }

    #[test]
    fn test_render_empty_shows_placeholder() {
        let backend = TestBackend::new(80, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_sessions_table(frame, area, &[], now(), &theme);
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("No sessions today"));
    }
}
