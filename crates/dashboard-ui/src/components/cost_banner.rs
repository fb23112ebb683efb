use dashboard_core::formatting::DailyCostDisplay;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Today's cost banner: two lines.
///
/// 1. `Today (UTC)  $1.24` with the cost styled by its band.
/// 2. `3 sessions · 12.3K in · 4.5K out · updated 14:02:11`
pub struct CostBanner<'a> {
    pub display: &'a DailyCostDisplay,
    /// Clock time of the last data load, already formatted for display.
    pub updated: &'a str,
    pub theme: &'a Theme,
}

impl<'a> CostBanner<'a> {
    pub fn new(display: &'a DailyCostDisplay, updated: &'a str, theme: &'a Theme) -> Self {
        Self {
            display,
            updated,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let dot = || Span::styled(" · ", self.theme.separator);

        vec![
            Line::from(vec![
                Span::styled("Today (UTC)  ", self.theme.label),
                Span::styled(
                    self.display.cost.as_str(),
                    self.theme.cost_style(self.display.band),
                ),
            ]),
            Line::from(vec![
                Span::styled(self.display.sessions.as_str(), self.theme.value),
                dot(),
                Span::styled(self.display.tokens_in.as_str(), self.theme.value),
                Span::styled(" in", self.theme.label),
                dot(),
                Span::styled(self.display.tokens_out.as_str(), self.theme.value),
                Span::styled(" out", self.theme.label),
                dot(),
                Span::styled("updated ", self.theme.label),
                Span::styled(self.updated, self.theme.dim),
            ]),
        ]
    }
}
