use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Application title shown on the first header line.
pub const TITLE: &str = "USAGE DASHBOARD";

/// Width of the `=` separator under the title.
const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering two lines:
///
/// 1. Title followed by `[ timezone | clock ]`.
/// 2. A 60-column `=` separator.
pub struct Header<'a> {
    /// IANA timezone name used for the clock (e.g. "Europe/Berlin").
    pub timezone: &'a str,
    /// Current wall-clock time, already formatted.
    pub clock: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(timezone: &'a str, clock: &'a str, theme: &'a Theme) -> Self {
        Self {
            timezone,
            clock,
            theme,
        }
    }

    /// Render the header as exactly two lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::styled(TITLE, self.theme.header),
                Span::styled("  [ ", self.theme.label),
                Span::styled(self.timezone.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.clock, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
