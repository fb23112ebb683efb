use dashboard_core::tabs::TabView;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::themes::{status_symbol, Theme};

/// Widest label drawn before truncation kicks in, in terminal columns.
pub const MAX_LABEL_WIDTH: usize = 24;

/// Gap between adjacent tabs.
const TAB_GAP: &str = "  ";

/// Horizontal tab strip drawn from [`TabView`]s.
///
/// Each tab renders as `" <status> <label> [badge] "`; the selected tab uses
/// the active style and the rest the inactive one.
pub struct TabBar<'a> {
    pub tabs: &'a [TabView],
    pub theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [TabView], theme: &'a Theme) -> Self {
        Self { tabs, theme }
    }

    /// Render the strip as a single line.
    pub fn to_line(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();

        for (i, tab) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(TAB_GAP, self.theme.separator));
            }

            let label_style = if tab.selected {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };

            spans.push(Span::styled(" ", label_style));
            spans.push(Span::styled(
                status_symbol(tab.status),
                self.theme.status_style(tab.status),
            ));
            spans.push(Span::styled(
                format!(" {} ", truncate_label(&tab.label, MAX_LABEL_WIDTH)),
                label_style,
            ));

            if let Some(badge) = tab.badge {
                spans.push(Span::styled(
                    format!("[{}]", badge.count),
                    self.theme.badge_style(badge.band),
                ));
                spans.push(Span::styled(" ", label_style));
            }
        }

        Line::from(spans)
    }
}

/// Shorten `label` to at most `max_width` terminal columns, ending in `…`
/// when anything was cut. Wide (CJK, emoji) characters count double.
pub fn truncate_label(label: &str, max_width: usize) -> String {
    if label.width() <= max_width {
        return label.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in label.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::tabs::{Tab, TabSelector, TabStatus};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn views() -> Vec<TabView> {
        let tabs = vec![
            Tab::new("today", "Today")
                .with_badge(3)
                .with_status(Some(TabStatus::Running)),
            Tab::new("usage", "Usage"),
        ];
        TabSelector::render(&tabs, "today")
    }

    #[test]
    fn test_tab_bar_contains_labels_and_badge() {
        let theme = Theme::dark();
        let views = views();
        let text = line_text(&TabBar::new(&views, &theme).to_line());
        assert!(text.contains("Today"), "got: {text}");
        assert!(text.contains("Usage"), "got: {text}");
        assert!(text.contains("[3]"), "got: {text}");
        assert!(text.contains("●"), "running status glyph missing: {text}");
    }

    #[test]
    fn test_tab_bar_selected_uses_active_style() {
        let theme = Theme::dark();
        let views = views();
        let line = TabBar::new(&views, &theme).to_line();
        let today = line
            .spans
            .iter()
            .find(|s| s.content.contains("Today"))
            .unwrap();
        let usage = line
            .spans
            .iter()
            .find(|s| s.content.contains("Usage"))
            .unwrap();
        assert_eq!(today.style, theme.tab_active);
        assert_eq!(usage.style, theme.tab_inactive);
    }

    #[test]
    fn test_tab_bar_empty() {
        let theme = Theme::dark();
        let line = TabBar::new(&[], &theme).to_line();
        assert!(line.spans.is_empty());
    }

    #[test]
    fn test_truncate_label_short_unchanged() {
        assert_eq!(truncate_label("Today", 10), "Today");
        assert_eq!(truncate_label("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_label_ascii() {
        let out = truncate_label("a very long session name", 10);
        assert_eq!(out, "a very lo…");
        assert_eq!(out.width(), 10);
    }

    #[test]
    fn test_truncate_label_wide_chars() {
        // Each CJK character is two columns wide.
        let out = truncate_label("日本語のタブ", 6);
        assert_eq!(out, "日本…");
        assert!(out.width() <= 6);
    }

    #[test]
    fn test_truncate_label_zero_width() {
        assert_eq!(truncate_label("Today", 0), "");
    }
}
