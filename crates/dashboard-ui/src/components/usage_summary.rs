//! Side-by-side usage blocks with a refresh hint.

use dashboard_core::usage::UsageBlockView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

pub struct UsageSummaryPanel<'a> {
    pub blocks: &'a [UsageBlockView; 2],
    pub theme: &'a Theme,
}

impl<'a> UsageSummaryPanel<'a> {
    pub fn new(blocks: &'a [UsageBlockView; 2], theme: &'a Theme) -> Self {
        Self { blocks, theme }
    }

    /// Body lines for one block. Token rows appear only when the block
    /// carries them.
    pub fn block_lines(&self, block: &'a UsageBlockView) -> Vec<Line<'a>> {
        let row = |label: &'static str, value: &'a str| {
            Line::from(vec![
                Span::styled(format!("{:<12}", label), self.theme.label),
                Span::styled(value, self.theme.value),
            ])
        };

        let mut lines = vec![row("Sessions", &block.sessions), row("Cost", &block.cost)];
        if let Some(tokens_in) = &block.tokens_in {
            lines.push(row("Tokens in", tokens_in));
        }
        if let Some(tokens_out) = &block.tokens_out {
            lines.push(row("Tokens out", tokens_out));
        }
        lines
    }

    /// Draw both blocks in two equal columns above a one-line hint.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        for (block, column) in self.blocks.iter().zip(columns.iter()) {
            let paragraph = Paragraph::new(Text::from(self.block_lines(block))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(Span::styled(format!(" {} ", block.title), self.theme.header)),
            );
            frame.render_widget(paragraph, *column);
        }

        let hint = Line::from(vec![
            Span::styled("r", self.theme.value),
            Span::styled(" refresh", self.theme.dim),
        ]);
        frame.render_widget(Paragraph::new(hint), rows[1]);
    }
}
