use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use kanadrill::engine::score::{HistoryEntry, ScoreTracker};
use kanadrill::session::result::SessionSummary;
use kanadrill::store::schema::StatsData;

use crate::ui::theme::Theme;

pub const TAB_COUNT: usize = 2;

pub struct StatsDashboard<'a> {
    pub stats: &'a StatsData,
    pub history: &'a [SessionSummary],
    pub current: Option<&'a ScoreTracker>,
    pub active_tab: usize,
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> StatsDashboard<'a> {
    pub fn new(
        stats: &'a StatsData,
        history: &'a [SessionSummary],
        current: Option<&'a ScoreTracker>,
        active_tab: usize,
        scroll: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            stats,
            history,
            current,
            active_tab,
            scroll,
            theme,
        }
    }

    fn render_items(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "  Lifetime: {} correct, {} wrong",
                self.stats.total_correct, self.stats.total_wrong
            ),
            Style::default().fg(colors.fg()),
        ))];
        if let Some(tracker) = self.current {
            lines.push(Line::from(Span::styled(
                format!(
                    "  This session: {} correct, {} wrong, score {}, best streak {}",
                    tracker.correct_count(),
                    tracker.wrong_count(),
                    tracker.score(),
                    tracker.best_streak()
                ),
                Style::default().fg(colors.accent()),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {:<10} {:>8} {:>8} {:>10}", "prompt", "tries", "acc", "avg"),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));

        let entries = self.stats.weakest(self.stats.items.len());
        for (key, entry) in entries.into_iter().skip(self.scroll) {
            let accuracy = entry.accuracy();
            let color = if accuracy >= 90.0 {
                colors.success()
            } else if accuracy >= 70.0 {
                colors.warning()
            } else {
                colors.error()
            };
            lines.push(Line::from(Span::styled(item_row(key, entry), Style::default().fg(color))));
        }

        Paragraph::new(lines).render(area, buf);
    }

    fn render_sessions(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "  {:<17} {:<6} {:>6} {:>6} {:>7}  {}",
                "when", "mode", "score", "acc", "time", "groups"
            ),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];

        for summary in self.history.iter().rev().skip(self.scroll) {
            let row = format!(
                "  {:<17} {:<6} {:>6} {:>5.1}% {:>6.0}s  {}",
                summary.timestamp.format("%Y-%m-%d %H:%M"),
                summary.mode,
                summary.score,
                summary.accuracy,
                summary.elapsed_secs,
                summary.groups.join(", "),
            );
            lines.push(Line::from(Span::styled(row, Style::default().fg(colors.fg()))));
        }

        Paragraph::new(lines).render(area, buf);
    }
}

fn item_row(key: &str, entry: &HistoryEntry) -> String {
    let avg = entry
        .average_response_secs()
        .map_or("-".to_string(), |s| format!("{s:.2}s"));
    format!(
        "  {:<10} {:>8} {:>7.0}% {:>10}",
        key,
        entry.attempts,
        entry.accuracy(),
        avg
    )
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.stats.items.is_empty() && self.history.is_empty() && self.current.is_none() {
            let msg = Paragraph::new(Line::from(Span::styled(
                "No answers recorded yet. Start a quiz!",
                Style::default().fg(colors.text_pending()),
            )));
            msg.render(inner, buf);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(inner);

        let tabs = ["[1] Prompts", "[2] Sessions"];
        let tab_spans: Vec<Span> = tabs
            .iter()
            .enumerate()
            .flat_map(|(i, &label)| {
                let style = if i == self.active_tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.text_pending())
                };
                vec![Span::styled(format!(" {label} "), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        match self.active_tab {
            0 => self.render_items(layout[1], buf),
            _ => self.render_sessions(layout[1], buf),
        }

        Paragraph::new(Line::from(Span::styled(
            "  [ESC] Back  [Tab] Next tab  [1-2] Switch tab  [j/k] Scroll",
            Style::default().fg(colors.text_pending()),
        )))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use kanadrill::engine::judge::Verdict;
    use kanadrill::engine::score::AttemptRecord;

    use super::*;

    #[test]
    fn test_item_row_formats_average() {
        let mut entry = HistoryEntry::default();
        entry.apply(Verdict::Correct, Some(1.5));
        entry.apply(Verdict::Incorrect, None);
        let row = item_row("か", &entry);
        assert!(row.contains("1.50s"));
        assert!(row.contains("50%"));
    }

    #[test]
    fn test_renders_weakest_item() {
        let mut stats = StatsData::default();
        stats.apply(&AttemptRecord {
            key: "ka".to_string(),
            verdict: Verdict::Incorrect,
            response_time_secs: None,
        });
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        StatsDashboard::new(&stats, &[], None, 0, 0, &theme).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("ka"));
        assert!(text.contains("Lifetime: 0 correct, 1 wrong"));
    }
}
