use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use kanadrill::dataset::GroupDef;

use crate::ui::theme::Theme;

pub struct GroupSelect<'a> {
    groups: &'a [GroupDef],
    pending: &'a [String],
    selected: usize,
    status: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> GroupSelect<'a> {
    pub fn new(
        groups: &'a [GroupDef],
        pending: &'a [String],
        selected: usize,
        status: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            groups,
            pending,
            selected,
            status,
            theme,
        }
    }
}

/// First row index to draw so `selected` stays inside a window of `height` rows.
pub fn scroll_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    selected.saturating_sub(height - 1)
}

impl Widget for GroupSelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Groups ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            format!("  {} selected", self.pending.len()),
            Style::default().fg(colors.text_pending()),
        )))
        .render(layout[0], buf);

        let offset = scroll_offset(self.selected, layout[1].height as usize);
        let lines: Vec<Line> = self
            .groups
            .iter()
            .enumerate()
            .skip(offset)
            .map(|(i, group)| {
                let is_selected = i == self.selected;
                let checked = self.pending.iter().any(|g| *g == group.id);
                let text = format!(
                    " {} [{}] {}",
                    if is_selected { ">" } else { " " },
                    if checked { "x" } else { " " },
                    group.label,
                );
                let style = Style::default()
                    .fg(if is_selected {
                        colors.accent()
                    } else if checked {
                        colors.fg()
                    } else {
                        colors.text_pending()
                    })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });
                Line::from(Span::styled(text, style))
            })
            .collect();
        Paragraph::new(lines).render(layout[1], buf);

        let footer = match self.status {
            Some(msg) => Line::from(Span::styled(
                format!("  {msg}"),
                Style::default().fg(colors.error()),
            )),
            None => Line::from(Span::styled(
                "  [Space] Toggle  [Enter] Save  [ESC] Cancel",
                Style::default().fg(colors.text_pending()),
            )),
        };
        Paragraph::new(footer).render(layout[2], buf);
    }
}
