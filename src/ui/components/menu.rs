use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use kanadrill::session::controller::QuizMode;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    InputQuiz,
    PickQuiz,
    ReversePickQuiz,
    Groups,
    Stats,
    Quit,
}

impl MenuAction {
    pub fn for_mode(mode: QuizMode) -> Self {
        match mode {
            QuizMode::Input => MenuAction::InputQuiz,
            QuizMode::Pick => MenuAction::PickQuiz,
            QuizMode::ReversePick => MenuAction::ReversePickQuiz,
        }
    }
}

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        let item = |key: &str, label: &str, description: &str, action| MenuItem {
            key: key.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            action,
        };
        Self {
            items: vec![
                item("1", "Input Quiz", "Type the reading of each prompt", MenuAction::InputQuiz),
                item("2", "Pick Quiz", "Choose the reading from a short list", MenuAction::PickQuiz),
                item("3", "Reverse Pick", "Shown the reading, choose the kana or word", MenuAction::ReversePickQuiz),
                item("g", "Groups", "Choose which kana rows and word lists to drill", MenuAction::Groups),
                item("s", "Statistics", "Per-prompt accuracy and past sessions", MenuAction::Stats),
                item("q", "Quit", "Save and exit", MenuAction::Quit),
            ],
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|i| i.action)
    }

    /// Move the highlight to `action`, leaving it alone if the menu lacks it.
    pub fn select(&mut self, action: MenuAction) {
        if let Some(pos) = self.items.iter().position(|i| i.action == action) {
            self.selected = pos;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "kanadrill",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "かな Flashcards",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];

        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.label);
            let desc_text = format!("     {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    &*label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(
                    &*desc_text,
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            let p = Paragraph::new(lines);
            if i < menu_layout.len() {
                p.render(menu_layout[i], buf);
            }
        }
    }
}
