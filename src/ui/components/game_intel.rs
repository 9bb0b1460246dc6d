use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use kanadrill::session::controller::{Feedback, SessionController};

use crate::ui::theme::Theme;

/// Sidebar summary of the running quiz.
pub struct GameIntel<'a> {
    session: &'a SessionController,
    groups: &'a [String],
    elapsed_secs: f64,
    theme: &'a Theme,
}

impl<'a> GameIntel<'a> {
    pub fn new(
        session: &'a SessionController,
        groups: &'a [String],
        elapsed_secs: f64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            groups,
            elapsed_secs,
            theme,
        }
    }
}

pub fn group_names(groups: &[String]) -> String {
    let mut names: Vec<String> = groups.iter().map(|g| g.to_lowercase()).collect();
    names.sort();
    names.dedup();
    names.join(", ")
}

pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl Widget for GameIntel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;

        let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.fg()));
        let feedback_color = match session.feedback() {
            Feedback::Ready => colors.text_pending(),
            Feedback::Correct { .. } => colors.success(),
            Feedback::Incorrect { .. } => colors.error(),
            Feedback::Skipped { .. } => colors.warning(),
        };

        let accuracy = session.tracker().accuracy();
        let avg = session
            .tracker()
            .average_response_secs()
            .map_or("-".to_string(), |s| format!("{s:.1}s"));

        let lines = vec![
            Line::from(vec![
                label("Mode: "),
                Span::styled(
                    session.mode().label(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                session.feedback().to_string(),
                Style::default().fg(feedback_color),
            )),
            Line::from(""),
            Line::from(vec![
                label("Correct: "),
                Span::styled(
                    session.correct_count().to_string(),
                    Style::default().fg(colors.success()),
                ),
            ]),
            Line::from(vec![
                label("Wrong:   "),
                Span::styled(
                    session.wrong_count().to_string(),
                    Style::default().fg(colors.error()),
                ),
            ]),
            Line::from(vec![
                label("Score:   "),
                Span::styled(session.score().to_string(), Style::default().fg(colors.accent())),
            ]),
            Line::from(vec![
                label("Streak:  "),
                Span::styled(session.streak().to_string(), Style::default().fg(colors.accent())),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Accuracy: "),
                Span::styled(
                    format!("{accuracy:.1}%"),
                    Style::default().fg(if accuracy >= 90.0 {
                        colors.success()
                    } else if accuracy >= 70.0 {
                        colors.warning()
                    } else {
                        colors.error()
                    }),
                ),
            ]),
            Line::from(vec![
                label("Avg time: "),
                Span::styled(avg, Style::default().fg(colors.fg())),
            ]),
            Line::from(vec![
                label("Session:  "),
                Span::styled(format_clock(self.elapsed_secs), Style::default().fg(colors.fg())),
            ]),
            Line::from(""),
            Line::from(label("Groups:")),
            Line::from(Span::styled(
                group_names(self.groups),
                Style::default().fg(colors.text_pending()),
            )),
        ];

        let block = Block::bordered()
            .title(" Game Intel ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names_sorted_lowercase() {
        let groups = vec![
            "Katakana-A".to_string(),
            "hiragana-ka".to_string(),
            "hiragana-a".to_string(),
        ];
        assert_eq!(group_names(&groups), "hiragana-a, hiragana-ka, katakana-a");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(75.9), "01:15");
        assert_eq!(format_clock(-3.0), "00:00");
    }
}
