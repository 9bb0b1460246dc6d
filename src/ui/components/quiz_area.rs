use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use kanadrill::engine::selector::ChoiceOption;
use kanadrill::session::controller::{Feedback, QuizMode, SessionController};

use crate::ui::answer_input::AnswerInput;
use crate::ui::theme::Theme;

pub struct QuizArea<'a> {
    session: &'a SessionController,
    answer: &'a AnswerInput,
    theme: &'a Theme,
}

impl<'a> QuizArea<'a> {
    pub fn new(session: &'a SessionController, answer: &'a AnswerInput, theme: &'a Theme) -> Self {
        Self {
            session,
            answer,
            theme,
        }
    }

    fn answer_line(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let (before, cursor, after) = self.answer.render_parts();
        let cursor_style = Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg());
        Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.accent())),
            Span::styled(before.to_string(), Style::default().fg(colors.fg())),
            Span::styled(cursor.map_or(" ".to_string(), |c| c.to_string()), cursor_style),
            Span::styled(after.to_string(), Style::default().fg(colors.fg())),
        ])
    }

    fn option_lines(&self, options: &[ChoiceOption]) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let text = option_text(i, option);
                let style = if option.disabled {
                    Style::default()
                        .fg(colors.option_disabled())
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(text, style))
            })
            .collect()
    }

    fn feedback_line(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let feedback = self.session.feedback();
        let color = match feedback {
            Feedback::Ready => colors.text_pending(),
            Feedback::Correct { .. } => colors.text_correct(),
            Feedback::Incorrect { .. } => colors.text_incorrect(),
            Feedback::Skipped { .. } => colors.warning(),
        };
        Line::from(Span::styled(feedback.to_string(), Style::default().fg(color)))
    }
}

/// Options are numbered from 1 to match the digit keys that pick them.
pub fn option_text(index: usize, option: &ChoiceOption) -> String {
    format!("[{}] {}", index + 1, option.label)
}

impl Widget for QuizArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.session.is_hidden() {
            colors.border()
        } else {
            colors.border_focused()
        };
        let block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let option_count = self.session.current_options().map_or(1, |o| o.len()) as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(option_count + 1),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);

        if self.session.is_hidden() {
            Paragraph::new(Line::from(Span::styled(
                "paused",
                Style::default().fg(colors.text_pending()),
            )))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
            return;
        }

        let prompt = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.session.prompt_text().to_string(),
                Style::default()
                    .fg(colors.prompt())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center);
        prompt.render(layout[1], buf);

        let body = match self.session.mode() {
            QuizMode::Input => vec![self.answer_line()],
            QuizMode::Pick | QuizMode::ReversePick => self
                .session
                .current_options()
                .map(|options| self.option_lines(options))
                .unwrap_or_default(),
        };
        let body_area = centered_column(layout[2], 30);
        Paragraph::new(body).render(body_area, buf);

        Paragraph::new(self.feedback_line())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[3], buf);
    }
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use kanadrill::engine::pool::Pool;
    use kanadrill::session::controller::{SessionBuilder, SessionConfig};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn session(mode: QuizMode) -> SessionController {
        let pool = Pool::from_pairs(&[("あ", &["a"]), ("い", &["i"]), ("う", &["u"])]).unwrap();
        SessionBuilder::new(mode, SessionConfig::default())
            .rng(SmallRng::seed_from_u64(3))
            .start(pool)
    }

    #[test]
    fn test_option_text_numbers_from_one() {
        let option = ChoiceOption {
            key: "か".to_string(),
            label: "ka".to_string(),
            disabled: false,
        };
        assert_eq!(option_text(0, &option), "[1] ka");
    }

    #[test]
    fn test_pick_mode_renders_options() {
        let session = session(QuizMode::Pick);
        let answer = AnswerInput::new();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        QuizArea::new(&session, &answer, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("[1] "));
        assert!(text.contains("[3] "));
        assert!(text.contains("feedback ~"));
    }

    #[test]
    fn test_reverse_pick_prompts_with_reading() {
        let pool =
            Pool::from_pairs(&[("水", &["water"]), ("火", &["fire"]), ("木", &["tree"])]).unwrap();
        let session = SessionBuilder::new(QuizMode::ReversePick, SessionConfig::default())
            .rng(SmallRng::seed_from_u64(4))
            .start(pool);
        let answer = AnswerInput::new();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        QuizArea::new(&session, &answer, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        let reading = session.current_prompt().primary_answer();
        assert!(text.contains(reading));
        for other in ["water", "fire", "tree"].iter().filter(|w| **w != reading) {
            assert!(!text.contains(other));
        }
        assert!(text.contains("[1] "));
    }

    #[test]
    fn test_hidden_session_hides_prompt() {
        let mut session = session(QuizMode::Input);
        session.set_hidden(true);
        let answer = AnswerInput::new();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        QuizArea::new(&session, &answer, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("paused"));
        assert!(!text.contains("feedback"));
    }
}
