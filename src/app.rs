use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use kanadrill::audio::TerminalBell;
use kanadrill::config::Config;
use kanadrill::dataset::{BundledDatasets, DatasetProvider};
use kanadrill::engine::timer::Stopwatch;
use kanadrill::session::controller::{
    QuizMode, SessionBuilder, SessionConfig, SessionController, SubmitOutcome,
};
use kanadrill::session::result::SessionSummary;
use kanadrill::store::json_store::JsonStore;
use kanadrill::store::schema::{SessionHistoryData, StatsData};

use crate::ui::answer_input::AnswerInput;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    Stats,
    Groups,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub datasets: BundledDatasets,
    pub session: Option<SessionController>,
    pub answer: AnswerInput,
    pub stats: Rc<RefCell<StatsData>>,
    pub session_history: SessionHistoryData,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub stats_tab: usize,
    pub stats_scroll: usize,
    pub group_selected: usize,
    pub pending_groups: Vec<String>,
    session_clock: Stopwatch,
    stats_return: AppScreen,
}

impl App {
    pub fn new(config: Config, datasets: BundledDatasets, store: Option<JsonStore>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let mut menu = Menu::new(theme);
        menu.select(MenuAction::for_mode(config.quiz_mode()));

        let (stats, session_history) = match store {
            Some(ref s) => (s.load_stats(), s.load_session_history()),
            None => (StatsData::default(), SessionHistoryData::default()),
        };

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            datasets,
            session: None,
            answer: AnswerInput::new(),
            stats: Rc::new(RefCell::new(stats)),
            session_history,
            store,
            should_quit: false,
            status_message: None,
            stats_tab: 0,
            stats_scroll: 0,
            group_selected: 0,
            pending_groups: Vec::new(),
            session_clock: Stopwatch::new(),
            stats_return: AppScreen::Menu,
        }
    }

    pub fn start_quiz(&mut self, mode: QuizMode) {
        let pool = match self.datasets.pool(&self.config.groups) {
            Ok(pool) => pool,
            Err(err) => {
                tracing::warn!(%err, groups = ?self.config.groups, "cannot start quiz");
                self.status_message = Some(err.to_string());
                return;
            }
        };

        let session_config = SessionConfig {
            distractor_count: self.config.distractor_count,
        };
        let session = SessionBuilder::new(mode, session_config)
            .cues(TerminalBell {
                enabled: self.config.sound_enabled,
            })
            .stats(Rc::clone(&self.stats))
            .start(pool);

        self.session = Some(session);
        self.menu.select(MenuAction::for_mode(mode));
        self.answer.clear();
        self.status_message = None;
        self.session_clock.reset();
        self.session_clock.start(Instant::now());
        self.screen = AppScreen::Quiz;
    }

    pub fn submit_answer(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let outcome = session.submit_text(self.answer.value());
        if matches!(outcome, SubmitOutcome::Judged { .. }) {
            self.answer.clear();
        }
    }

    pub fn select_option(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            session.select_option(index);
        }
    }

    pub fn skip_prompt(&mut self) {
        if let Some(session) = self.session.as_mut()
            && session.skip().is_some()
        {
            self.answer.clear();
        }
    }

    /// Ends the running quiz, logging it to history if anything was answered.
    pub fn finish_quiz(&mut self) {
        if let Some(session) = self.session.take() {
            let elapsed = self.session_clock.elapsed(Instant::now()).as_secs_f64();
            let summary = SessionSummary::from_session(&session, &self.config.groups, elapsed);
            tracing::info!(
                mode = %summary.mode,
                correct = summary.correct,
                wrong = summary.wrong,
                score = summary.score,
                "quiz finished"
            );
            if summary.attempts() > 0 {
                self.session_history.push(summary);
            }
        }
        self.session_clock.reset();
        self.answer.clear();
        self.save_data();
        self.screen = AppScreen::Menu;
    }

    pub fn session_elapsed_secs(&self) -> f64 {
        self.session_clock.elapsed(Instant::now()).as_secs_f64()
    }

    /// Focus changes only matter while the quiz is on screen; the stats view
    /// already holds the session hidden.
    pub fn set_focus(&mut self, focused: bool) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        self.set_quiz_hidden(!focused);
    }

    fn set_quiz_hidden(&mut self, hidden: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.set_hidden(hidden);
        if hidden {
            self.session_clock.pause(Instant::now());
        } else {
            self.session_clock.start(Instant::now());
        }
    }

    pub fn go_to_menu(&mut self) {
        if self.session.is_some() {
            self.finish_quiz();
        }
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_stats(&mut self) {
        self.stats_return = self.screen;
        if self.screen == AppScreen::Quiz {
            self.set_quiz_hidden(true);
        }
        self.stats_tab = 0;
        self.stats_scroll = 0;
        self.screen = AppScreen::Stats;
    }

    pub fn leave_stats(&mut self) {
        if self.stats_return == AppScreen::Quiz && self.session.is_some() {
            self.screen = AppScreen::Quiz;
            self.set_quiz_hidden(false);
        } else {
            self.screen = AppScreen::Menu;
        }
    }

    pub fn go_to_groups(&mut self) {
        self.pending_groups = self.config.groups.clone();
        self.group_selected = 0;
        self.status_message = None;
        self.screen = AppScreen::Groups;
    }

    pub fn toggle_selected_group(&mut self) {
        let Some(group) = self.datasets.groups().get(self.group_selected) else {
            return;
        };
        if let Some(pos) = self.pending_groups.iter().position(|g| *g == group.id) {
            self.pending_groups.remove(pos);
        } else {
            self.pending_groups.push(group.id.clone());
        }
    }

    pub fn group_next(&mut self) {
        let count = self.datasets.groups().len();
        if count > 0 {
            self.group_selected = (self.group_selected + 1) % count;
        }
    }

    pub fn group_prev(&mut self) {
        let count = self.datasets.groups().len();
        if count > 0 {
            self.group_selected = (self.group_selected + count - 1) % count;
        }
    }

    /// Commits the pending group selection and persists it.
    pub fn confirm_groups(&mut self) -> bool {
        if !self.apply_pending_groups() {
            return false;
        }
        if let Err(err) = self.config.save() {
            tracing::warn!(%err, "failed to save config");
        }
        true
    }

    /// An empty selection is refused and leaves the group screen open.
    fn apply_pending_groups(&mut self) -> bool {
        if self.pending_groups.is_empty() {
            self.status_message = Some("select at least one group".to_string());
            return false;
        }
        let order = self.datasets.group_ids();
        let mut groups = std::mem::take(&mut self.pending_groups);
        groups.sort_by_key(|g| {
            order
                .iter()
                .position(|id| *id == g.as_str())
                .unwrap_or(usize::MAX)
        });
        self.config.groups = groups;
        self.status_message = None;
        self.screen = AppScreen::Menu;
        true
    }

    pub fn save_data(&self) {
        let Some(ref store) = self.store else {
            return;
        };
        if let Err(err) = store.save_stats(&self.stats.borrow()) {
            tracing::error!(%err, "failed to save stats");
        }
        if let Err(err) = store.save_session_history(&self.session_history) {
            tracing::error!(%err, "failed to save session history");
        }
    }
}
