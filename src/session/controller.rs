use std::fmt;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::audio::{Cue, CuePlayer, NoCues};
use crate::engine::judge::{self, Verdict};
use crate::engine::pool::{Pool, PromptItem};
use crate::engine::score::ScoreTracker;
use crate::engine::selector::{self, ChoiceOption, OptionFace, Rotation};
use crate::engine::timer::{Clock, Stopwatch, SystemClock};
use crate::error::Result;
use crate::store::{NullSink, StatsSink};

pub const DEFAULT_DISTRACTOR_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    /// Type the answer.
    Input,
    /// Pick the answer from a shuffled set of options.
    Pick,
    /// Shown the answer, pick the prompt it belongs to.
    ReversePick,
}

impl QuizMode {
    pub const ALL: [QuizMode; 3] = [QuizMode::Input, QuizMode::Pick, QuizMode::ReversePick];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Input => "input",
            QuizMode::Pick => "pick",
            QuizMode::ReversePick => "reverse-pick",
        }
    }

    /// Human-readable name for headers and the sidebar.
    pub fn label(self) -> &'static str {
        match self {
            QuizMode::Input => "input",
            QuizMode::Pick => "pick",
            QuizMode::ReversePick => "reverse pick",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }

    fn option_face(self) -> Option<OptionFace> {
        match self {
            QuizMode::Input => None,
            QuizMode::Pick => Some(OptionFace::Answer),
            QuizMode::ReversePick => Some(OptionFace::Key),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub distractor_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            distractor_count: DEFAULT_DISTRACTOR_COUNT,
        }
    }
}

/// Observable controller state. Judging happens inside `submit`, so callers
/// only ever see a session waiting for input or hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Hidden,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Ready,
    Correct { prompt: String, answer: String },
    Incorrect { prompt: String, submitted: String },
    Skipped { prompt: String, answer: String },
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Ready => write!(f, "feedback ~"),
            Feedback::Correct { prompt, answer } => write!(f, "{prompt} = {answer} \u{2713}"),
            Feedback::Incorrect { prompt, submitted } => {
                write!(f, "{prompt} \u{2260} {submitted} \u{2717}")
            }
            Feedback::Skipped { prompt, answer } => write!(f, "skipped ~ {prompt} = {answer}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Typed text, judged against the accepted answers.
    Text(String),
    /// Key of the picked option.
    Option(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was judged. `rotation` is set when a new prompt was drawn.
    Judged {
        verdict: Verdict,
        rotation: Option<Rotation>,
    },
    /// Nothing happened: session hidden, option disabled or unknown, or the
    /// submission kind does not match the mode.
    Ignored,
}

impl SubmitOutcome {
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            SubmitOutcome::Judged { verdict, .. } => Some(verdict),
            SubmitOutcome::Ignored => None,
        }
    }
}

/// Wires collaborators into a new session. Anything not supplied falls back
/// to entropy-seeded randomness, the system clock, silence and no stats.
pub struct SessionBuilder<R: Rng = SmallRng> {
    mode: QuizMode,
    config: SessionConfig,
    rng: R,
    clock: Box<dyn Clock>,
    cues: Box<dyn CuePlayer>,
    stats: Box<dyn StatsSink>,
}

impl SessionBuilder<SmallRng> {
    pub fn new(mode: QuizMode, config: SessionConfig) -> Self {
        Self {
            mode,
            config,
            rng: SmallRng::from_entropy(),
            clock: Box::new(SystemClock),
            cues: Box::new(NoCues),
            stats: Box::new(NullSink),
        }
    }
}

impl<R: Rng> SessionBuilder<R> {
    pub fn rng<R2: Rng>(self, rng: R2) -> SessionBuilder<R2> {
        SessionBuilder {
            mode: self.mode,
            config: self.config,
            rng,
            clock: self.clock,
            cues: self.cues,
            stats: self.stats,
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn cues(mut self, cues: impl CuePlayer + 'static) -> Self {
        self.cues = Box::new(cues);
        self
    }

    pub fn stats(mut self, stats: impl StatsSink + 'static) -> Self {
        self.stats = Box::new(stats);
        self
    }

    pub fn start(self, pool: Pool) -> SessionController<R> {
        SessionController::from_builder(self, pool)
    }

    /// Build the pool from raw items and start. Fails with
    /// [`QuizError::EmptyPool`](crate::error::QuizError::EmptyPool) when
    /// there is nothing to ask.
    pub fn start_with_items(
        self,
        items: impl IntoIterator<Item = PromptItem>,
    ) -> Result<SessionController<R>> {
        let pool = Pool::new(items)?;
        Ok(self.start(pool))
    }
}

pub struct SessionController<R: Rng = SmallRng> {
    pool: Pool,
    mode: QuizMode,
    config: SessionConfig,
    state: SessionState,
    current: Arc<PromptItem>,
    options: Option<Vec<ChoiceOption>>,
    shortfall: usize,
    feedback: Feedback,
    last_rotation: Rotation,
    tracker: ScoreTracker,
    timer: Stopwatch,
    rng: R,
    clock: Box<dyn Clock>,
    cues: Box<dyn CuePlayer>,
    stats: Box<dyn StatsSink>,
}

impl SessionController<SmallRng> {
    pub fn start(pool: Pool, mode: QuizMode, config: SessionConfig) -> Self {
        SessionBuilder::new(mode, config).start(pool)
    }
}

impl<R: Rng> SessionController<R> {
    fn from_builder(builder: SessionBuilder<R>, pool: Pool) -> Self {
        let SessionBuilder {
            mode,
            config,
            mut rng,
            clock,
            cues,
            stats,
        } = builder;

        let first = selector::pick_next(&pool, None, &mut rng);
        let mut controller = Self {
            pool,
            mode,
            config,
            state: SessionState::AwaitingInput,
            current: first.item,
            options: None,
            shortfall: 0,
            feedback: Feedback::Ready,
            last_rotation: first.rotation,
            tracker: ScoreTracker::new(),
            timer: Stopwatch::new(),
            rng,
            clock,
            cues,
            stats,
        };
        controller.rebuild_options();

        tracing::info!(
            mode = mode.as_str(),
            pool_size = controller.pool.len(),
            distractors = config.distractor_count,
            "quiz session started"
        );
        controller
    }

    pub fn submit(&mut self, submission: Submission) -> SubmitOutcome {
        if self.state == SessionState::Hidden {
            return SubmitOutcome::Ignored;
        }

        let (verdict, shown, picked) = match (self.mode, submission) {
            (QuizMode::Input, Submission::Text(text)) => {
                let verdict = judge::evaluate_text(&text, self.current.accepted_answers());
                let shown = match verdict {
                    Verdict::Correct => judge::normalize_answer(&text),
                    Verdict::Incorrect => text,
                };
                (verdict, shown, None)
            }
            (QuizMode::Pick | QuizMode::ReversePick, Submission::Option(key)) => {
                let Some(option) = self
                    .options
                    .as_ref()
                    .and_then(|opts| opts.iter().find(|o| o.key == key))
                else {
                    return SubmitOutcome::Ignored;
                };
                if option.disabled {
                    return SubmitOutcome::Ignored;
                }
                let label = option.label.clone();
                (judge::evaluate_choice(&key, self.current.key()), label, Some(key))
            }
            _ => return SubmitOutcome::Ignored,
        };

        match verdict {
            Verdict::Correct => {
                let now = self.clock.now();
                self.timer.pause(now);
                let secs = self.timer.elapsed(now).as_secs_f64();
                self.timer.reset();
                self.timer.start(now);

                let record = self.tracker.record_correct(self.current.key(), secs);
                self.stats.record_attempt(&record);
                self.cues.play(Cue::Correct);
                tracing::debug!(key = %self.current.key(), secs, "correct");

                self.feedback = Feedback::Correct {
                    prompt: self.prompt_text().to_string(),
                    answer: shown,
                };
                let rotation = self.rotate();
                SubmitOutcome::Judged {
                    verdict,
                    rotation: Some(rotation),
                }
            }
            Verdict::Incorrect => {
                let record = self.tracker.record_incorrect(self.current.key());
                self.stats.record_attempt(&record);
                self.cues.play(Cue::Incorrect);
                tracing::debug!(key = %self.current.key(), submitted = %shown, "incorrect");

                if let (Some(options), Some(key)) = (self.options.as_mut(), picked)
                    && let Some(option) = options.iter_mut().find(|o| o.key == key)
                {
                    option.disabled = true;
                }
                self.feedback = Feedback::Incorrect {
                    prompt: self.prompt_text().to_string(),
                    submitted: shown,
                };
                SubmitOutcome::Judged {
                    verdict,
                    rotation: None,
                }
            }
        }
    }

    pub fn submit_text(&mut self, text: &str) -> SubmitOutcome {
        self.submit(Submission::Text(text.to_string()))
    }

    /// Pick the option at `index` in display order.
    pub fn select_option(&mut self, index: usize) -> SubmitOutcome {
        let key = self
            .options
            .as_ref()
            .and_then(|opts| opts.get(index))
            .map(|o| o.key.clone());
        match key {
            Some(key) => self.submit(Submission::Option(key)),
            None => SubmitOutcome::Ignored,
        }
    }

    /// Reveal the answer and move on without touching the score.
    pub fn skip(&mut self) -> Option<Rotation> {
        if self.state == SessionState::Hidden {
            return None;
        }
        self.cues.play(Cue::Click);
        self.feedback = Feedback::Skipped {
            prompt: self.prompt_text().to_string(),
            answer: self.answer_text().to_string(),
        };

        // The skipped prompt's timing is discarded.
        let was_running = self.timer.is_running();
        self.timer.reset();
        if was_running {
            self.timer.start(self.clock.now());
        }

        tracing::debug!(key = %self.current.key(), "skipped");
        Some(self.rotate())
    }

    /// Hiding pauses the question timer. Showing again does not resume it;
    /// the next correct answer restarts timing.
    pub fn set_hidden(&mut self, hidden: bool) {
        match (self.state, hidden) {
            (SessionState::AwaitingInput, true) => {
                self.timer.pause(self.clock.now());
                self.state = SessionState::Hidden;
            }
            (SessionState::Hidden, false) => {
                self.state = SessionState::AwaitingInput;
            }
            _ => {}
        }
    }

    fn rotate(&mut self) -> Rotation {
        let pick = selector::pick_next(&self.pool, Some(self.current.key()), &mut self.rng);
        if pick.rotation == Rotation::RepeatUnavoidable {
            tracing::debug!(key = %pick.item.key(), "single-item pool, repeating prompt");
        }
        self.current = pick.item;
        self.last_rotation = pick.rotation;
        self.rebuild_options();
        pick.rotation
    }

    fn rebuild_options(&mut self) {
        let Some(face) = self.mode.option_face() else {
            self.options = None;
            self.shortfall = 0;
            return;
        };
        let set = selector::build_choice_set_with(
            &self.pool,
            &self.current,
            self.config.distractor_count,
            face,
            &mut self.rng,
        );
        if set.shortfall > 0 {
            tracing::warn!(
                key = %self.current.key(),
                requested = self.config.distractor_count,
                missing = set.shortfall,
                "not enough distinct distractors, showing fewer options"
            );
        }
        self.shortfall = set.shortfall;
        self.options = Some(set.options);
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.state == SessionState::Hidden
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn current_prompt(&self) -> &PromptItem {
        &self.current
    }

    /// What the learner is asked about: the key, or its primary answer in
    /// reverse pick.
    pub fn prompt_text(&self) -> &str {
        match self.mode {
            QuizMode::ReversePick => self.current.primary_answer(),
            QuizMode::Input | QuizMode::Pick => self.current.key(),
        }
    }

    /// The expected reply to [`prompt_text`](Self::prompt_text).
    pub fn answer_text(&self) -> &str {
        match self.mode {
            QuizMode::ReversePick => self.current.key(),
            QuizMode::Input | QuizMode::Pick => self.current.primary_answer(),
        }
    }

    pub fn current_options(&self) -> Option<&[ChoiceOption]> {
        self.options.as_deref()
    }

    /// Distractors missing from the current option set.
    pub fn option_shortfall(&self) -> usize {
        self.shortfall
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn last_rotation(&self) -> Rotation {
        self.last_rotation
    }

    pub fn score(&self) -> u32 {
        self.tracker.score()
    }

    pub fn correct_count(&self) -> u32 {
        self.tracker.correct_count()
    }

    pub fn wrong_count(&self) -> u32 {
        self.tracker.wrong_count()
    }

    pub fn streak(&self) -> u32 {
        self.tracker.streak()
    }

    pub fn tracker(&self) -> &ScoreTracker {
        &self.tracker
    }

    /// Time spent on the current question so far.
    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms(self.clock.now())
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }
}
