use std::time::{Duration, Instant};

use thiserror::Error;

use crate::question::{generate_many, Operation, Question, MAX_DIGITS};
use crate::runtime::{Clock, Countdown};
use crate::scoring::{calculate_score, Review};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("digit count must be between 1 and 9, got {0}")]
    DigitCount(u32),
    #[error("question count must be at least 1")]
    QuestionCount,
    #[error("time limit must be at least 1 second")]
    TimeLimit,
}

/// Settings for one attempt; validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestConfig {
    operation: Operation,
    digit_count: u32,
    question_count: usize,
    time_limit_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            operation: Operation::Addition,
            digit_count: 2,
            question_count: 10,
            time_limit_secs: 60,
        }
    }
}

impl TestConfig {
    pub fn new(
        operation: Operation,
        digit_count: u32,
        question_count: usize,
        time_limit_secs: u64,
    ) -> Result<Self, ConfigError> {
        if !(1..=MAX_DIGITS).contains(&digit_count) {
            return Err(ConfigError::DigitCount(digit_count));
        }
        if question_count == 0 {
            return Err(ConfigError::QuestionCount);
        }
        if time_limit_secs == 0 {
            return Err(ConfigError::TimeLimit);
        }
        Ok(Self {
            operation,
            digit_count,
            question_count,
            time_limit_secs,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn digit_count(&self) -> u32 {
        self.digit_count
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    pub fn with_operation(self, operation: Operation) -> Self {
        Self { operation, ..self }
    }

    pub fn adjust_digits(self, delta: i64) -> Self {
        let digit_count = (self.digit_count as i64 + delta).clamp(1, MAX_DIGITS as i64) as u32;
        Self {
            digit_count,
            ..self
        }
    }

    pub fn adjust_questions(self, delta: i64) -> Self {
        let delta = isize::try_from(delta).unwrap_or(if delta < 0 {
            isize::MIN
        } else {
            isize::MAX
        });
        let question_count = self.question_count.saturating_add_signed(delta).max(1);
        Self {
            question_count,
            ..self
        }
    }

    pub fn adjust_time_limit(self, delta: i64) -> Self {
        let time_limit_secs = self.time_limit_secs.saturating_add_signed(delta).max(1);
        Self {
            time_limit_secs,
            ..self
        }
    }
}

/// Fewer unique questions existed than were asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub requested: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub questions: Vec<Question>,
    pub shortfall: Option<Shortfall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Configuring,
    Running,
    Finished,
}

/// Result sealed into a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptResult {
    pub score: usize,
    pub time_taken_secs: u64,
    pub timed_out: bool,
}

/// Live state of one attempt.
#[derive(Debug, Clone)]
struct Attempt {
    questions: Vec<Question>,
    answers: Vec<String>,
    elapsed: Vec<Duration>,
    current: usize,
    input: String,
    seconds_remaining: u64,
    shown_at: Option<Instant>,
    countdown_generation: u64,
}

impl Attempt {
    fn record_elapsed(&mut self, now: Instant) {
        if let Some(shown_at) = self.shown_at.take() {
            if let Some(total) = self.elapsed.get_mut(self.current) {
                *total += now.saturating_duration_since(shown_at);
                if let Some(q) = self.questions.get_mut(self.current) {
                    q.time_spent_secs = total.as_secs();
                }
            }
        }
    }

    /// Store the trimmed input as the current answer if it is non-blank and
    /// differs from what is already stored.
    fn commit_input(&mut self) {
        let pending = self.input.trim();
        if pending.is_empty() {
            return;
        }
        if let Some(stored) = self.answers.get_mut(self.current) {
            if stored.as_str() != pending {
                *stored = pending.to_string();
            }
        }
    }

    fn show(&mut self, index: usize, now: Instant) {
        self.current = index;
        self.input = self.answers.get(index).cloned().unwrap_or_default();
        self.shown_at = Some(now);
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Configuring,
    Running(Attempt),
    Finished {
        attempt: Attempt,
        result: AttemptResult,
    },
}

/// Owns the lifecycle of a timed attempt: configuring, running, finished.
pub struct SessionController {
    config: TestConfig,
    phase: Phase,
    clock: Box<dyn Clock>,
    countdown: Box<dyn Countdown>,
}

impl SessionController {
    pub fn new(config: TestConfig, clock: Box<dyn Clock>, countdown: Box<dyn Countdown>) -> Self {
        Self {
            config,
            phase: Phase::Configuring,
            clock,
            countdown,
        }
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Replace the configuration. Rejected while an attempt is running.
    pub fn set_config(&mut self, config: TestConfig) -> bool {
        if matches!(self.phase, Phase::Running(_)) {
            tracing::debug!("config change rejected while running");
            return false;
        }
        self.config = config;
        true
    }

    /// Generate questions and begin a new attempt, replacing any previous one.
    pub fn start(&mut self) -> StartOutcome {
        self.start_with(generate_many(
            self.config.operation,
            self.config.digit_count,
            self.config.question_count,
        ))
    }

    /// Begin an attempt with an already generated question set.
    pub fn start_with(&mut self, questions: Vec<Question>) -> StartOutcome {
        self.countdown.cancel();

        let requested = self.config.question_count;
        let shortfall = (questions.len() < requested).then(|| Shortfall {
            requested,
            actual: questions.len(),
        });
        if let Some(s) = shortfall {
            tracing::warn!(
                requested = s.requested,
                actual = s.actual,
                "not enough unique questions, continuing with a shorter set"
            );
        }

        let count = questions.len();
        let countdown_generation = self.countdown.arm();
        let attempt = Attempt {
            answers: vec![String::new(); count],
            elapsed: vec![Duration::ZERO; count],
            questions: questions.clone(),
            current: 0,
            input: String::new(),
            seconds_remaining: self.config.time_limit_secs,
            shown_at: Some(self.clock.now()),
            countdown_generation,
        };
        self.phase = Phase::Running(attempt);

        tracing::info!(
            operation = %self.config.operation,
            digits = self.config.digit_count,
            questions = count,
            time_limit = self.config.time_limit_secs,
            "attempt started"
        );

        StartOutcome {
            questions,
            shortfall,
        }
    }

    /// Route a countdown event; events from a cancelled countdown are dropped.
    pub fn on_countdown(&mut self, generation: u64) {
        let owned = match &self.phase {
            Phase::Running(a) => a.countdown_generation == generation,
            _ => false,
        };
        if owned && self.countdown.is_current(generation) {
            self.on_tick();
        }
    }

    /// One countdown second. On reaching zero, any pending input is
    /// committed and the attempt finishes as timed out.
    pub fn on_tick(&mut self) {
        let expired = match &mut self.phase {
            Phase::Running(attempt) => {
                attempt.seconds_remaining = attempt.seconds_remaining.saturating_sub(1);
                if attempt.seconds_remaining == 0 {
                    attempt.commit_input();
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if expired {
            self.finish(true);
        }
    }

    pub fn set_input_buffer(&mut self, text: impl Into<String>) {
        if let Phase::Running(attempt) = &mut self.phase {
            attempt.input = text.into();
        }
    }

    /// Commit the pending answer and move to the next question, finishing
    /// after the last one.
    pub fn commit_and_advance(&mut self) {
        let now = self.clock.now();
        let finished = match &mut self.phase {
            Phase::Running(attempt) => {
                attempt.record_elapsed(now);
                attempt.commit_input();
                attempt.input.clear();
                let next = attempt.current + 1;
                if next < attempt.questions.len() {
                    attempt.show(next, now);
                    false
                } else {
                    true
                }
            }
            _ => false,
        };
        if finished {
            self.finish(false);
        }
    }

    /// Jump to another question. Out-of-range targets leave state untouched.
    pub fn navigate_to(&mut self, index: usize) {
        let now = self.clock.now();
        if let Phase::Running(attempt) = &mut self.phase {
            if index >= attempt.questions.len() {
                tracing::debug!(index, "ignoring navigation to missing question");
                return;
            }
            attempt.record_elapsed(now);
            attempt.commit_input();
            attempt.show(index, now);
        }
    }

    pub fn finish_manually(&mut self) {
        if let Phase::Running(attempt) = &mut self.phase {
            let pending = attempt.input.trim();
            if !pending.is_empty() {
                let pending = pending.to_string();
                if let Some(stored) = attempt.answers.get_mut(attempt.current) {
                    *stored = pending;
                }
            }
            self.finish(false);
        }
    }

    fn finish(&mut self, timed_out: bool) {
        self.countdown.cancel();
        let now = self.clock.now();

        let phase = std::mem::replace(&mut self.phase, Phase::Configuring);
        self.phase = match phase {
            Phase::Running(mut attempt) => {
                attempt.record_elapsed(now);
                let limit = self.config.time_limit_secs;
                let result = AttemptResult {
                    score: calculate_score(&attempt.answers, &attempt.questions),
                    time_taken_secs: if timed_out {
                        limit
                    } else {
                        limit.saturating_sub(attempt.seconds_remaining)
                    },
                    timed_out,
                };
                tracing::info!(
                    score = result.score,
                    total = attempt.questions.len(),
                    time_taken = result.time_taken_secs,
                    timed_out,
                    "attempt finished"
                );
                Phase::Finished { attempt, result }
            }
            other => other,
        };
    }

    /// Discard the attempt and return to configuring.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.phase = Phase::Configuring;
    }

    fn attempt(&self) -> Option<&Attempt> {
        match &self.phase {
            Phase::Configuring => None,
            Phase::Running(attempt) | Phase::Finished { attempt, .. } => Some(attempt),
        }
    }

    pub fn phase(&self) -> PhaseKind {
        match self.phase {
            Phase::Configuring => PhaseKind::Configuring,
            Phase::Running(_) => PhaseKind::Running,
            Phase::Finished { .. } => PhaseKind::Finished,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == PhaseKind::Running
    }

    pub fn questions(&self) -> &[Question] {
        self.attempt().map(|a| a.questions.as_slice()).unwrap_or(&[])
    }

    pub fn answers(&self) -> &[String] {
        self.attempt().map(|a| a.answers.as_slice()).unwrap_or(&[])
    }

    pub fn current_index(&self) -> usize {
        self.attempt().map(|a| a.current).unwrap_or(0)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.attempt().and_then(|a| a.questions.get(a.current))
    }

    pub fn input_buffer(&self) -> &str {
        self.attempt().map(|a| a.input.as_str()).unwrap_or("")
    }

    /// Seconds left on the countdown; the configured limit before a start.
    pub fn seconds_remaining(&self) -> u64 {
        self.attempt()
            .map(|a| a.seconds_remaining)
            .unwrap_or(self.config.time_limit_secs)
    }

    /// Recorded time on each question, in whole seconds.
    pub fn elapsed_secs(&self) -> Vec<u64> {
        self.attempt()
            .map(|a| a.elapsed.iter().map(Duration::as_secs).collect())
            .unwrap_or_default()
    }

    pub fn result(&self) -> Option<AttemptResult> {
        match &self.phase {
            Phase::Finished { result, .. } => Some(*result),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<usize> {
        self.result().map(|r| r.score)
    }

    pub fn time_taken_secs(&self) -> Option<u64> {
        self.result().map(|r| r.time_taken_secs)
    }

    pub fn review(&self) -> Option<Review> {
        match &self.phase {
            Phase::Finished { attempt, .. } => Some(Review::new(&attempt.answers, &attempt.questions)),
            _ => None,
        }
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_armed()
    }
}
