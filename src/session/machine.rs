// src/session/machine.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use std::fmt;
use uuid::Uuid;

use crate::models::test_result::{AnswerRecord, TestResult};

/// Lifecycle of a single mock-test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet issued questions.
    Configuring,
    /// Countdown active, answers being collected.
    Running,
    /// Finalized. Terminal; the result is immutable from here.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    NotRunning,
    Expired,
    EmptyOption,
    NoQuestions,
    UnknownQuestion(i64),
    IndexOutOfRange(usize),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRunning => write!(f, "session is not running"),
            SessionError::Expired => write!(f, "session deadline has passed"),
            SessionError::EmptyOption => write!(f, "answer option is empty"),
            SessionError::NoQuestions => write!(f, "no questions issued"),
            SessionError::UnknownQuestion(id) => write!(f, "unknown question id {}", id),
            SessionError::IndexOutOfRange(idx) => write!(f, "question index {} out of range", idx),
        }
    }
}

impl std::error::Error for SessionError {}

/// Attempt configuration captured at start.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub company: String,
    pub role: String,
    pub experience: String,
    pub test_type: String,
    pub duration_minutes: i64,
}

/// A question as issued to one attempt. Immutable for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionQuestion {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Default)]
struct AnswerSlot {
    selected: Option<String>,
    submitted: bool,
}

/// Outcome of `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    Advanced,
    /// On the last question with an unsubmitted answer: submit first.
    SubmitPending,
    /// On the last question with its answer submitted: finalize now.
    Finish,
}

/// State machine for one timed test attempt.
///
/// Time never comes from a hidden clock: every deadline-sensitive transition
/// takes `now` explicitly, so expiry behavior is deterministic under test.
/// Real-time enforcement lives in [`super::SessionRegistry`], which arms one
/// cancellable timer per session.
#[derive(Debug, Clone)]
pub struct TestSession {
    id: Uuid,
    user_id: i64,
    config: TestConfig,
    questions: Vec<SessionQuestion>,
    slots: Vec<AnswerSlot>,
    /// Staged selection for the current question, not yet committed.
    pending: Option<String>,
    current: usize,
    started_at: DateTime<Utc>,
    state: SessionState,
}

impl TestSession {
    pub fn new(user_id: i64, config: TestConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            config,
            questions: Vec::new(),
            slots: Vec::new(),
            pending: None,
            current: 0,
            started_at: DateTime::<Utc>::MIN_UTC,
            state: SessionState::Configuring,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The committed answer for a question, if any.
    pub fn saved_answer(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.selected.as_deref())
    }

    /// Issue the question set and start the countdown.
    pub fn begin(
        &mut self,
        questions: Vec<SessionQuestion>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Configuring {
            return Err(SessionError::NotRunning);
        }
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.slots = vec![AnswerSlot::default(); questions.len()];
        self.questions = questions;
        self.pending = None;
        self.current = 0;
        self.started_at = now;
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(self.config.duration_minutes * 60)
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline() - now).num_seconds().max(0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Stage a selection for the current question without committing it.
    /// A staged selection survives until navigation or expiry, where the
    /// timeout path auto-submits it.
    ///
    /// Staging and navigation ([`Self::advance`], [`Self::go_to`]) model the
    /// interactive question-by-question flow a test-taking client drives;
    /// the REST handlers commit answers directly via [`Self::submit_answer`].
    pub fn select(&mut self, option: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        if option.trim().is_empty() {
            return Err(SessionError::EmptyOption);
        }
        self.pending = Some(option.to_string());
        Ok(())
    }

    /// Commit an answer for the given question.
    ///
    /// The answer lands in its slot immediately, so nothing downstream
    /// (network, storage) can lose it once this returns Ok.
    pub fn submit_answer(
        &mut self,
        question_id: i64,
        option: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        if self.is_expired(now) {
            return Err(SessionError::Expired);
        }
        if option.trim().is_empty() {
            return Err(SessionError::EmptyOption);
        }

        let index = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;

        self.slots[index].selected = Some(option.to_string());
        self.slots[index].submitted = true;
        if index == self.current {
            self.pending = None;
        }
        Ok(index)
    }

    /// Step to the next question, or report what must happen on the last one.
    /// Moving forward preloads any previously committed answer for the next
    /// question so navigation never loses data.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        if self.is_expired(now) {
            return Err(SessionError::Expired);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.pending = self.slots[self.current].selected.clone();
            Ok(AdvanceOutcome::Advanced)
        } else if self.slots[self.current].submitted {
            Ok(AdvanceOutcome::Finish)
        } else {
            Ok(AdvanceOutcome::SubmitPending)
        }
    }

    /// Navigate to an arbitrary question, reloading its committed answer.
    /// Returns that answer so the caller can redisplay it.
    pub fn go_to(&mut self, index: usize) -> Result<Option<String>, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange(index));
        }
        self.current = index;
        self.pending = self.slots[index].selected.clone();
        Ok(self.pending.clone())
    }

    /// Grade the committed answers and transition to `Completed`.
    ///
    /// Pure and infallible: persistence happens elsewhere and a storage
    /// failure can never un-complete a session.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> TestResult {
        let records: Vec<AnswerRecord> = self
            .questions
            .iter()
            .zip(&self.slots)
            .map(|(question, slot)| {
                let is_correct =
                    is_correct_answer(slot.selected.as_deref(), &question.correct_answer);
                AnswerRecord {
                    question_id: question.id,
                    selected_option: slot.selected.clone(),
                    is_correct,
                    score_percent: if is_correct { 100 } else { 0 },
                }
            })
            .collect();

        let total = records.len() as i64;
        let correct = records.iter().filter(|r| r.is_correct).count() as i64;

        self.state = SessionState::Completed;

        TestResult {
            id: 0,
            user_id: self.user_id,
            test_id: self.id.to_string(),
            company: self.config.company.clone(),
            role: self.config.role.clone(),
            test_type: self.config.test_type.clone(),
            experience: self.config.experience.clone(),
            duration_minutes: self.config.duration_minutes,
            total_questions: total,
            correct_answers: correct,
            final_score_percent: final_score_percent(correct, total),
            answers: Json(records),
            completed_at: now,
        }
    }

    /// Timeout path: commit any staged selection for the current question,
    /// then finalize. The only timer-driven transition in the system.
    pub fn expire(&mut self, now: DateTime<Utc>) -> TestResult {
        if let Some(pending) = self.pending.take() {
            if self.state == SessionState::Running
                && !pending.trim().is_empty()
                && !self.slots[self.current].submitted
            {
                self.slots[self.current].selected = Some(pending);
                self.slots[self.current].submitted = true;
            }
        }
        self.finalize(now)
    }
}

/// Trimmed, case-insensitive answer comparison. Blank or missing selections
/// never score, and an empty correct answer never matches anything.
pub fn is_correct_answer(selected: Option<&str>, correct: &str) -> bool {
    let correct = correct.trim().to_lowercase();
    if correct.is_empty() {
        return false;
    }
    match selected {
        Some(s) => s.trim().to_lowercase() == correct,
        None => false,
    }
}

/// Rounded percentage score. Zero-question attempts score zero rather than
/// dividing by zero; the dashboard excludes them entirely.
pub fn final_score_percent(correct: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as i64
}
