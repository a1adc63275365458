//! Timed quiz session state machine.
//!
//! The session does no I/O. Operations that end the attempt (`finish`, the
//! final `tick`, `next` on the last item) hand back a [`GradeTicket`] the
//! first time only; the caller issues the grading call with it and reports
//! the outcome through [`QuizSession::complete_grade`]. Every `reset` bumps
//! the generation, so an outcome for an earlier attempt is recognised as
//! stale and dropped.

use crate::error::{AnswerError, ApiError, QuizError};
use crate::model::{Answer, AnswerPayload, ExerciseGradeIn, ExerciseGradeOut, ExerciseItem};
use crate::timer::{time_level, TimeLevel};

/// Duration of every quiz attempt, in seconds.
pub const TOTAL_TIME: u32 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready { running: bool },
    /// Finished, grading call in flight.
    Grading,
    Graded,
    GradeFailed,
}

/// Answers snapshot to be graded, tagged with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTicket {
    pub generation: u64,
    pub answers: Vec<Answer>,
}

impl GradeTicket {
    pub fn into_request(self) -> ExerciseGradeIn {
        ExerciseGradeIn {
            answers_json: self.answers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    items: Vec<ExerciseItem>,
    current_index: usize,
    /// Unique by `item_id`, in first-answered order.
    answers: Vec<Answer>,
    time_remaining: u32,
    running: bool,
    finished: bool,
    result: Option<ExerciseGradeOut>,
    grade_error: Option<ApiError>,
    generation: u64,
}

impl QuizSession {
    /// A freshly loaded session: timer full and stopped.
    pub fn new(items: Vec<ExerciseItem>) -> Self {
        Self {
            items,
            current_index: 0,
            answers: Vec::new(),
            time_remaining: TOTAL_TIME,
            running: false,
            finished: false,
            result: None,
            grade_error: None,
            generation: 0,
        }
    }

    /// Start counting attempts from `generation`, so outcomes issued for a
    /// session this one replaces cannot match.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn items(&self) -> &[ExerciseItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// `None` only when the exercise has no items.
    pub fn current_item(&self) -> Option<&ExerciseItem> {
        self.items.get(self.current_index)
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer_for(&self, item_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.item_id == item_id)
    }

    /// An entry that was cleared back to nothing selected stays in
    /// [`answers`](Self::answers) but does not count as answered.
    pub fn is_answered(&self, item_id: &str) -> bool {
        self.answer_for(item_id)
            .is_some_and(|a| a.payload.has_content())
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.payload.has_content())
            .count()
    }

    pub fn unanswered_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !self.is_answered(&item.id))
            .count()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn time_level(&self) -> TimeLevel {
        time_level(self.time_remaining)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn result(&self) -> Option<&ExerciseGradeOut> {
        self.result.as_ref()
    }

    pub fn grade_error(&self) -> Option<&ApiError> {
        self.grade_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        if !self.finished {
            Phase::Ready {
                running: self.running,
            }
        } else if self.result.is_some() {
            Phase::Graded
        } else if self.grade_error.is_some() {
            Phase::GradeFailed
        } else {
            Phase::Grading
        }
    }

    /// Returns whether the timer was started.
    pub fn start(&mut self) -> bool {
        if self.finished || self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Returns whether the timer was stopped.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// One elapsed second. Finishes the session when time runs out.
    pub fn tick(&mut self) -> Option<GradeTicket> {
        if !self.running {
            return None;
        }
        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            self.running = false;
            return self.finish();
        }
        self.time_remaining -= 1;
        None
    }

    /// Record or overwrite the answer for `item_id`. Ignored once finished.
    pub fn answer(&mut self, item_id: &str, payload: AnswerPayload) -> Result<(), AnswerError> {
        if self.finished {
            return Ok(());
        }

        let item = self
            .items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AnswerError::UnknownItem(item_id.to_string()))?;

        if !payload.fits(item.kind) {
            return Err(AnswerError::KindMismatch {
                item_id: item_id.to_string(),
                kind: item.kind.to_string(),
            });
        }

        let count = item.choice_count();
        let payload = match payload {
            AnswerPayload::Index(index) => {
                check_option(item_id, index, count)?;
                AnswerPayload::Index(index)
            }
            AnswerPayload::Indices(mut indices) => {
                for &index in &indices {
                    check_option(item_id, index, count)?;
                }
                indices.sort_unstable();
                indices.dedup();
                AnswerPayload::Indices(indices)
            }
            text @ AnswerPayload::Text(_) => text,
        };

        let answer = Answer {
            item_id: item.id.clone(),
            kind: item.kind,
            payload,
        };

        match self.answers.iter_mut().find(|a| a.item_id == item_id) {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
        Ok(())
    }

    /// Move to `index`, clamped to the last item.
    pub fn go_to(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        self.current_index = index.min(self.items.len() - 1);
    }

    /// Advance one item; on the last item this finishes the session.
    pub fn next(&mut self) -> Option<GradeTicket> {
        if self.current_index + 1 < self.items.len() {
            self.current_index += 1;
            None
        } else {
            self.finish()
        }
    }

    pub fn previous(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.items.len()
    }

    /// End the attempt. Only the first call returns a ticket.
    pub fn finish(&mut self) -> Option<GradeTicket> {
        if self.finished {
            return None;
        }
        self.running = false;
        self.finished = true;
        Some(GradeTicket {
            generation: self.generation,
            answers: self.answers.clone(),
        })
    }

    /// Apply a grading outcome. Returns `Ok(false)` when the outcome belongs
    /// to an earlier attempt or was already applied, `Ok(true)` when a result
    /// was stored, and the grade error when grading failed.
    pub fn complete_grade(
        &mut self,
        generation: u64,
        outcome: Result<ExerciseGradeOut, ApiError>,
    ) -> Result<bool, QuizError> {
        if generation != self.generation || self.phase() != Phase::Grading {
            return Ok(false);
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                Ok(true)
            }
            Err(e) => {
                self.grade_error = Some(e.clone());
                Err(QuizError::Grade(e))
            }
        }
    }

    /// Back to the post-load state, keeping the loaded items.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.answers.clear();
        self.time_remaining = TOTAL_TIME;
        self.running = false;
        self.finished = false;
        self.result = None;
        self.grade_error = None;
        self.generation += 1;
    }

    /// `(current + 1) / len * 100`, or 0 for an empty exercise.
    pub fn progress_percent(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.items.len() as f64 * 100.0
    }
}

fn check_option(item_id: &str, index: u32, count: usize) -> Result<(), AnswerError> {
    if (index as usize) < count {
        Ok(())
    } else {
        Err(AnswerError::OptionOutOfRange {
            item_id: item_id.to_string(),
            index,
            count,
        })
    }
}
