//! Drives a [`QuizSession`] against an [`ExerciseApi`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::ExerciseApi;
use crate::error::{AnswerError, ApiError, QuizError};
use crate::model::{AnswerPayload, ExerciseGradeOut, ExerciseSummary};
use crate::session::{GradeTicket, QuizSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed,
    Ready,
}

/// Result of one grading call, tagged with the attempt it was issued for.
#[derive(Debug)]
pub struct GradeOutcome {
    pub generation: u64,
    pub result: Result<ExerciseGradeOut, ApiError>,
}

pub struct QuizController {
    api: Arc<dyn ExerciseApi>,
    exercise_id: String,
    runtime: Handle,
    exercise: Option<ExerciseSummary>,
    session: Option<QuizSession>,
    load_error: Option<QuizError>,
    outcome_tx: mpsc::UnboundedSender<GradeOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<GradeOutcome>,
    grade_calls: usize,
}

impl QuizController {
    pub fn new(api: Arc<dyn ExerciseApi>, exercise_id: impl Into<String>, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            api,
            exercise_id: exercise_id.into(),
            runtime,
            exercise: None,
            session: None,
            load_error: None,
            outcome_tx,
            outcome_rx,
            grade_calls: 0,
        }
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn exercise(&self) -> Option<&ExerciseSummary> {
        self.exercise.as_ref()
    }

    pub fn title(&self) -> &str {
        self.exercise
            .as_ref()
            .map(ExerciseSummary::display_title)
            .unwrap_or("Quiz")
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn load_error(&self) -> Option<&QuizError> {
        self.load_error.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        if self.session.is_some() {
            LoadState::Ready
        } else if self.load_error.is_some() {
            LoadState::Failed
        } else {
            LoadState::Loading
        }
    }

    /// Number of grading calls issued over the controller's lifetime.
    pub fn grade_calls(&self) -> usize {
        self.grade_calls
    }

    /// Clear a previous load failure so the state reads `Loading` until
    /// [`load`](Self::load) completes.
    pub fn begin_load(&mut self) {
        self.load_error = None;
    }

    /// Fetch the exercise and start a new session. Calling it again after a
    /// failure retries.
    pub async fn load(&mut self) -> Result<(), QuizError> {
        self.begin_load();
        info!(exercise_id = %self.exercise_id, "loading exercise");

        match self.api.get_exercise_detail(&self.exercise_id).await {
            Ok(detail) => {
                info!(items = detail.items.len(), "exercise loaded");
                let generation = self.session.as_ref().map_or(0, |s| s.generation() + 1);
                self.session = Some(QuizSession::new(detail.items).with_generation(generation));
                self.exercise = Some(detail.summary);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "exercise load failed");
                let err = QuizError::Load(e);
                self.load_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn start(&mut self) -> bool {
        self.session.as_mut().is_some_and(QuizSession::start)
    }

    pub fn pause(&mut self) -> bool {
        self.session.as_mut().is_some_and(QuizSession::pause)
    }

    /// Returns whether this tick ended the session.
    pub fn tick(&mut self) -> bool {
        let ticket = self.session.as_mut().and_then(QuizSession::tick);
        if ticket.is_some() {
            info!("time expired");
        }
        self.dispatch(ticket)
    }

    pub fn answer(&mut self, item_id: &str, payload: AnswerPayload) -> Result<(), AnswerError> {
        match self.session.as_mut() {
            Some(session) => session.answer(item_id, payload),
            None => Err(AnswerError::UnknownItem(item_id.to_string())),
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            session.go_to(index);
        }
    }

    /// Returns whether moving past the last item ended the session.
    pub fn next(&mut self) -> bool {
        let ticket = self.session.as_mut().and_then(QuizSession::next);
        self.dispatch(ticket)
    }

    pub fn previous(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.previous();
        }
    }

    /// Returns whether a grading call was issued.
    pub fn finish(&mut self) -> bool {
        let ticket = self.session.as_mut().and_then(QuizSession::finish);
        self.dispatch(ticket)
    }

    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
            info!(generation = session.generation(), "session reset");
        }
    }

    fn dispatch(&mut self, ticket: Option<GradeTicket>) -> bool {
        let Some(ticket) = ticket else {
            return false;
        };

        self.grade_calls += 1;
        let generation = ticket.generation;
        let body = ticket.into_request();
        info!(
            exercise_id = %self.exercise_id,
            answers = body.answers_json.len(),
            "submitting answers for grading"
        );

        let api = Arc::clone(&self.api);
        let exercise_id = self.exercise_id.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let result = api.grade_exercise(&exercise_id, &body).await;
            // Receiver gone means the controller was torn down.
            let _ = tx.send(GradeOutcome { generation, result });
        });
        true
    }

    fn apply(&mut self, outcome: GradeOutcome) -> Result<bool, QuizError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        let applied = session.complete_grade(outcome.generation, outcome.result);
        match &applied {
            Ok(true) => info!("grade received"),
            Ok(false) => warn!(generation = outcome.generation, "stale grade ignored"),
            Err(e) => warn!(error = %e, "grading failed"),
        }
        applied
    }

    /// Apply any grading outcomes that have arrived, without blocking.
    /// Returns the grade error if one was applied.
    pub fn poll_grades(&mut self) -> Option<QuizError> {
        let mut failure = None;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if let Err(e) = self.apply(outcome) {
                failure = Some(e);
            }
        }
        failure
    }

    /// Wait for the next grading outcome and apply it.
    pub async fn wait_for_grade(&mut self) -> Result<bool, QuizError> {
        match self.outcome_rx.recv().await {
            Some(outcome) => self.apply(outcome),
            None => Ok(false),
        }
    }
}
