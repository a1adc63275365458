use chrono::{DateTime, Local};

use ficous_quiz::controller::{LoadState, QuizController};
use ficous_quiz::model::{AnswerPayload, ExerciseItem, ItemKind};
use ficous_quiz::session::QuizSession;
use ficous_quiz::timer::{Ticker, WARNING_SECS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Loading,
    LoadFailed,
    Working,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmFinish,
    ConfirmReset,
    ConfirmQuit,
    TimeWarning,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Navigation,
    ChoiceSelect,
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickerChange {
    Started,
    Stopped,
}

/// Keep `ticker` alive exactly while the session runs. `start` is only
/// called when a new ticker is needed.
pub fn sync_ticker<F>(running: bool, ticker: &mut Option<Ticker>, start: F) -> Option<TickerChange>
where
    F: FnOnce() -> Ticker,
{
    match (running, ticker.is_some()) {
        (true, false) => {
            *ticker = Some(start());
            Some(TickerChange::Started)
        }
        (false, true) => {
            *ticker = None;
            Some(TickerChange::Stopped)
        }
        _ => None,
    }
}

pub struct AppState {
    pub controller: QuizController,
    pub input_mode: InputMode,
    pub dialog_stack: Vec<Dialog>,
    pub choice_cursor: usize,
    pub text_input: String,
    /// Cursor position in chars, not bytes.
    pub text_cursor: usize,
    pub question_scroll: u16,
    pub results_scroll: u16,
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(controller: QuizController) -> Self {
        Self {
            controller,
            input_mode: InputMode::Navigation,
            dialog_stack: Vec::new(),
            choice_cursor: 0,
            text_input: String::new(),
            text_cursor: 0,
            question_scroll: 0,
            results_scroll: 0,
            started_at: None,
            finished_at: None,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.controller.load_state() {
            LoadState::Loading => Screen::Loading,
            LoadState::Failed => Screen::LoadFailed,
            LoadState::Ready => {
                if self.session().is_some_and(QuizSession::is_finished) {
                    Screen::Results
                } else {
                    Screen::Working
                }
            }
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.controller.session()
    }

    pub fn current_item(&self) -> Option<&ExerciseItem> {
        self.session().and_then(QuizSession::current_item)
    }

    pub fn is_running(&self) -> bool {
        self.session().is_some_and(QuizSession::is_running)
    }

    /// Re-derive per-question view state after the cursor moved.
    pub fn sync_current_item(&mut self) {
        self.choice_cursor = 0;
        self.question_scroll = 0;
        self.load_text_input_for_current();

        self.input_mode = match self.current_item().map(|item| item.kind) {
            Some(ItemKind::Open) => InputMode::TextInput,
            Some(_) => InputMode::ChoiceSelect,
            None => InputMode::Navigation,
        };
    }

    fn load_text_input_for_current(&mut self) {
        let text = self.current_item().and_then(|item| {
            self.session()
                .and_then(|s| s.answer_for(&item.id))
                .and_then(|answer| match &answer.payload {
                    AnswerPayload::Text(text) => Some(text.clone()),
                    _ => None,
                })
        });
        self.text_input = text.unwrap_or_default();
        self.text_cursor = self.text_input.chars().count();
    }

    pub fn navigate_to(&mut self, idx: usize) {
        self.controller.go_to(idx);
        self.sync_current_item();
    }

    pub fn navigate_prev(&mut self) {
        self.controller.previous();
        self.sync_current_item();
    }

    /// Moves to the next question. Returns false on the last question, where
    /// moving on means finishing.
    pub fn navigate_next(&mut self) -> bool {
        if self.session().map_or(true, QuizSession::is_last) {
            return false;
        }
        self.controller.next();
        self.sync_current_item();
        true
    }

    /// Next question, or the finish confirmation on the last one.
    pub fn advance(&mut self) {
        if !self.navigate_next() {
            self.request_finish();
        }
    }

    /// An explicit finish always asks first.
    pub fn request_finish(&mut self) {
        if self.top_dialog() != Some(&Dialog::ConfirmFinish) {
            self.push_dialog(Dialog::ConfirmFinish);
        }
    }

    pub fn toggle_running(&mut self) {
        if self.is_running() {
            self.controller.pause();
        } else if self.controller.start() && self.started_at.is_none() {
            self.started_at = Some(Local::now());
        }
    }

    pub fn finish(&mut self) {
        if self.controller.finish() {
            self.mark_finished();
        }
    }

    fn mark_finished(&mut self) {
        self.finished_at = Some(Local::now());
        self.dialog_stack.clear();
        self.input_mode = InputMode::Navigation;
        self.results_scroll = 0;
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.started_at = None;
        self.finished_at = None;
        self.status_message = None;
        self.dialog_stack.clear();
        self.sync_current_item();
    }

    /// Apply one elapsed second from the ticker.
    pub fn on_tick(&mut self) {
        let before = self.session().map_or(0, QuizSession::time_remaining);
        if self.controller.tick() {
            self.mark_finished();
            return;
        }
        let after = self.session().map_or(0, QuizSession::time_remaining);
        if before >= WARNING_SECS && after < WARNING_SECS && !self.has_dialog() {
            self.push_dialog(Dialog::TimeWarning);
        }
    }

    pub fn select_choice(&mut self, idx: usize) {
        let Some(item) = self.current_item().cloned() else {
            return;
        };
        if idx >= item.choice_count() {
            return;
        }
        self.choice_cursor = idx;

        let payload = match item.kind {
            ItemKind::Mcq | ItemKind::Vf => AnswerPayload::Index(idx as u32),
            ItemKind::Multi => {
                let mut selected = self.selected_indices(&item.id);
                let idx = idx as u32;
                if selected.contains(&idx) {
                    selected.retain(|&i| i != idx);
                } else {
                    selected.push(idx);
                }
                AnswerPayload::Indices(selected)
            }
            ItemKind::Open => return,
        };
        self.record(&item.id, payload);
    }

    fn selected_indices(&self, item_id: &str) -> Vec<u32> {
        match self.session().and_then(|s| s.answer_for(item_id)) {
            Some(answer) => match &answer.payload {
                AnswerPayload::Index(i) => vec![*i],
                AnswerPayload::Indices(indices) => indices.clone(),
                AnswerPayload::Text(_) => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    pub fn is_choice_selected(&self, item_id: &str, idx: usize) -> bool {
        self.selected_indices(item_id).contains(&(idx as u32))
    }

    fn record(&mut self, item_id: &str, payload: AnswerPayload) {
        match self.controller.answer(item_id, payload) {
            Ok(()) => self.status_message = None,
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Upsert the open answer for the current item from the text buffer.
    pub fn commit_text(&mut self) {
        let Some(item) = self.current_item() else {
            return;
        };
        if item.kind != ItemKind::Open {
            return;
        }
        let id = item.id.clone();
        self.record(&id, AnswerPayload::Text(self.text_input.clone()));
    }

    pub fn replace_text(&mut self, text: String) {
        self.text_input = text;
        self.text_cursor = self.text_input.chars().count();
        self.commit_text();
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text_input
            .char_indices()
            .nth(char_idx)
            .map_or(self.text_input.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.text_cursor);
        self.text_input.insert(at, c);
        self.text_cursor += 1;
        self.commit_text();
    }

    pub fn backspace(&mut self) {
        if self.text_cursor == 0 {
            return;
        }
        self.text_cursor -= 1;
        let at = self.byte_offset(self.text_cursor);
        self.text_input.remove(at);
        self.commit_text();
    }

    pub fn delete_char(&mut self) {
        if self.text_cursor >= self.text_input.chars().count() {
            return;
        }
        let at = self.byte_offset(self.text_cursor);
        self.text_input.remove(at);
        self.commit_text();
    }

    pub fn cursor_left(&mut self) {
        self.text_cursor = self.text_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.text_cursor < self.text_input.chars().count() {
            self.text_cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.text_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.text_cursor = self.text_input.chars().count();
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    use async_trait::async_trait;
    use ficous_quiz::api::ExerciseApi;
    use ficous_quiz::error::ApiError;
    use ficous_quiz::model::{
        ExerciseDetail, ExerciseFilters, ExerciseGradeIn, ExerciseGradeOut, ExerciseSummary,
    };
    use ficous_quiz::session::TOTAL_TIME;
    use ficous_quiz::timer::TimerEvent;
    use tokio::runtime::Handle;

    struct OfflineGrader {
        detail: ExerciseDetail,
    }

    #[async_trait]
    impl ExerciseApi for OfflineGrader {
        async fn get_exercise_detail(&self, _exercise_id: &str) -> Result<ExerciseDetail, ApiError> {
            Ok(self.detail.clone())
        }

        async fn grade_exercise(
            &self,
            _exercise_id: &str,
            _body: &ExerciseGradeIn,
        ) -> Result<ExerciseGradeOut, ApiError> {
            Err(ApiError::Network("offline".into()))
        }

        async fn list_exercises(
            &self,
            _filters: &ExerciseFilters,
        ) -> Result<Vec<ExerciseSummary>, ApiError> {
            Ok(Vec::new())
        }
    }

    async fn loaded_state() -> AppState {
        let detail: ExerciseDetail =
            serde_json::from_str(include_str!("../fixtures/exercise_detail.json")).unwrap();
        let api = Arc::new(OfflineGrader { detail });
        let mut controller = QuizController::new(api, "ex-9f2c", Handle::current());
        controller.load().await.unwrap();
        let mut state = AppState::new(controller);
        state.sync_current_item();
        state
    }

    fn idle_ticker(tx: &mpsc::Sender<TimerEvent>) -> Ticker {
        Ticker::spawn(tx.clone(), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn moving_past_last_question_asks_first() {
        let mut state = loaded_state().await;
        state.advance();
        assert_eq!(state.session().unwrap().current_index(), 1);
        assert!(!state.has_dialog());

        state.navigate_to(3);
        state.advance();
        assert_eq!(state.top_dialog(), Some(&Dialog::ConfirmFinish));
        assert_eq!(state.screen(), Screen::Working);
        assert!(!state.session().unwrap().is_finished());

        // Ctrl+S while the prompt is already open.
        state.request_finish();
        assert_eq!(state.dialog_stack.len(), 1);

        state.pop_dialog();
        state.finish();
        assert_eq!(state.screen(), Screen::Results);
        assert!(state.finished_at.is_some());
    }

    #[tokio::test]
    async fn explicit_finish_from_any_question_asks_first() {
        let mut state = loaded_state().await;
        state.request_finish();
        assert_eq!(state.top_dialog(), Some(&Dialog::ConfirmFinish));
        assert!(!state.session().unwrap().is_finished());
        assert_eq!(state.controller.grade_calls(), 0);
    }

    #[tokio::test]
    async fn expiry_finishes_without_asking() {
        let mut state = loaded_state().await;
        state.toggle_running();
        assert!(state.started_at.is_some());
        state.push_dialog(Dialog::Help);

        for _ in 0..TOTAL_TIME {
            state.on_tick();
        }
        assert_eq!(state.screen(), Screen::Results);
        assert!(!state.has_dialog());
        assert_eq!(state.input_mode, InputMode::Navigation);
        assert!(state.finished_at.is_some());
        assert_eq!(state.controller.grade_calls(), 1);
    }

    #[tokio::test]
    async fn warning_on_crossing_five_minutes() {
        let mut state = loaded_state().await;
        state.toggle_running();

        for _ in 0..(TOTAL_TIME - WARNING_SECS) {
            state.on_tick();
        }
        assert_eq!(state.session().unwrap().time_remaining(), WARNING_SECS);
        assert!(!state.has_dialog());

        state.on_tick();
        assert_eq!(state.top_dialog(), Some(&Dialog::TimeWarning));

        state.pop_dialog();
        for _ in 0..10 {
            state.on_tick();
        }
        assert!(!state.has_dialog());
    }

    #[tokio::test]
    async fn multi_choice_toggles() {
        let mut state = loaded_state().await;
        state.navigate_to(2);
        assert_eq!(state.input_mode, InputMode::ChoiceSelect);

        state.select_choice(2);
        state.select_choice(0);
        assert!(state.is_choice_selected("c", 0));
        assert!(state.is_choice_selected("c", 2));
        assert_eq!(
            state.session().unwrap().answer_for("c").unwrap().payload,
            AnswerPayload::Indices(vec![0, 2])
        );

        state.select_choice(2);
        assert!(!state.is_choice_selected("c", 2));
        state.select_choice(9);
        assert_eq!(state.choice_cursor, 2);

        state.select_choice(0);
        let session = state.session().unwrap();
        assert_eq!(
            session.answer_for("c").unwrap().payload,
            AnswerPayload::Indices(Vec::new())
        );
        assert!(!session.is_answered("c"));
    }

    #[tokio::test]
    async fn text_editing_is_char_aware() {
        let mut state = loaded_state().await;
        state.navigate_to(3);
        assert_eq!(state.input_mode, InputMode::TextInput);

        for c in "ção".chars() {
            state.insert_char(c);
        }
        assert_eq!(state.text_input, "ção");
        assert_eq!(state.text_cursor, 3);

        state.cursor_left();
        state.backspace();
        assert_eq!(state.text_input, "ço");
        assert_eq!(state.text_cursor, 1);

        state.delete_char();
        state.delete_char();
        assert_eq!(state.text_input, "ç");
        assert_eq!(
            state.session().unwrap().answer_for("d").unwrap().payload,
            AnswerPayload::Text("ç".into())
        );

        state.navigate_to(0);
        assert!(state.text_input.is_empty());
        state.navigate_to(3);
        assert_eq!(state.text_input, "ç");
        assert_eq!(state.text_cursor, 1);
    }

    #[test]
    fn ticker_follows_running_flag() {
        let (tx, _rx) = mpsc::channel();
        let mut ticker = None;

        assert_eq!(sync_ticker(false, &mut ticker, || idle_ticker(&tx)), None);
        assert_eq!(
            sync_ticker(true, &mut ticker, || idle_ticker(&tx)),
            Some(TickerChange::Started)
        );
        assert!(ticker.is_some());
        assert_eq!(
            sync_ticker(true, &mut ticker, || unreachable!("already running")),
            None
        );
        assert_eq!(
            sync_ticker(false, &mut ticker, || idle_ticker(&tx)),
            Some(TickerChange::Stopped)
        );
        assert!(ticker.is_none());
    }

    #[tokio::test]
    async fn pausing_drops_the_ticker() {
        let mut state = loaded_state().await;
        let (tx, _rx) = mpsc::channel();
        let mut ticker = None;

        state.toggle_running();
        sync_ticker(state.is_running(), &mut ticker, || idle_ticker(&tx));
        assert!(ticker.is_some());

        state.toggle_running();
        assert_eq!(
            sync_ticker(state.is_running(), &mut ticker, || idle_ticker(&tx)),
            Some(TickerChange::Stopped)
        );
        assert!(ticker.is_none());
    }
}
