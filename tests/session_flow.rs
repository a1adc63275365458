use std::fs;

use ficous_quiz::error::{AnswerError, ApiError, QuizError};
use ficous_quiz::model::{AnswerPayload, ExerciseDetail, ExerciseGradeOut, ExerciseItem, ItemKind};
use ficous_quiz::session::{Phase, QuizSession, TOTAL_TIME};
use serde_json::json;

fn item(id: &str, kind: ItemKind, options: Option<&[&str]>) -> ExerciseItem {
    ExerciseItem {
        id: id.to_string(),
        kind,
        question: format!("Question {}", id),
        options: options.map(|o| o.iter().map(|s| s.to_string()).collect()),
        answer: None,
    }
}

fn mcq(id: &str) -> ExerciseItem {
    item(id, ItemKind::Mcq, Some(&["w", "x", "y", "z"]))
}

fn fixture_session() -> QuizSession {
    let content = fs::read_to_string("fixtures/exercise_detail.json").expect("Cannot read fixture");
    let detail: ExerciseDetail = serde_json::from_str(&content).unwrap();
    QuizSession::new(detail.items)
}

fn grade_result() -> ExerciseGradeOut {
    let content = fs::read_to_string("fixtures/grade_result.json").expect("Cannot read fixture");
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_new_session_is_stopped_and_full() {
    let s = fixture_session();
    assert_eq!(s.items().len(), 4);
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.time_remaining(), TOTAL_TIME);
    assert!(!s.is_running());
    assert!(!s.is_finished());
    assert_eq!(s.phase(), Phase::Ready { running: false });
    assert!(s.answers().is_empty());
}

#[test]
fn test_finish_twice_issues_one_ticket() {
    let mut s = QuizSession::new(vec![mcq("q1")]);
    s.start();
    assert!(s.finish().is_some());
    assert!(s.finish().is_none());
    // A tick after finishing cannot trigger a second finish.
    assert!(s.tick().is_none());
    assert!(s.next().is_none());
    assert_eq!(s.phase(), Phase::Grading);
}

#[test]
fn test_answer_after_finish_is_ignored() {
    let mut s = QuizSession::new(vec![mcq("q1"), mcq("q2")]);
    s.answer("q1", AnswerPayload::Index(1)).unwrap();
    s.finish();

    assert_eq!(s.answer("q2", AnswerPayload::Index(0)), Ok(()));
    assert_eq!(s.answer("q1", AnswerPayload::Index(3)), Ok(()));
    assert_eq!(s.answers().len(), 1);
    assert_eq!(s.answers()[0].payload, AnswerPayload::Index(1));
}

#[test]
fn test_timer_floor_and_single_expiry() {
    let mut s = QuizSession::new(vec![mcq("q1")]);
    s.start();

    let mut tickets = 0;
    for _ in 0..(TOTAL_TIME + 50) {
        if s.tick().is_some() {
            tickets += 1;
        }
    }
    assert_eq!(tickets, 1);
    assert_eq!(s.time_remaining(), 0);
    assert!(!s.is_running());
    assert!(s.is_finished());
}

#[test]
fn test_answer_overwrite_keeps_one_entry() {
    let mut s = QuizSession::new(vec![mcq("q1"), mcq("q2")]);
    s.answer("q1", AnswerPayload::Index(0)).unwrap();
    s.answer("q2", AnswerPayload::Index(3)).unwrap();
    s.answer("q1", AnswerPayload::Index(2)).unwrap();

    let for_q1: Vec<_> = s.answers().iter().filter(|a| a.item_id == "q1").collect();
    assert_eq!(for_q1.len(), 1);
    assert_eq!(for_q1[0].payload, AnswerPayload::Index(2));
    // First-answered order is kept.
    assert_eq!(s.answers()[0].item_id, "q1");
    assert_eq!(s.answered_count(), 2);
}

#[test]
fn test_next_on_last_item_finishes() {
    let mut s = QuizSession::new(vec![mcq("q1"), mcq("q2"), mcq("q3")]);
    s.go_to(2);
    assert!(s.is_last());

    let ticket = s.next();
    assert!(ticket.is_some());
    assert!(s.is_finished());
    assert_eq!(s.current_index(), 2);
}

#[test]
fn test_navigation_clamps() {
    let mut s = QuizSession::new(vec![mcq("q1"), mcq("q2"), mcq("q3")]);
    s.previous();
    assert_eq!(s.current_index(), 0);
    s.go_to(99);
    assert_eq!(s.current_index(), 2);
    s.previous();
    assert_eq!(s.current_index(), 1);
    assert!(s.next().is_none());
    assert_eq!(s.current_index(), 2);
}

#[test]
fn test_progress_percent() {
    let mut s = QuizSession::new(vec![mcq("q1"), mcq("q2"), mcq("q3"), mcq("q4")]);
    s.go_to(1);
    assert_eq!(s.progress_percent(), 50.0);

    let empty = QuizSession::new(Vec::new());
    assert_eq!(empty.progress_percent(), 0.0);
    assert!(empty.current_item().is_none());
}

#[test]
fn test_reset_after_grade_restores_initial_state() {
    let mut s = fixture_session();
    let items = s.items().to_vec();
    s.start();
    s.answer("a", AnswerPayload::Index(1)).unwrap();
    s.go_to(3);
    s.tick();

    let ticket = s.finish().unwrap();
    assert_eq!(s.complete_grade(ticket.generation, Ok(grade_result())), Ok(true));
    assert_eq!(s.phase(), Phase::Graded);
    assert_eq!(s.result().unwrap().score.percent, 0.625);

    s.reset();
    assert_eq!(s.current_index(), 0);
    assert!(s.answers().is_empty());
    assert_eq!(s.time_remaining(), TOTAL_TIME);
    assert!(!s.is_running());
    assert!(!s.is_finished());
    assert!(s.result().is_none());
    assert_eq!(s.items(), items.as_slice());
}

#[test]
fn test_expiry_after_full_countdown() {
    let mut s = QuizSession::new(vec![
        item("a", ItemKind::Mcq, Some(&["x", "y"])),
        item("b", ItemKind::Open, None),
    ]);
    s.start();

    let mut tickets = Vec::new();
    for _ in 0..(TOTAL_TIME - 1) {
        tickets.extend(s.tick());
    }
    assert!(tickets.is_empty());
    assert!(s.is_running());
    assert_eq!(s.time_remaining(), 1);

    tickets.extend(s.tick());
    assert!(!s.is_running());
    assert!(s.is_finished());
    assert_eq!(tickets.len(), 1);
    assert!(tickets[0].answers.is_empty());
}

#[test]
fn test_stale_grade_is_ignored() {
    let mut s = QuizSession::new(vec![mcq("q1")]);
    let old = s.finish().unwrap();
    s.reset();
    let new = s.finish().unwrap();
    assert_ne!(old.generation, new.generation);

    assert_eq!(s.complete_grade(old.generation, Ok(grade_result())), Ok(false));
    assert_eq!(s.phase(), Phase::Grading);
    assert!(s.result().is_none());

    assert_eq!(s.complete_grade(new.generation, Ok(grade_result())), Ok(true));
    // Already graded.
    assert_eq!(
        s.complete_grade(new.generation, Err(ApiError::Network("late".into()))),
        Ok(false)
    );
    assert_eq!(s.phase(), Phase::Graded);
}

#[test]
fn test_wrong_kind_is_rejected() {
    let mut s = fixture_session();
    s.answer("a", AnswerPayload::Index(0)).unwrap();

    let err = s.answer("a", AnswerPayload::Text("Energia".into())).unwrap_err();
    assert!(matches!(err, AnswerError::KindMismatch { .. }));
    let err = s.answer("d", AnswerPayload::Index(0)).unwrap_err();
    assert!(matches!(err, AnswerError::KindMismatch { .. }));
    let err = s.answer("c", AnswerPayload::Index(0)).unwrap_err();
    assert!(matches!(err, AnswerError::KindMismatch { .. }));

    assert_eq!(s.answers().len(), 1);
    assert_eq!(s.answers()[0].payload, AnswerPayload::Index(0));
}

#[test]
fn test_unknown_item_and_out_of_range() {
    let mut s = fixture_session();
    assert_eq!(
        s.answer("zz", AnswerPayload::Index(0)),
        Err(AnswerError::UnknownItem("zz".into()))
    );
    assert_eq!(
        s.answer("a", AnswerPayload::Index(4)),
        Err(AnswerError::OptionOutOfRange {
            item_id: "a".into(),
            index: 4,
            count: 4
        })
    );
    // True/false items get two implied options.
    assert!(s.answer("b", AnswerPayload::Index(1)).is_ok());
    assert!(s.answer("b", AnswerPayload::Index(2)).is_err());
    assert!(s.answer("c", AnswerPayload::Indices(vec![0, 3])).is_err());
    assert_eq!(s.answered_count(), 1);
}

#[test]
fn test_multi_indices_are_sorted_and_unique() {
    let mut s = fixture_session();
    s.answer("c", AnswerPayload::Indices(vec![2, 0, 2])).unwrap();
    assert_eq!(
        s.answer_for("c").unwrap().payload,
        AnswerPayload::Indices(vec![0, 2])
    );
}

#[test]
fn test_cleared_multi_answer_counts_as_unanswered() {
    let mut s = fixture_session();
    s.answer("c", AnswerPayload::Indices(vec![0])).unwrap();
    assert!(s.is_answered("c"));
    assert_eq!(s.unanswered_count(), 3);

    s.answer("c", AnswerPayload::Indices(Vec::new())).unwrap();
    // The entry stays, but nothing is selected.
    assert!(s.answer_for("c").is_some());
    assert!(!s.is_answered("c"));
    assert_eq!(s.answered_count(), 0);
    assert_eq!(s.unanswered_count(), 4);
}

#[test]
fn test_pause_stops_countdown() {
    let mut s = QuizSession::new(vec![mcq("q1")]);
    assert!(s.start());
    assert!(!s.start());
    s.tick();
    s.tick();
    assert!(s.pause());
    assert!(!s.pause());
    s.tick();
    assert_eq!(s.time_remaining(), TOTAL_TIME - 2);
    assert_eq!(s.phase(), Phase::Ready { running: false });

    s.finish();
    assert!(!s.start());
}

#[test]
fn test_grade_failure_keeps_session_finished() {
    let mut s = QuizSession::new(vec![mcq("q1")]);
    s.answer("q1", AnswerPayload::Index(0)).unwrap();
    let ticket = s.finish().unwrap();

    let failure = ApiError::Status {
        status: 500,
        message: "boom".into(),
    };
    let outcome = s.complete_grade(ticket.generation, Err(failure.clone()));
    assert_eq!(outcome, Err(QuizError::Grade(failure.clone())));
    assert!(s.is_finished());
    assert_eq!(s.phase(), Phase::GradeFailed);
    assert_eq!(s.grade_error(), Some(&failure));
    // No retry without a reset.
    assert!(s.finish().is_none());
}

#[test]
fn test_ticket_serializes_wire_answers() {
    let mut s = fixture_session();
    s.answer("a", AnswerPayload::Index(1)).unwrap();
    s.answer("d", AnswerPayload::Text("ΔU = Q - W".into())).unwrap();
    s.answer("c", AnswerPayload::Indices(vec![0, 2])).unwrap();

    let body = serde_json::to_value(s.finish().unwrap().into_request()).unwrap();
    assert_eq!(
        body,
        json!({
            "answers_json": [
                {"item_id": "a", "kind": "mcq", "answer_index": 1},
                {"item_id": "d", "kind": "open", "answer_text": "ΔU = Q - W"},
                {"item_id": "c", "kind": "multi", "answer_indices": [0, 2]}
            ]
        })
    );
}
