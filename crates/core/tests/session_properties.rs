use exam_core::model::{ExamId, ExamResult, OptionLabel, Question, QuestionId};
use exam_core::{ExamSession, SessionError, SessionStatus, TickOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn build_questions(n: u64) -> Vec<Question> {
    (1..=n)
        .map(|id| {
            Question::new(
                QuestionId::new(id),
                format!("Question {id}"),
                [
                    format!("{id}-a"),
                    format!("{id}-b"),
                    format!("{id}-c"),
                    format!("{id}-d"),
                ],
            )
        })
        .collect()
}

fn graded(correct: u32, total: u32) -> ExamResult {
    let percentage = f64::from(correct) / f64::from(total) * 100.0;
    ExamResult {
        exam_id: ExamId::new(1),
        score: percentage,
        total_questions: total,
        correct_answers: correct,
        percentage,
        start_time: None,
        end_time: None,
    }
}

#[test]
fn random_navigation_keeps_index_in_bounds() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for n in [1_u64, 2, 7, 10] {
        let mut session = ExamSession::start(1800, build_questions(n));
        let last = usize::try_from(n - 1).unwrap();
        for _ in 0..500 {
            if rng.random_bool(0.5) {
                session.next().unwrap();
            } else {
                session.previous().unwrap();
            }
            assert!(session.current_index() <= last);
        }
    }
}

#[test]
fn answered_count_matches_distinct_selections() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 10;
    let mut session = ExamSession::start(1800, build_questions(n));
    for _ in 0..300 {
        match rng.random_range(0..3) {
            0 => session.next().unwrap(),
            1 => session.previous().unwrap(),
            _ => {
                let label = OptionLabel::ALL[rng.random_range(0..4)];
                session.select_answer(label).unwrap();
            }
        }
        let distinct = session.ledger().iter().count();
        assert_eq!(session.answered_count(), distinct);
        assert!(session.answered_count() <= usize::try_from(n).unwrap());
    }
}

#[test]
fn double_submit_yields_one_ticket() {
    let mut session = ExamSession::start(1800, build_questions(3));
    let first = session.begin_submit();
    let second = session.begin_submit();

    assert!(matches!(first, Ok(Some(_))));
    assert_eq!(second, Err(SessionError::SubmissionInProgress));
    assert_eq!(session.submission_attempts(), 1);
    assert_eq!(session.status(), SessionStatus::Submitting);
}

#[test]
fn expiry_auto_submits_exactly_once_with_blank_answers() {
    let mut session = ExamSession::start(3, build_questions(4));
    let mut tickets = Vec::new();
    for _ in 0..10 {
        if let TickOutcome::TimeUp(ticket) = session.tick() {
            tickets.push(ticket);
        }
    }

    assert_eq!(tickets.len(), 1);
    let ticket = &tickets[0];
    assert_eq!(ticket.answers.len(), 4);
    assert!(ticket.answers.iter().all(|answer| answer.selected_answer.is_empty()));
    assert_eq!(session.status(), SessionStatus::Submitting);
    assert_eq!(session.submission_attempts(), 1);
}

#[test]
fn reselecting_overwrites() {
    let mut session = ExamSession::start(1800, build_questions(1));
    session.select_answer(OptionLabel::B).unwrap();
    session.select_answer(OptionLabel::C).unwrap();

    assert_eq!(session.current_selection(), Some(OptionLabel::C));
    assert_eq!(session.answered_count(), 1);
}

#[test]
fn ten_question_walkthrough() {
    let mut session = ExamSession::start(1800, build_questions(10));
    for i in 0..5 {
        session.select_answer(OptionLabel::A).unwrap();
        if i < 4 {
            session.next().unwrap();
        }
    }
    for _ in 0..4 {
        session.previous().unwrap();
    }
    assert_eq!(session.current_index(), 0);
    session.select_answer(OptionLabel::D).unwrap();

    let ledger = session.ledger();
    assert_eq!(ledger.get(QuestionId::new(1)), Some(OptionLabel::D));
    for id in 2..=5 {
        assert_eq!(ledger.get(QuestionId::new(id)), Some(OptionLabel::A));
    }
    for id in 6..=10 {
        assert_eq!(ledger.get(QuestionId::new(id)), None);
    }
    assert_eq!(session.answered_count(), 5);
}

#[test]
fn five_second_exam_submits_itself() {
    let mut session = ExamSession::start(5, build_questions(3));
    let mut outcome = TickOutcome::Idle;
    for _ in 0..5 {
        outcome = session.tick();
    }

    let TickOutcome::TimeUp(ticket) = outcome else {
        panic!("expected time-up on the fifth tick, got {outcome:?}");
    };
    assert_eq!(ticket.answered_count(), 0);
    assert_eq!(session.status(), SessionStatus::Submitting);
    assert_eq!(session.remaining_secs(), 0);
}

#[test]
fn failure_then_retry_completes() {
    let mut session = ExamSession::start(1800, build_questions(2));
    session.select_answer(OptionLabel::A).unwrap();

    session.begin_submit().unwrap();
    let status = session.finish_submit(Err("server error".into())).unwrap();
    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(session.snapshot().message.as_deref(), Some("server error"));

    let retry = session.begin_submit().unwrap().expect("retry ticket");
    assert_eq!(retry.answered_count(), 1);
    let status = session.finish_submit(Ok(graded(1, 2))).unwrap();
    assert_eq!(status, SessionStatus::Completed);

    let result = session.result().expect("result");
    assert_eq!(result.total_questions, 2);
    assert_eq!(result.correct_answers, 1);
    assert!((result.percentage - 50.0).abs() < f64::EPSILON);
    assert!(session.snapshot().message.is_none());
}
