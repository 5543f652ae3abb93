use exam_core::model::{ExamId, ExamRecord};
use exam_core::time::fixed_now;

use super::test_harness::{FakeExamApi, ViewKind, graded_result, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn login_view_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login, FakeExamApi::default()).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in to your account"), "missing title in {html}");
    assert!(html.contains("Username"), "missing username field in {html}");
    assert!(html.contains("Register"), "missing register link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_greets_user_and_lists_history() {
    let api = FakeExamApi {
        history: vec![ExamRecord {
            id: ExamId::new(4),
            start_time: fixed_now(),
            end_time: Some(fixed_now()),
            is_completed: true,
            score: Some(70.0),
            total_questions: 10,
            correct_answers: 7,
        }],
        ..FakeExamApi::default()
    };
    let mut harness = setup_view_harness(ViewKind::Dashboard, api).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Welcome, ada"), "missing greeting in {html}");
    assert!(html.contains("Start Exam"), "missing start button in {html}");

    let html = harness.drive_until("7/10 correct").await;
    assert!(html.contains("70%"), "missing score in {html}");
    assert!(html.contains("View"), "missing results link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_shows_first_question_and_timer() {
    let mut harness = setup_view_harness(ViewKind::Exam, FakeExamApi::with_questions(3)).await;
    harness.rebuild();
    assert!(harness.render().contains("Loading exam..."));

    let html = harness.drive_until("Question text 1").await;
    assert!(html.contains("Question 1 of 3"), "missing position in {html}");
    assert!(html.contains("30:00") || html.contains("29:59"), "missing timer in {html}");
    assert!(html.contains("Progress: 0/3 answered"), "missing progress in {html}");
    assert!(html.contains("Bravo"), "missing option text in {html}");
    assert!(html.contains("Submit Exam"), "missing submit in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_reports_empty_question_set() {
    let mut harness = setup_view_harness(ViewKind::Exam, FakeExamApi::default()).await;
    harness.rebuild();
    let html = harness.drive_until("Back to Dashboard").await;
    assert!(
        html.contains("No exam questions available"),
        "missing empty message in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_renders_score_band() {
    let api = FakeExamApi {
        result: Some(graded_result(9, 80.0)),
        ..FakeExamApi::default()
    };
    let mut harness = setup_view_harness(ViewKind::Results(9), api).await;
    harness.rebuild();
    let html = harness.drive_until("Excellent! Great job!").await;
    assert!(html.contains("80%"), "missing percentage in {html}");
    assert!(html.contains("Score: 8 out of 10 correct"), "missing summary in {html}");
    assert!(html.contains("14 minutes"), "missing duration in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_shows_server_detail_on_failure() {
    let mut harness = setup_view_harness(ViewKind::Results(1), FakeExamApi::default()).await;
    harness.rebuild();
    let html = harness.drive_until("Exam not found").await;
    assert!(html.contains("Exam not found"), "missing error in {html}");
    assert!(harness.credentials.is_authenticated());
}
