use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::model::{
    AnswerSubmission, ExamId, ExamRecord, ExamResult, Question, QuestionId,
};
use exam_core::time::fixed_now;
use services::{
    ApiClient, ApiConfig, ApiError, AuthService, AuthToken, CredentialContext, ExamArchive,
    ExamConfig, ExamGrader, ExamService, QuestionSource,
};
use storage::repository::InMemoryRepository;

use crate::context::{UiApp, build_app_context};
use crate::views::{DashboardView, ExamView, LoginView, ResultsView};

/// Canned exam server for view tests.
#[derive(Clone, Default)]
pub struct FakeExamApi {
    pub questions: Vec<Question>,
    pub history: Vec<ExamRecord>,
    pub result: Option<ExamResult>,
}

impl FakeExamApi {
    pub fn with_questions(n: u64) -> Self {
        let questions = (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question text {id}"),
                    ["Alpha".into(), "Bravo".into(), "Charlie".into(), "Delta".into()],
                )
            })
            .collect();
        Self {
            questions,
            ..Self::default()
        }
    }
}

pub fn graded_result(exam_id: u64, percentage: f64) -> ExamResult {
    ExamResult {
        exam_id: ExamId::new(exam_id),
        score: percentage,
        total_questions: 10,
        correct_answers: 8,
        percentage,
        start_time: Some(fixed_now()),
        end_time: Some(fixed_now() + chrono::Duration::minutes(14)),
    }
}

fn rejected() -> ApiError {
    ApiError::Rejected {
        status: 404,
        detail: Some("Exam not found".into()),
    }
}

#[async_trait]
impl QuestionSource for FakeExamApi {
    async fn load_questions(&self) -> Result<Vec<Question>, ApiError> {
        Ok(self.questions.clone())
    }
}

#[async_trait]
impl ExamGrader for FakeExamApi {
    async fn grade(&self, _answers: &[AnswerSubmission]) -> Result<ExamResult, ApiError> {
        self.result.clone().ok_or_else(rejected)
    }
}

#[async_trait]
impl ExamArchive for FakeExamApi {
    async fn fetch_result(&self, exam_id: ExamId) -> Result<ExamResult, ApiError> {
        self.result
            .clone()
            .filter(|result| result.exam_id == exam_id)
            .ok_or_else(rejected)
    }

    async fn history(&self) -> Result<Vec<ExamRecord>, ApiError> {
        Ok(self.history.clone())
    }
}

#[derive(Clone)]
struct TestApp {
    auth: Arc<AuthService>,
    exams: Arc<ExamService>,
}

impl UiApp for TestApp {
    fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Dashboard,
    Exam,
    Results(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Exam => rsx! { ExamView {} },
        ViewKind::Results(exam_id) => rsx! { ResultsView { exam_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub credentials: Arc<CredentialContext>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until the rendered html contains `needle` or the attempts run out.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..20 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn setup_view_harness(view: ViewKind, api: FakeExamApi) -> ViewHarness {
    let repo = InMemoryRepository::new();
    let credentials = Arc::new(CredentialContext::new(Arc::new(repo)));
    credentials
        .establish(AuthToken::new("test-token"), Some("ada".into()))
        .await
        .expect("establish credential");

    // Never contacted: the views under test only go through `ExamService`.
    let client = ApiClient::new(
        &ApiConfig::new("http://127.0.0.1:9"),
        Arc::clone(&credentials),
    )
    .expect("client");
    let api = Arc::new(api);
    let exams = ExamService::new(
        api.clone(),
        api.clone(),
        api,
        ExamConfig::default(),
    );

    let app = Arc::new(TestApp {
        auth: Arc::new(AuthService::new(client)),
        exams: Arc::new(exams),
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, credentials }
}
