use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use exam_core::model::{AnswerSubmission, ExamId, ExamRecord, ExamResult, Question, User};

use crate::auth_service::{LoginForm, RegisterForm};
use crate::config::ApiConfig;
use crate::credentials::CredentialContext;
use crate::error::ApiError;
use crate::ports::{ExamArchive, ExamGrader, QuestionSource};

/// Token payload returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
struct SubmissionBody<'a> {
    answers: &'a [AnswerSubmission],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

impl ErrorBody {
    /// FastAPI sends a string for handled errors and a list for validation
    /// failures; only the string form is meant for people.
    fn into_message(self) -> Option<String> {
        match self.detail {
            serde_json::Value::String(message) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// HTTP transport for the exam server.
///
/// Attaches the active bearer token to every request and tears the
/// credential down when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialContext>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialContext>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials,
        })
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialContext> {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message);

        if status == StatusCode::UNAUTHORIZED {
            warn!("server rejected credential; clearing it");
            if let Err(err) = self.credentials.clear().await {
                warn!(%err, "failed to clear stored credential");
            }
            return Err(ApiError::Unauthorized { detail });
        }

        debug!(status = status.as_u16(), ?detail, "request rejected");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    /// Exchange username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or rejected credentials.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        let request = self.client.post(self.url("/auth/login")).form(&[
            ("username", form.username.as_str()),
            ("password", form.password.as_str()),
        ]);
        self.send(request).await
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or a rejected registration.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<User, ApiError> {
        let request = self.client.post(self.url("/auth/register")).json(form);
        self.send(request).await
    }

    /// Open a new exam on the server and fetch its questions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or if the server refuses to
    /// start an exam.
    #[instrument(skip(self))]
    pub async fn start_exam(&self) -> Result<Vec<Question>, ApiError> {
        self.send(self.client.get(self.url("/exams/start"))).await
    }

    /// Submit answers for the open exam.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or a rejected submission.
    #[instrument(skip(self, answers), fields(answers = answers.len()))]
    pub async fn submit_exam(&self, answers: &[AnswerSubmission]) -> Result<ExamResult, ApiError> {
        let request = self
            .client
            .post(self.url("/exams/submit"))
            .json(&SubmissionBody { answers });
        self.send(request).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or unknown exams.
    #[instrument(skip(self))]
    pub async fn exam_result(&self, exam_id: ExamId) -> Result<ExamResult, ApiError> {
        let path = format!("/exams/results/{exam_id}");
        self.send(self.client.get(self.url(&path))).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` for transport failures.
    #[instrument(skip(self))]
    pub async fn exam_history(&self) -> Result<Vec<ExamRecord>, ApiError> {
        self.send(self.client.get(self.url("/exams/history"))).await
    }
}

#[async_trait]
impl QuestionSource for ApiClient {
    async fn load_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.start_exam().await
    }
}

#[async_trait]
impl ExamGrader for ApiClient {
    async fn grade(&self, answers: &[AnswerSubmission]) -> Result<ExamResult, ApiError> {
        self.submit_exam(answers).await
    }
}

#[async_trait]
impl ExamArchive for ApiClient {
    async fn fetch_result(&self, exam_id: ExamId) -> Result<ExamResult, ApiError> {
        self.exam_result(exam_id).await
    }

    async fn history(&self) -> Result<Vec<ExamRecord>, ApiError> {
        self.exam_history().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{OptionLabel, QuestionId};
    use storage::repository::{CredentialStore, InMemoryRepository};
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::credentials::AuthToken;

    async fn client_for(server: &MockServer) -> (ApiClient, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let credentials = Arc::new(CredentialContext::new(Arc::new(repo.clone())));
        let client = ApiClient::new(&ApiConfig::new(server.uri()), credentials).unwrap();
        (client, repo)
    }

    fn question_json(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "question_text": format!("Question {id}"),
            "option_a": "a",
            "option_b": "b",
            "option_c": "c",
            "option_d": "d",
            "created_at": "2023-11-14T22:13:20"
        })
    }

    #[tokio::test]
    async fn login_posts_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_string_contains("username=ada"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-123",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let form = LoginForm::new("ada", "hunter2");
        let token = client.login(&form).await.unwrap();
        assert_eq!(token.access_token, "tok-123");
        assert_eq!(token.token_type, "bearer");
    }

    #[tokio::test]
    async fn start_exam_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exams/start"))
            .and(header("Authorization", "Bearer tok-abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([question_json(1), question_json(2)])),
            )
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        client
            .credentials()
            .establish(AuthToken::new("tok-abc"), None)
            .await
            .unwrap();

        let questions = client.load_questions().await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].id(), QuestionId::new(2));
    }

    #[tokio::test]
    async fn submit_sends_answers_payload() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({
            "answers": [
                {"question_id": 1, "selected_answer": "B"},
                {"question_id": 2, "selected_answer": ""}
            ]
        });
        Mock::given(method("POST"))
            .and(path("/exams/submit"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exam_id": 4,
                "score": 50.0,
                "total_questions": 2,
                "correct_answers": 1,
                "percentage": 50.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let answers = vec![
            AnswerSubmission::new(QuestionId::new(1), Some(OptionLabel::B)),
            AnswerSubmission::new(QuestionId::new(2), None),
        ];
        let result = client.grade(&answers).await.unwrap();
        assert_eq!(result.exam_id, ExamId::new(4));
        assert_eq!(result.correct_answers, 1);
    }

    #[tokio::test]
    async fn unauthorized_response_clears_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exams/history"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Could not validate credentials"
            })))
            .mount(&server)
            .await;

        let (client, repo) = client_for(&server).await;
        client
            .credentials()
            .establish(AuthToken::new("expired"), Some("ada".into()))
            .await
            .unwrap();

        let err = client.history().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Could not validate credentials"));
        assert!(!client.credentials().is_authenticated());
        assert!(repo.load_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejection_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exams/start"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "You already have an active exam"
            })))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let err = client.start_exam().await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(
            err.user_message("Failed to start exam. Please try again."),
            "You already have an active exam"
        );
    }

    #[tokio::test]
    async fn non_json_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exams/submit"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let err = client.submit_exam(&[]).await.unwrap_err();
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message("Failed to submit exam"), "Failed to submit exam");
    }

    #[tokio::test]
    async fn results_and_history_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exams/results/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exam_id": 9,
                "score": 80.0,
                "total_questions": 10,
                "correct_answers": 8,
                "percentage": 80.0,
                "start_time": "2023-11-14T22:13:20Z",
                "end_time": "2023-11-14T22:33:20Z"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exams/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 9,
                "user_id": 1,
                "start_time": "2023-11-14T22:13:20.481516",
                "end_time": "2023-11-14T22:33:20.481516",
                "is_completed": true,
                "score": 80.0,
                "total_questions": 10,
                "correct_answers": 8
            }])))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let result = client.fetch_result(ExamId::new(9)).await.unwrap();
        assert_eq!(result.incorrect_answers(), 2);
        assert!(result.end_time.is_some());

        let history = client.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_completed);
        let took = history[0].end_time.unwrap() - history[0].start_time;
        assert_eq!(took.num_minutes(), 20);
    }
}
