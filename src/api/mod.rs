use crate::models::{
    ContentNode, Package, PackageSummary, Question, Round, RoundQuestion,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Server,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found(ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx}: not found"),
        }
    }

    fn server(status: reqwest::StatusCode, body: &str, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Server,
            message: format!("{ctx} ({status}): {}", server_message(body)),
        }
    }
}

/// Backend error bodies are `{"error": "..."}`; anything else is surfaced
/// verbatim.
pub(crate) fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:3001".to_string();

        // Deployment injects `window.ENV.API_URL`; fall back to localhost
        // for local development.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct CreatePackageRequest {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_date: Option<String>,
}

/// Partial package header update; absent fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct UpdatePackageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_date: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateRoundRequest {
    pub name: String,
    pub description: String,
    pub question_count: i32,
    pub order_index: i32,
    pub package_id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct UpdateRoundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AddQuestionToRoundRequest {
    pub question_id: i64,
    pub order_index: i32,
}

/// One link's persisted position inside the save-order document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveOrderLink {
    pub id: i64,
    pub order_index: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveOrderRound {
    pub id: i64,
    pub round_questions: Vec<SaveOrderLink>,
}

impl SaveOrderRound {
    /// Snapshot every round's question order. The endpoint takes the whole
    /// tree on every drop, including rounds the move never touched.
    pub fn from_package(pkg: &Package) -> Vec<SaveOrderRound> {
        pkg.rounds
            .iter()
            .map(|round| SaveOrderRound {
                id: round.id,
                round_questions: round
                    .round_questions
                    .iter()
                    .map(|rq| SaveOrderLink {
                        id: rq.id,
                        order_index: rq.order_index,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveOrderRequest {
    pub rounds: Vec<SaveOrderRound>,
}

/// Partial question update; the autosave channels only ever send the field
/// they own.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct UpdateQuestionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateQuestionRequest {
    pub title: String,
    pub content: Vec<ContentNode>,
    pub answer: String,
    pub difficulty: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct QuestionPage {
    #[serde(default)]
    pub items: Vec<Question>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub limit: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SuccessResponse {
    pub success: bool,
}

pub(crate) fn questions_query(q: &str, page: i32, limit: i32) -> String {
    format!(
        "/api/questions?q={}&page={}&limit={}",
        urlencoding::encode(q.trim()),
        page,
        limit
    )
}

/// Thin JSON-over-HTTP client for the quiz content API.
///
/// Auth is a session cookie managed outside this app; every request rides
/// with browser credentials and a 401 is reported, not handled.
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
        ctx: &str,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);

        #[allow(unused_mut)]
        let mut req = client.request(method, url);

        // Browser fetch must carry the session cookie.
        #[cfg(target_arch = "wasm32")]
        {
            req = req.fetch_credentials_include();
        }

        let req = if let Some(b) = body { req.json(b) } else { req };

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();

        if status.is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if status.as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if status.as_u16() == 404 {
            Err(ApiError::not_found(ctx))
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::server(status, &body, ctx))
        }
    }

    pub async fn get_packages(&self) -> ApiResult<Vec<PackageSummary>> {
        self.request(
            reqwest::Method::GET,
            "/api/packages",
            None::<&()>,
            "Load packages",
        )
        .await
    }

    pub async fn create_package(&self, req: &CreatePackageRequest) -> ApiResult<PackageSummary> {
        self.request(
            reqwest::Method::POST,
            "/api/packages",
            Some(req),
            "Create package",
        )
        .await
    }

    pub async fn get_package(&self, id: i64) -> ApiResult<Package> {
        self.request(
            reqwest::Method::GET,
            &format!("/api/packages/{id}"),
            None::<&()>,
            "Load package",
        )
        .await
    }

    pub async fn update_package(&self, id: i64, req: &UpdatePackageRequest) -> ApiResult<Package> {
        self.request(
            reqwest::Method::PUT,
            &format!("/api/packages/{id}"),
            Some(req),
            "Save package",
        )
        .await
    }

    pub async fn delete_package(&self, id: i64) -> ApiResult<SuccessResponse> {
        self.request(
            reqwest::Method::DELETE,
            &format!("/api/packages/{id}"),
            None::<&()>,
            "Delete package",
        )
        .await
    }

    pub async fn create_round(&self, req: &CreateRoundRequest) -> ApiResult<Round> {
        self.request(reqwest::Method::POST, "/api/rounds", Some(req), "Create round")
            .await
    }

    pub async fn update_round(&self, id: i64, req: &UpdateRoundRequest) -> ApiResult<Round> {
        self.request(
            reqwest::Method::PUT,
            &format!("/api/rounds/{id}"),
            Some(req),
            "Save round",
        )
        .await
    }

    pub async fn delete_round(&self, id: i64) -> ApiResult<SuccessResponse> {
        self.request(
            reqwest::Method::DELETE,
            &format!("/api/rounds/{id}"),
            None::<&()>,
            "Delete round",
        )
        .await
    }

    pub async fn add_question_to_round(
        &self,
        round_id: i64,
        req: &AddQuestionToRoundRequest,
    ) -> ApiResult<RoundQuestion> {
        self.request(
            reqwest::Method::POST,
            &format!("/api/rounds/{round_id}/questions"),
            Some(req),
            "Add question",
        )
        .await
    }

    pub async fn remove_question_from_round(
        &self,
        round_id: i64,
        question_id: i64,
    ) -> ApiResult<SuccessResponse> {
        self.request(
            reqwest::Method::DELETE,
            &format!("/api/rounds/{round_id}/questions/{question_id}"),
            None::<&()>,
            "Remove question",
        )
        .await
    }

    pub async fn save_order(&self, rounds: Vec<SaveOrderRound>) -> ApiResult<serde_json::Value> {
        self.request(
            reqwest::Method::POST,
            "/api/round-questions/save-order",
            Some(&SaveOrderRequest { rounds }),
            "Save order",
        )
        .await
    }

    pub async fn update_question(
        &self,
        id: i64,
        req: &UpdateQuestionRequest,
    ) -> ApiResult<Question> {
        self.request(
            reqwest::Method::PUT,
            &format!("/api/questions/{id}"),
            Some(req),
            "Save question",
        )
        .await
    }

    pub async fn create_question(&self, req: &CreateQuestionRequest) -> ApiResult<Question> {
        self.request(
            reqwest::Method::POST,
            "/api/questions",
            Some(req),
            "Create question",
        )
        .await
    }

    pub async fn search_questions(&self, q: &str, page: i32, limit: i32) -> ApiResult<QuestionPage> {
        self.request(
            reqwest::Method::GET,
            &questions_query(q, page, limit),
            None::<&()>,
            "Search questions",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Round, RoundQuestion};

    #[test]
    fn test_server_message_extracts_json_error_field() {
        assert_eq!(
            server_message(r#"{"error": "Round not found"}"#),
            "Round not found"
        );
        assert_eq!(server_message("plain failure"), "plain failure");
        assert_eq!(server_message(r#"{"detail": "x"}"#), r#"{"detail": "x"}"#);
    }

    #[test]
    fn test_save_order_wire_contract_is_camel_case() {
        let req = SaveOrderRequest {
            rounds: vec![SaveOrderRound {
                id: 4,
                round_questions: vec![SaveOrderLink {
                    id: 9,
                    order_index: 1,
                }],
            }],
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["rounds"][0]["roundQuestions"][0]["orderIndex"], 1);
        assert_eq!(v["rounds"][0]["id"], 4);
    }

    #[test]
    fn test_save_order_covers_untouched_rounds() {
        // The endpoint takes the whole tree, even rounds a move never touched.
        let pkg = Package {
            id: 1,
            title: "p".to_string(),
            description: String::new(),
            play_date: None,
            author: None,
            rounds: vec![
                Round {
                    id: 1,
                    package_id: 1,
                    name: "a".to_string(),
                    description: String::new(),
                    question_count: 0,
                    order_index: 0,
                    round_questions: vec![RoundQuestion {
                        id: 11,
                        round_id: 1,
                        question_id: 5,
                        order_index: 0,
                        question: serde_json::from_str(
                            r#"{"id": 5, "title": "q", "difficulty": 1}"#,
                        )
                        .unwrap(),
                    }],
                },
                Round {
                    id: 2,
                    package_id: 1,
                    name: "b".to_string(),
                    description: String::new(),
                    question_count: 0,
                    order_index: 1,
                    round_questions: vec![],
                },
            ],
        };
        let doc = SaveOrderRound::from_package(&pkg);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc[0].round_questions[0].id, 11);
        assert!(doc[1].round_questions.is_empty());
    }

    #[test]
    fn test_update_question_request_omits_absent_fields() {
        let req = UpdateQuestionRequest {
            answer: Some("42".to_string()),
            ..Default::default()
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["answer"], "42");
        assert!(v.get("title").is_none());
        assert!(v.get("content").is_none());
    }

    #[test]
    fn test_questions_query_encodes_and_trims() {
        assert_eq!(
            questions_query("  mozart & salieri ", 2, 20),
            "/api/questions?q=mozart%20%26%20salieri&page=2&limit=20"
        );
    }

    #[test]
    fn test_question_page_tolerates_missing_fields() {
        let page: QuestionPage = serde_json::from_str(r#"{"items": []}"#).expect("should parse");
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }
}
