//! REST gateway for the financial query agents
//!
//! Endpoints:
//!
//! - `POST /v1/query` with `{query, agent}`
//! - `POST /v1/agents/{agent}/runs` with `{query}`
//! - `GET /v1/agents`
//! - `GET /health`
//!
//! Errors are returned as `{error, error_type}`.

use agent_core::BackendFailureKind;
use agent_finance::{AgentInfo, AgentResponse, FinanceError, QueryDispatcher};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub type SharedDispatcher = Arc<QueryDispatcher>;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub agent: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentRunRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub error_type: &'static str,
}

/// Error returned by the handlers
#[derive(Debug)]
pub enum ApiError {
    Finance(FinanceError),
    /// Body missing, not JSON, missing fields, or too large
    MalformedRequest { status: StatusCode, message: String },
}

impl From<FinanceError> for ApiError {
    fn from(err: FinanceError) -> Self {
        Self::Finance(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Anything but an oversized body is reported as a plain bad request
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::MalformedRequest {
            status,
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest { status, .. } => *status,
            Self::Finance(FinanceError::InvalidSelector { .. } | FinanceError::EmptyQuery) => {
                StatusCode::BAD_REQUEST
            }
            Self::Finance(FinanceError::Backend {
                kind: BackendFailureKind::Unreachable | BackendFailureKind::Timeout,
                ..
            }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Finance(FinanceError::Backend { .. }) => StatusCode::BAD_GATEWAY,
            Self::Finance(FinanceError::Configuration(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Finance(err) => ErrorBody {
                error: agent_utils::redact(&err.to_string()),
                error_type: err.error_type(),
            },
            Self::MalformedRequest { message, .. } => ErrorBody {
                error: message,
                error_type: "validation_error",
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router with all routes and layers
pub fn router(dispatcher: SharedDispatcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/agents", get(list_agents_handler))
        .route("/v1/query", post(query_handler))
        .route("/v1/agents/{agent}/runs", post(agent_run_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn health_handler(State(dispatcher): State<SharedDispatcher>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: dispatcher.backend().to_string(),
        model: dispatcher.model().to_string(),
    })
}

async fn list_agents_handler(State(dispatcher): State<SharedDispatcher>) -> Json<Vec<AgentInfo>> {
    Json(dispatcher.agents())
}

async fn query_handler(
    State(dispatcher): State<SharedDispatcher>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let Json(request) = payload?;
    let response = dispatcher.run(&request.query, &request.agent).await?;
    Ok(Json(response))
}

async fn agent_run_handler(
    State(dispatcher): State<SharedDispatcher>,
    Path(agent): Path<String>,
    payload: Result<Json<AgentRunRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let Json(request) = payload?;
    let response = dispatcher.run(&request.query, &agent).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_finance::api::PriceSnapshot;
    use agent_finance::testing::{ScriptStep, ScriptedProvider, StaticMarketData, StaticSearch};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(steps: Vec<ScriptStep>) -> (Router, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(steps));
        let market = StaticMarketData::new().with_price(PriceSnapshot {
            symbol: "AAPL".to_string(),
            price: 272.41,
            open: 270.0,
            high: 273.1,
            low: 269.5,
            volume: 45_123_000,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 20, 0, 0).unwrap(),
        });
        let dispatcher = QueryDispatcher::builder()
            .provider(provider.clone())
            .market_data(Arc::new(market))
            .search(Arc::new(StaticSearch::default()))
            .build()
            .unwrap();
        (router(Arc::new(dispatcher)), provider)
    }

    fn price_steps() -> Vec<ScriptStep> {
        vec![
            ScriptStep::tool_call("get_current_stock_price", json!({"symbol": "AAPL"})),
            ScriptStep::answer("{tool_results}"),
        ]
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (app, _) = app(price_steps());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "scripted");
    }

    #[tokio::test]
    async fn query_returns_response_text() {
        let (app, provider) = app(price_steps());
        let request = post_json(
            "/v1/query",
            r#"{"query": "What is the current price of AAPL?", "agent": "financial"}"#,
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["agent"], "financial");
        assert!(body["response"].as_str().unwrap().contains("272.41"));
        assert_eq!(body["tool_calls"][0]["name"], "get_current_stock_price");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn per_agent_endpoint() {
        let (app, _) = app(price_steps());
        let request = post_json("/v1/agents/multi/runs", r#"{"query": "AAPL price"}"#);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["agent"], "multi");
    }

    #[tokio::test]
    async fn invalid_selector_is_bad_request() {
        let (app, provider) = app(price_steps());
        let request = post_json("/v1/query", r#"{"query": "AAPL", "agent": "crypto"}"#);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["error_type"], "validation_error");
        assert!(body["error"].as_str().unwrap().contains("crypto"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_query_and_malformed_json() {
        let (app, _) = app(price_steps());

        let response = app
            .clone()
            .oneshot(post_json("/v1/query", r#"{"query": " ", "agent": "web"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/v1/query", r#"{"query": "AAPL""#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error_type"], "validation_error");
    }

    #[tokio::test]
    async fn tool_call_rejection_is_bad_gateway() {
        let (app, _) = app(vec![ScriptStep::Reject(
            "Failed to call a function. Please adjust your prompt.".to_string(),
        )]);
        let request = post_json(
            "/v1/query",
            r#"{"query": "NVIDIA stock analysis and AI market trends", "agent": "multi"}"#,
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = read_json(response).await;
        assert_eq!(body["error_type"], "backend_error");
        assert!(body["error"].as_str().unwrap().contains("Failed to call a function"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_service_unavailable() {
        let (app, _) = app(vec![ScriptStep::Unreachable(
            "cannot connect to ollama".to_string(),
        )]);
        let request = post_json("/v1/query", r#"{"query": "AAPL", "agent": "financial"}"#);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn list_agents() {
        let (app, _) = app(price_steps());
        let request = Request::builder().uri("/v1/agents").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let body = read_json(response).await;
        let agents = body.as_array().unwrap();

        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0]["id"], "financial");
        assert_eq!(agents[1]["tools"], json!(["web_search"]));
        assert_eq!(agents[2]["tools"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let (app, _) = app(price_steps());
        let query = "a".repeat(MAX_BODY_BYTES + 1);
        let body = json!({"query": query, "agent": "web"}).to_string();

        let response = app.oneshot(post_json("/v1/query", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
