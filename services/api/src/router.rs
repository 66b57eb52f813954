//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and the OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, SessionView, TurnRequest, TurnResponse, TurnView},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::post_turn,
        handlers::get_session,
        handlers::delete_session,
    ),
    components(
        schemas(TurnRequest, TurnResponse, SessionView, TurnView, ErrorResponse)
    ),
    tags(
        (name = "Study Router API", description = "Intent-routed study sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/sessions/{id}/turns", post(handlers::post_turn))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ClassifierKind, Config, Provider},
        services::build_with,
    };
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::{path::PathBuf, time::Duration};
    use study_router_core::{
        error::LlmError,
        llm_client::{ChatMessage, LLMAction, LLMClient, ToolSpec},
        prompts::PromptSet,
    };
    use tower::ServiceExt;
    use tracing::Level;

    struct CannedLlm;

    #[async_trait]
    impl LLMClient for CannedLlm {
        async fn generate(&self, _: &str, _: &[ChatMessage]) -> Result<String, LlmError> {
            Ok("Think of it like stacking boxes.".to_string())
        }

        async fn decide_action(
            &self,
            _: &str,
            _: &[ChatMessage],
            _: &[ToolSpec],
        ) -> Result<LLMAction, LlmError> {
            Ok(LLMAction::TextResponse("1. Definition\n2. Diagram".to_string()))
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            provider: Provider::Gemini,
            api_key: "test-key".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            firecrawl_api_key: None,
            classifier: ClassifierKind::Keyword,
            context_turns: 10,
            max_tool_calls: 3,
            responder_timeout: Duration::from_secs(5),
            log_level: Level::INFO,
            prompts_path: PathBuf::from("./prompts"),
        }
    }

    fn app() -> Router {
        let config = test_config();
        let orchestrator = build_with(&config, PromptSet::default(), Arc::new(CannedLlm), None);
        create_router(Arc::new(AppState {
            orchestrator: Arc::new(orchestrator),
        }))
    }

    fn post_turn(id: &str, query: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/sessions/{}/turns", id))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_turn_routes_to_simple_responder() {
        let response = app()
            .oneshot(post_turn("s1", "explain like I'm 5: recursion"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["selected_responder"], "simple-explain");
        assert_eq!(body["payload"], "Think of it like stacking boxes.");
    }

    #[tokio::test]
    async fn test_post_turn_blank_query_is_bad_request() {
        let response = app().oneshot(post_turn("s1", "   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("must not be empty"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_turn("s2", "16 marks answer on paging"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["selected_responder"], "exam-detailed");

        let get = Request::builder()
            .uri("/sessions/s2")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view = body_json(response).await;
        assert_eq!(view["current_intent"], "exam");
        assert_eq!(view["turns"].as_array().unwrap().len(), 2);

        let delete = Request::builder()
            .method("DELETE")
            .uri("/sessions/s2")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let get = Request::builder()
            .uri("/sessions/s2")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_session_is_not_found() {
        let delete = Request::builder()
            .method("DELETE")
            .uri("/sessions/nope")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/sessions/{id}/turns"));
        assert!(doc.paths.paths.contains_key("/sessions/{id}"));
    }
}
