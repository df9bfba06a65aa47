//! HTTP ingest gateway for GoalFlow.
//!
//! Endpoints:
//! - `GET  /health`          liveness
//! - `GET  /tools`           the registered tool definitions
//! - `POST /payloads`        run a payload and return its report
//! - `POST /payloads/async`  queue a payload for the background dispatcher
//!
//! Pushes may be signed with `X-Signature: sha256=<hex>`; when a shared
//! secret is configured unsigned pushes are refused.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use goalflow_agent::{Pipeline, PipelineError, ReportHandler};
use goalflow_channels::{IngestError, IngestSource, SIGNATURE_HEADER};
use goalflow_config::AppConfig;
use goalflow_core::source::PayloadSource;
use goalflow_core::tool::ToolDefinition;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<Pipeline>,
    pub ingest: Arc<IngestSource>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .route("/payloads", post(payload_handler))
        .route("/payloads/async", post(payload_async_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the pipeline once, starts the ingest queue with a background
/// dispatcher for `/payloads/async`, then serves until the listener fails.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    let ingest = Arc::new(IngestSource::new(config.gateway.shared_secret.clone()));
    if !ingest.requires_signature() {
        warn!("No gateway.shared_secret configured; pushes are not authenticated");
    }

    let queue = ingest.start().await?;
    let on_report: ReportHandler = Arc::new(|result| {
        if let Ok(report) = result {
            info!(run_id = %report.run_id, summary = %report.summary, "Queued run finished");
        }
    });
    tokio::spawn(goalflow_agent::dispatch(
        queue,
        pipeline.clone(),
        config.pipeline.max_concurrent_runs,
        on_report,
    ));

    let app = build_router(Arc::new(GatewayState { pipeline, ingest }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn tools_handler(State(state): State<SharedState>) -> Json<Vec<ToolDefinition>> {
    Json(state.pipeline.registry().definitions())
}

async fn payload_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match accept(&state, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };

    info!(kind = payload.kind(), action = payload.action(), "Payload received");
    match state.pipeline.run(payload).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => pipeline_failure(e),
    }
}

async fn payload_async_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match accept(&state, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };

    match state.ingest.inject(payload).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "status": "queued" }))).into_response(),
        Err(e) => {
            warn!("Could not queue payload: {e}");
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

fn accept(
    state: &GatewayState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<goalflow_core::Payload, Response> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    state.ingest.accept(body, signature).map_err(|e| match e {
        IngestError::InvalidSignature => error_response(StatusCode::UNAUTHORIZED, e.to_string()),
        IngestError::Payload(_) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        IngestError::Channel(_) => error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn pipeline_failure(e: PipelineError) -> Response {
    let body = json!({
        "error": e.source.to_string(),
        "stage": e.stage,
        "run_id": e.run_id,
    });
    (StatusCode::BAD_GATEWAY, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use goalflow_channels::ingest::sign;
    use goalflow_core::error::{ProviderError, ToolError};
    use goalflow_core::provider::{Prompt, TextGenerator};
    use goalflow_core::tool::{Tool, ToolRegistry};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const AIR_TRACK: &str =
        r#"{"type":"EVENT","action":"AIR_TRACK_UPDATE","userId":"u-42","data":{"trackId":"T-7"}}"#;

    struct Scripted(Mutex<VecDeque<String>>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &Prompt) -> Result<String, ProviderError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProviderError::Network("script exhausted".into()))
        }
    }

    struct NotifyStub;

    #[async_trait]
    impl Tool for NotifyStub {
        fn name(&self) -> &str {
            "notify_tool"
        }
        fn description(&self) -> &str {
            "Notify a user"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, arguments: &Value) -> Result<Value, ToolError> {
            Ok(json!({"status": "ok", "echo": arguments}))
        }
    }

    fn test_state(script: &[&str], secret: Option<&str>) -> SharedState {
        let generator = Arc::new(Scripted(Mutex::new(
            script.iter().map(|s| s.to_string()).collect(),
        )));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NotifyStub));
        let pipeline = Pipeline::new(
            generator,
            Arc::new(registry),
            vec!["Monitor tracks and notify me".into()],
        );
        Arc::new(GatewayState {
            pipeline: Arc::new(pipeline),
            ingest: Arc::new(IngestSource::new(secret.map(String::from))),
        })
    }

    fn push(uri: &str, body: &str, signature: Option<&str>) -> Request<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            req = req.header(SIGNATURE_HEADER, sig);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(&[], None));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn tools_endpoint_lists_registry() {
        let app = build_router(test_state(&[], None));
        let req = Request::builder().uri("/tools").body(Body::empty()).unwrap();

        let body = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body[0]["name"], "notify_tool");
    }

    #[tokio::test]
    async fn payload_runs_pipeline() {
        let app = build_router(test_state(
            &[
                r#"{"chosen_goals": ["Monitor tracks and notify me"]}"#,
                "MONITOR_INFORM",
                r#"{"tool_calls": [{"tool": "notify_tool", "args": {"user_id": "u-42"}}]}"#,
                "Notified u-42 about T-7.",
            ],
            None,
        ));

        let response = app.oneshot(push("/payloads", AIR_TRACK, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report = json_body(response).await;
        assert_eq!(report["goals"][0]["mode"], "MONITOR_INFORM");
        assert_eq!(report["call_results"][0]["tool"], "notify_tool");
        assert_eq!(report["summary"], "Notified u-42 about T-7.");
    }

    #[tokio::test]
    async fn invalid_payload_is_422() {
        let app = build_router(test_state(&[], None));
        let response = app
            .oneshot(push("/payloads", r#"{"type":"EVENT"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["error"].as_str().unwrap().contains("action"));
    }

    #[tokio::test]
    async fn signature_enforced_when_secret_set() {
        let state = test_state(&[r#"{"chosen_goals": []}"#], Some("s3cret"));

        let unsigned = build_router(state.clone())
            .oneshot(push("/payloads", AIR_TRACK, None))
            .await
            .unwrap();
        assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

        let sig = sign("s3cret", AIR_TRACK.as_bytes());
        let signed = build_router(state)
            .oneshot(push("/payloads", AIR_TRACK, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(signed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn pipeline_failure_is_502_with_stage() {
        let app = build_router(test_state(&["not json at all"], None));
        let response = app.oneshot(push("/payloads", AIR_TRACK, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = json_body(response).await;
        assert_eq!(body["stage"], "RECEIVED");
        assert!(body["run_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn async_push_queues_payload() {
        let state = test_state(&[], None);

        let not_started = build_router(state.clone())
            .oneshot(push("/payloads/async", AIR_TRACK, None))
            .await
            .unwrap();
        assert_eq!(not_started.status(), StatusCode::SERVICE_UNAVAILABLE);

        let mut queue = state.ingest.start().await.unwrap();
        let response = build_router(state)
            .oneshot(push("/payloads/async", AIR_TRACK, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(queue.recv().await.unwrap().user_id(), "u-42");
    }
}
