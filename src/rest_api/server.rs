//! # REST API HTTP Server
//!
//! Axum router exposing the bucket operations under `/api/v1/:bucket`.
//!
//! Store calls are synchronous, so every handler runs its operation on the
//! blocking pool under the configured request timeout. When the timeout
//! fires the operation's cancel flag is set; an operation that has not yet
//! committed rolls back and the request fails with 504.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

use crate::document::Document;
use crate::observability::{log_event, log_event_at, Event, Severity};
use crate::query::CancelFlag;
use crate::store::{Store, StoreErrorCode, StoreResult};

use super::config::HttpConfig;
use super::errors::{RestError, RestResult};
use super::parser::FilterParams;
use super::response::{DeleteResponse, HealthResponse, InsertResponse};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state
pub struct ApiState {
    store: Arc<Store>,
    operator: String,
    request_timeout: Duration,
}

type SharedState = Arc<ApiState>;

/// HTTP server for one store
pub struct ApiServer {
    config: HttpConfig,
    router: Router,
}

impl ApiServer {
    pub fn new(store: Arc<Store>, config: HttpConfig) -> Self {
        let router = Self::build_router(store, &config);
        Self { config, router }
    }

    fn build_router(store: Arc<Store>, config: &HttpConfig) -> Router {
        let state = Arc::new(ApiState {
            store,
            operator: config.equality_operator.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        });

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/api/v1/:bucket",
                get(find_handler)
                    .post(insert_handler)
                    .patch(update_handler)
                    .delete(delete_handler),
            )
            .with_state(state)
            .layer(middleware::from_fn(log_requests))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> std::io::Result<()> {
        let addr = self.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event(Event::ServerStarting, &[("addr", &addr)]);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        log_event(Event::ServerStopped, &[("addr", &addr)]);

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Runs a store operation on the blocking pool under the request timeout
///
/// On timeout the cancel flag is set and the task is still awaited. The
/// response reports what the operation did: a write that committed before
/// it saw the flag succeeds, and only an operation that rolled back on the
/// flag becomes a timeout.
async fn run_blocking<T, F>(state: &ApiState, op: F) -> RestResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Store, CancelFlag) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let mut task = tokio::task::spawn_blocking(move || op(&store, flag));

    let (joined, timed_out) = match tokio::time::timeout(state.request_timeout, &mut task).await
    {
        Ok(joined) => (joined, false),
        Err(_) => {
            cancel.cancel();
            (task.await, true)
        }
    };

    let result = joined.map_err(|join_error| RestError::Internal(join_error.to_string()))?;
    if !timed_out {
        return result.map_err(RestError::from);
    }

    let timeout_ms = state.request_timeout.as_millis() as u64;
    let outcome = if result.is_ok() { "completed" } else { "aborted" };
    log_event(
        Event::RequestTimedOut,
        &[("timeout_ms", &timeout_ms.to_string()), ("outcome", outcome)],
    );
    result.map_err(|err| match err.code() {
        StoreErrorCode::Canceled => RestError::Timeout(timeout_ms),
        _ => RestError::from(err),
    })
}

fn parse_params(
    state: &ApiState,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> RestResult<FilterParams> {
    let Query(pairs) = query.map_err(|e| RestError::InvalidQueryParam(e.body_text()))?;
    FilterParams::parse(&pairs, &state.operator)
}

fn parse_body(body: Result<Json<serde_json::Value>, JsonRejection>) -> RestResult<Document> {
    let Json(value) = body.map_err(|e| RestError::InvalidBody(e.body_text()))?;
    Document::from_json(value)
        .ok_or_else(|| RestError::InvalidBody("expected a JSON object".to_string()))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Insert document handler
async fn insert_handler(
    State(state): State<SharedState>,
    Path(bucket): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> RestResult<(StatusCode, Json<InsertResponse>)> {
    let document = parse_body(body)?;

    let id = run_blocking(&state, move |store, cancel| {
        store.bucket(&bucket).with_cancel(cancel).insert(document)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(InsertResponse::new(id))))
}

/// Find documents handler
async fn find_handler(
    State(state): State<SharedState>,
    Path(bucket): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> RestResult<Json<Vec<Document>>> {
    let params = parse_params(&state, query)?;

    let documents = run_blocking(&state, move |store, cancel| {
        let mut query = store
            .bucket(&bucket)
            .equal(params.filters)
            .select(params.select)
            .with_cancel(cancel);
        if let Some(limit) = params.limit {
            query = query.limit(limit);
        }
        query.find()
    })
    .await?;
    Ok(Json(documents))
}

/// Update documents handler
async fn update_handler(
    State(state): State<SharedState>,
    Path(bucket): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> RestResult<Json<Vec<Document>>> {
    let params = parse_params(&state, query)?;
    let changes = parse_body(body)?;

    let documents = run_blocking(&state, move |store, cancel| {
        let mut query = store
            .bucket(&bucket)
            .equal(params.filters)
            .select(params.select)
            .with_cancel(cancel);
        if let Some(limit) = params.limit {
            query = query.limit(limit);
        }
        query.update(changes)
    })
    .await?;
    Ok(Json(documents))
}

/// Delete documents handler
async fn delete_handler(
    State(state): State<SharedState>,
    Path(bucket): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> RestResult<Json<DeleteResponse>> {
    let params = parse_params(&state, query)?;

    let deleted = run_blocking(&state, move |store, cancel| {
        let mut query = store
            .bucket(&bucket)
            .equal(params.filters)
            .with_cancel(cancel);
        if let Some(limit) = params.limit {
            query = query.limit(limit);
        }
        query.delete()
    })
    .await?;
    Ok(Json(DeleteResponse::new(deleted)))
}

/// Logs one HTTP_REQUEST event per request and tags the response with its id
async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let severity = if response.status().is_server_error() {
        Severity::Error
    } else {
        Event::HttpRequest.severity()
    };
    let status = response.status().as_u16().to_string();
    let elapsed_ms = started.elapsed().as_millis().to_string();
    log_event_at(
        severity,
        Event::HttpRequest,
        &[
            ("request_id", &request_id),
            ("method", &method),
            ("path", &path),
            ("status", &status),
            ("duration_ms", &elapsed_ms),
        ],
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_router() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let store = Store::open_in(dir.path(), "api").unwrap();
        let server = ApiServer::new(Arc::new(store), HttpConfig::default());
        (dir, server.router())
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = HttpRequest::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, router) = create_test_router();
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let (_dir, router) = create_test_router();
        let (status, body) =
            send(&router, "POST", "/api/v1/users", Some(json!({"name": "Foo"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"id": 1}));

        let (status, body) = send(&router, "GET", "/api/v1/users?eq.id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1, "name": "Foo"}]));
    }

    #[tokio::test]
    async fn test_missing_bucket_is_404() {
        let (_dir, router) = create_test_router();
        let (status, body) = send(&router, "GET", "/api/v1/nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PALLAS_BUCKET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_filter_key_is_400() {
        let (_dir, router) = create_test_router();
        send(&router, "POST", "/api/v1/users", Some(json!({"name": "Foo"}))).await;
        let (status, body) = send(&router, "GET", "/api/v1/users?name=Foo", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PALLAS_INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_non_object_body_is_400() {
        let (_dir, router) = create_test_router();
        let (status, _) = send(&router, "POST", "/api/v1/users", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let (_dir, router) = create_test_router();
        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    fn timeout_state(dir: &TempDir) -> ApiState {
        ApiState {
            store: Arc::new(Store::open_in(dir.path(), "timeout").unwrap()),
            operator: "eq".to_string(),
            request_timeout: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_write_committed_after_timeout_is_reported() {
        let dir = TempDir::new().unwrap();
        let state = timeout_state(&dir);

        // the flag is set while the write is already past its last check
        let id = run_blocking(&state, |store, _cancel| {
            std::thread::sleep(Duration::from_millis(150));
            store.bucket("users").insert(Document::new().with("name", "Foo"))
        })
        .await
        .unwrap();
        assert_eq!(id, 1);
        assert_eq!(state.store.bucket("users").count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_write_aborted_after_timeout_is_504() {
        let dir = TempDir::new().unwrap();
        let state = timeout_state(&dir);

        let err = run_blocking(&state, |store, cancel| {
            std::thread::sleep(Duration::from_millis(150));
            store
                .bucket("users")
                .with_cancel(cancel)
                .insert(Document::new().with("name", "Foo"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code(), "PALLAS_CANCELED");
        assert!(state.store.bucket_names().unwrap().is_empty());
    }
}
