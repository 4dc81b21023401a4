//! voz-api: REST API server for voz
//!
//! Public endpoints let residents submit and look up tickets and read
//! renovation progress. Routes under /admin require the `x-admin-password`
//! header.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use voz_core::{Committed, Error, Project, Services, Ticket, TicketStatus, Workspace};

/// Header carrying the administrator password
const ADMIN_HEADER: &str = "x-admin-password";

/// Shared application state
struct AppState {
    services: Services,
}

/// Request to submit a ticket
#[derive(Debug, Deserialize)]
struct CreateTicketRequest {
    #[serde(default)]
    resident_name: String,
    #[serde(default)]
    resident_email: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    detail: String,
}

/// Request to answer a ticket
#[derive(Debug, Deserialize)]
struct UpdateTicketRequest {
    #[serde(default)]
    status: String,
    #[serde(default)]
    response: String,
}

/// Request to add a project
#[derive(Debug, Deserialize)]
struct CreateProjectRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    note: String,
}

/// Request to record project progress
#[derive(Debug, Deserialize)]
struct UpdateProjectRequest {
    progress: i64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    note: String,
}

/// Query parameters for the admin ticket listing
#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    open: Option<bool>,
}

/// API response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Set when the write succeeded but the resident could not be emailed
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warning: None,
        }
    }

    fn committed(committed: Committed<T>) -> Self {
        let warning = committed.notice.warning();
        Self {
            warning,
            ..Self::ok(committed.record)
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            warning: None,
        }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::AlreadyExists { .. } | Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure<T>(error: Error) -> Reply<T> {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("{}", error);
    }
    (status, Json(ApiResponse::err(error.to_string())))
}

fn reply<T>(result: voz_core::Result<T>, success: StatusCode) -> Reply<T> {
    match result {
        Ok(data) => (success, Json(ApiResponse::ok(data))),
        Err(e) => failure(e),
    }
}

fn reply_committed<T>(result: voz_core::Result<Committed<T>>, success: StatusCode) -> Reply<T> {
    match result {
        Ok(committed) => (success, Json(ApiResponse::committed(committed))),
        Err(e) => failure(e),
    }
}

/// Run a store call off the async runtime; stores do file and SMTP I/O
async fn blocking<T, F>(work: F) -> voz_core::Result<T>
where
    F: FnOnce() -> voz_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Store(format!("worker task failed: {}", e)))?
}

fn authorize(state: &AppState, headers: &HeaderMap) -> voz_core::Result<()> {
    let attempt = headers
        .get(ADMIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    state.services.admin.check(attempt)
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Submit a ticket
async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTicketRequest>,
) -> impl IntoResponse {
    let tickets = state.services.tickets.clone();
    let subject = req.subject.unwrap_or_else(|| "Maintenance".to_string());
    let result = blocking(move || {
        tickets.create(&req.resident_name, &req.resident_email, &subject, &req.detail)
    })
    .await;
    reply_committed(result, StatusCode::CREATED)
}

/// Look up a ticket by ID
async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tickets = state.services.tickets.clone();
    reply(blocking(move || tickets.find_by_id(&id)).await, StatusCode::OK)
}

/// Renovation progress
async fn list_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let projects = state.services.projects.clone();
    reply(blocking(move || projects.list_all()).await, StatusCode::OK)
}

/// List tickets for administration
async fn admin_list_tickets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if let Err(e) = authorize(&state, &headers) {
        return failure::<Vec<Ticket>>(e);
    }

    let status = match query.status.as_deref().map(str::parse::<TicketStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => return failure::<Vec<Ticket>>(e),
        None => None,
    };

    let tickets = state.services.tickets.clone();
    let result = blocking(move || tickets.list_all()).await.map(|mut tickets: Vec<Ticket>| {
        if let Some(status) = status {
            tickets.retain(|t| t.status == status);
        }
        if query.open.unwrap_or(false) {
            tickets.retain(|t| t.status.is_open());
        }
        tickets
    });
    reply(result, StatusCode::OK)
}

/// Answer a ticket; the resident is notified
async fn admin_update_ticket(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> impl IntoResponse {
    if let Err(e) = authorize(&state, &headers) {
        return failure::<Ticket>(e);
    }

    let tickets = state.services.tickets.clone();
    let result = blocking(move || tickets.update_status(&id, &req.status, &req.response)).await;
    reply_committed(result, StatusCode::OK)
}

/// Add a renovation project
async fn admin_create_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if let Err(e) = authorize(&state, &headers) {
        return failure::<Project>(e);
    }

    let projects = state.services.projects.clone();
    let status = req.status.unwrap_or_else(|| "Planning/Start".to_string());
    let result =
        blocking(move || projects.create(&req.name, req.progress, &status, &req.note)).await;
    reply(result, StatusCode::CREATED)
}

/// Record progress on a project
async fn admin_update_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    if let Err(e) = authorize(&state, &headers) {
        return failure::<Project>(e);
    }

    let projects = state.services.projects.clone();
    let result =
        blocking(move || projects.update(&name, req.progress, &req.status, &req.note)).await;
    reply(result, StatusCode::OK)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tickets", post(create_ticket))
        .route("/tickets/{id}", get(get_ticket))
        .route("/projects", get(list_projects))
        .route("/admin/tickets", get(admin_list_tickets))
        .route("/admin/tickets/{id}", patch(admin_update_ticket))
        .route("/admin/projects", post(admin_create_project))
        .route("/admin/projects/{name}", patch(admin_update_project))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let workspace =
        Workspace::find().map_err(|e| anyhow::anyhow!("Failed to open workspace: {}", e))?;
    let config = workspace.config()?;
    let services = Services::open(&workspace, &config)?;
    if !services.admin.is_enabled() {
        tracing::warn!("No admin password configured, /admin routes will refuse every request");
    }

    let app = build_router(Arc::new(AppState { services }));

    // VOZ_API_PORT is already folded into the config
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.api.port));
    tracing::info!("Starting voz-api on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use voz_core::{
        Config, LogSink, MemoryTables, NotificationError, NotificationSink, TabularStore,
    };

    const PASSWORD: &str = "admin123";

    struct DownMail;

    impl NotificationSink for DownMail {
        fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotificationError> {
            Err(NotificationError::Transport("connection refused".into()))
        }
    }

    fn app_with(sink: Arc<dyn NotificationSink>) -> (Router, Arc<MemoryTables>) {
        let mut config = Config::default();
        config.admin.password = Some(PASSWORD.into());
        let tables = Arc::new(MemoryTables::new());
        let services = Services::new(&config, tables.clone(), sink);
        (build_router(Arc::new(AppState { services })), tables)
    }

    fn app() -> Router {
        app_with(Arc::new(LogSink)).0
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        password: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(password) = password {
            request = request.header(ADMIN_HEADER, password);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn ana() -> Value {
        json!({
            "resident_name": "Ana",
            "resident_email": "ana@x.com",
            "subject": "Maintenance",
            "detail": "Leak in hallway",
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_and_lookup() {
        let app = app();
        let (status, body) = send(&app, "POST", "/tickets", None, Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "VOZ-101");
        assert!(body.get("warning").is_none());

        let (status, body) = send(&app, "GET", "/tickets/voz-101", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Received");
        assert_eq!(body["data"]["admin_response"], "Pending");
    }

    #[tokio::test]
    async fn test_submit_invalid_email() {
        let (app, tables) = app_with(Arc::new(LogSink));
        let mut request = ana();
        request["resident_email"] = "ana.x.com".into();

        let (status, body) = send(&app, "POST", "/tickets", None, Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("email"));
        assert!(tables.read("voz").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_missing_ticket() {
        let (status, body) = send(&app(), "GET", "/tickets/VOZ-999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_notification_failure_is_a_warning() {
        let (app, _) = app_with(Arc::new(DownMail));
        let (status, body) = send(&app, "POST", "/tickets", None, Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "VOZ-101");
        assert!(body["warning"].as_str().unwrap().contains("ana@x.com"));

        let (status, _) = send(&app, "GET", "/tickets/VOZ-101", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_requires_password() {
        let app = app();
        let (status, _) = send(&app, "GET", "/admin/tickets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/admin/tickets", Some("guess"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let update = json!({ "status": "Resolved", "response": "Fixed" });
        let (status, _) = send(&app, "PATCH", "/admin/tickets/VOZ-101", None, Some(update)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_respond() {
        let app = app();
        send(&app, "POST", "/tickets", None, Some(ana())).await;

        let update = json!({ "status": "Resolved", "response": "Fixed" });
        let (status, body) =
            send(&app, "PATCH", "/admin/tickets/VOZ-101", Some(PASSWORD), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Resolved");
        assert_eq!(body["data"]["admin_response"], "Fixed");

        let (_, body) =
            send(&app, "GET", "/admin/tickets?open=true", Some(PASSWORD), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        let (_, body) =
            send(&app, "GET", "/admin/tickets?status=resolved", Some(PASSWORD), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_respond_errors() {
        let app = app();
        send(&app, "POST", "/tickets", None, Some(ana())).await;

        let bad_status = json!({ "status": "Closed", "response": "" });
        let (status, _) =
            send(&app, "PATCH", "/admin/tickets/VOZ-101", Some(PASSWORD), Some(bad_status)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let update = json!({ "status": "Resolved" });
        let (status, _) =
            send(&app, "PATCH", "/admin/tickets/VOZ-404", Some(PASSWORD), Some(update)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, "GET", "/admin/tickets?status=Closed", Some(PASSWORD), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_projects() {
        let app = app();
        let elevators = json!({ "name": "Elevators", "progress": 40, "status": "InExecution" });
        let (status, body) =
            send(&app, "POST", "/admin/projects", Some(PASSWORD), Some(elevators.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["progress"], 40);

        let (status, _) =
            send(&app, "POST", "/admin/projects", Some(PASSWORD), Some(elevators)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let too_far = json!({ "progress": 150, "status": "InExecution" });
        let (status, _) =
            send(&app, "PATCH", "/admin/projects/Elevators", Some(PASSWORD), Some(too_far)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let done = json!({ "progress": 100, "status": "Finished", "note": "Both cabins" });
        let (status, _) =
            send(&app, "PATCH", "/admin/projects/Elevators", Some(PASSWORD), Some(done)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/projects", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["progress"], 100);
        assert_eq!(body["data"][0]["status"], "Finished");
    }

    #[tokio::test]
    async fn test_project_name_with_spaces() {
        let app = app();
        let roof = json!({ "name": "Roof repair" });
        send(&app, "POST", "/admin/projects", Some(PASSWORD), Some(roof)).await;

        let update = json!({ "progress": 10, "status": "InExecution" });
        let (status, body) =
            send(&app, "PATCH", "/admin/projects/Roof%20repair", Some(PASSWORD), Some(update))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Roof repair");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::Conflict("voz".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&Error::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&Error::Store("offline".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
