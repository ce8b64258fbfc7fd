//! # git-slacker HTTP Service
//!
//! HTTP surface of the git-slacker relay.
//!
//! This service provides:
//! - `POST /webhook/{provider_name}`: repository host webhooks (`github`)
//! - `POST /bot/{provider_name}/commands`: chat bot slash commands (`slack`)
//! - `POST /bot/{provider_name}/events[/{secure_token}]`: chat bot events
//!   (`slack`, `telegram`)
//! - `GET /health`
//!
//! Controllers only translate requests into commands. Every response,
//! including errors, is rendered by dispatching a `Response/*` command.

pub mod config;
pub mod errors;
pub mod provider;
pub mod wiring;

pub use config::ServiceConfig;
pub use errors::{ApiError, ConfigError, ServiceError};
pub use wiring::build_state;

use crate::errors::INTERNAL_ERROR_MESSAGE;
use crate::provider::{ProviderName, SecureToken};
use axum::{
    extract::{DefaultBodyLimit, Path, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use bytes::Bytes;
use git_slacker_core::{
    Command, CommandBus, CommandFactory, CommandKind, CorrelationId, EventEmitter, RelayError,
    RenderedResponse, RoutingError,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info, instrument, warn};

/// Header carrying the per-request correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Builds commands from their logical names
    pub commands: Arc<CommandFactory>,

    /// Routes every command to its handler
    pub bus: Arc<CommandBus>,

    /// Listener bindings, exposed by the health endpoint
    pub emitter: Arc<EventEmitter>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        commands: Arc<CommandFactory>,
        bus: Arc<CommandBus>,
        emitter: Arc<EventEmitter>,
    ) -> Self {
        Self {
            config,
            commands,
            bus,
            emitter,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new().route("/webhook/{provider_name}", post(handle_webhook));

    let bot_routes = Router::new()
        .route("/bot/{provider_name}/commands", post(handle_bot_commands))
        .route("/bot/{provider_name}/events", post(handle_bot_events))
        .route(
            "/bot/{provider_name}/events/{secure_token}",
            post(handle_bot_events_with_token),
        );

    let health_routes = Router::new().route("/health", get(handle_health_check));

    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .merge(webhook_routes)
        .merge(bot_routes)
        .merge(health_routes)
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(middleware::from_fn(correlation_middleware))
                .layer(DefaultBodyLimit::max(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server and serve until SIGINT or SIGTERM.
///
/// The configuration is validated before anything is bound.
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    state.config.validate()?;

    let address = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", address);

    // In-flight requests complete before the server stops.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

// ============================================================================
// Controllers
// ============================================================================

/// Handle repository host webhooks
#[instrument(skip_all, fields(provider = %provider_name, correlation_id = %correlation_id))]
async fn handle_webhook(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Path(provider_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = relay_webhook(&state, &provider_name, &headers, body).await;
    respond(&state, &correlation_id, result.map(|()| Map::new())).await
}

async fn relay_webhook(
    state: &AppState,
    provider_name: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<(), ApiError> {
    let provider = parse_provider(provider_name)?;

    let command = match provider.as_str() {
        ProviderName::GITHUB => {
            let payload = parse_body(headers, &body)?;
            let mut command = state.commands.create(&CommandKind::GitHubWebHook.name())?;
            command
                .set_field("event_name", header_text(headers, "x-github-event"))?
                .set_field("request_signature", header_text(headers, "x-hub-signature"))?
                .set_field("payload", payload)?
                .set_field("raw", body)?;
            command
        }
        _ => return Err(unknown_provider(&provider)),
    };

    state.bus.dispatch(command).await?;
    Ok(())
}

/// Handle chat bot slash commands
#[instrument(skip_all, fields(provider = %provider_name, correlation_id = %correlation_id))]
async fn handle_bot_commands(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Path(provider_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = relay_bot_commands(&state, &provider_name, &headers, &body).await;
    respond(&state, &correlation_id, result.map(|()| Map::new())).await
}

async fn relay_bot_commands(
    state: &AppState,
    provider_name: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<(), ApiError> {
    let provider = parse_provider(provider_name)?;

    let command = match provider.as_str() {
        ProviderName::SLACK => payload_command(state, CommandKind::SlackCommands, headers, body)?,
        _ => return Err(unknown_provider(&provider)),
    };

    state.bus.dispatch(command).await?;
    Ok(())
}

/// Handle chat bot events without a path token
#[instrument(skip_all, fields(provider = %provider_name, correlation_id = %correlation_id))]
async fn handle_bot_events(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Path(provider_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = relay_bot_events(&state, &provider_name, None, &headers, &body).await;
    respond(&state, &correlation_id, result.map(|()| Map::new())).await
}

/// Handle chat bot events carrying a secure token in the path
#[instrument(skip_all, fields(provider = %provider_name, correlation_id = %correlation_id))]
async fn handle_bot_events_with_token(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Path((provider_name, secure_token)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = relay_bot_events(&state, &provider_name, Some(secure_token), &headers, &body).await;
    respond(&state, &correlation_id, result.map(|()| Map::new())).await
}

async fn relay_bot_events(
    state: &AppState,
    provider_name: &str,
    secure_token: Option<String>,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<(), ApiError> {
    let provider = parse_provider(provider_name)?;
    let secure_token = secure_token
        .map(SecureToken::new)
        .transpose()
        .map_err(|e| {
            debug!(error = %e, "Rejecting secure token segment");
            route_not_found(&format!("/bot/{provider_name}/events/..."))
        })?;

    let command = match provider.as_str() {
        ProviderName::SLACK => payload_command(state, CommandKind::SlackEvents, headers, body)?,
        ProviderName::TELEGRAM => {
            let mut command = payload_command(state, CommandKind::TelegramEvents, headers, body)?;
            if let Some(token) = secure_token {
                command.set_field("secure_token", token.into_inner())?;
            }
            command
        }
        _ => return Err(unknown_provider(&provider)),
    };

    state.bus.dispatch(command).await?;
    Ok(())
}

/// Basic health check endpoint
#[instrument(skip_all, fields(correlation_id = %correlation_id))]
async fn handle_health_check(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
) -> Response {
    let mut body = Map::new();
    body.insert("version".to_string(), json!(env!("CARGO_PKG_VERSION")));
    body.insert("listeners".to_string(), json!(state.emitter.manifest()));

    respond(&state, &correlation_id, Ok(body)).await
}

async fn handle_not_found(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    uri: Uri,
) -> Response {
    render_error(&state, &correlation_id, route_not_found(uri.path())).await
}

async fn handle_method_not_allowed(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    method: Method,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    let error = ApiError::MethodNotAllowed {
        method: method.to_string(),
    };
    render_error(&state, &correlation_id, error).await
}

// ============================================================================
// Request Parsing
// ============================================================================

fn parse_provider(provider_name: &str) -> Result<ProviderName, ApiError> {
    ProviderName::new(provider_name).map_err(|e| {
        debug!(error = %e, "Rejecting provider segment");
        route_not_found(&format!("/{provider_name}"))
    })
}

fn unknown_provider(provider: &ProviderName) -> ApiError {
    RoutingError::UnknownProvider {
        provider: provider.to_string(),
    }
    .into()
}

fn route_not_found(path: &str) -> ApiError {
    RoutingError::RouteNotFound {
        path: path.to_string(),
    }
    .into()
}

/// Build a command whose only field is the parsed request body
fn payload_command(
    state: &AppState,
    kind: CommandKind,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Command, ApiError> {
    let payload = parse_body(headers, body)?;
    let mut command = state.commands.create(&kind.name())?;
    command.set_field("payload", payload)?;
    Ok(command)
}

/// Parse a JSON object or form-encoded body; an empty body is an empty map.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.is_empty() {
        return Ok(Map::new());
    }

    let content_type = header_text(headers, header::CONTENT_TYPE.as_str());
    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Ok(url::form_urlencoded::parse(body)
            .into_owned()
            .map(|(key, value)| (key, Value::String(value)))
            .collect());
    }

    let reason = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(payload)) => return Ok(payload),
        Ok(_) => "body is not a JSON object".to_string(),
        Err(e) => e.to_string(),
    };
    warn!(reason = %reason, "Unparseable request body");
    Err(ApiError::MalformedBody { reason })
}

/// Header value as text; missing or non-ASCII headers are empty
fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Response Rendering
// ============================================================================

/// Render `result` through the bus: `Response/Success` with the given body,
/// or `Response/Error` for the failure.
async fn respond(
    state: &AppState,
    correlation_id: &CorrelationId,
    result: Result<Map<String, Value>, ApiError>,
) -> Response {
    let rendered = match result {
        Ok(body) => render_success(state, body).await,
        Err(error) => Err(error),
    };

    match rendered {
        Ok(response) => into_http(response),
        Err(error) => render_error(state, correlation_id, error).await,
    }
}

async fn render_success(
    state: &AppState,
    body: Map<String, Value>,
) -> Result<RenderedResponse, ApiError> {
    let mut command = state.commands.create(&CommandKind::SuccessResponse.name())?;
    if !body.is_empty() {
        command.set_field("body", body)?;
    }
    dispatch_response(state, command).await
}

/// Render `error` as `{status: false, error: {id, code, message[, detail]}}`.
///
/// Unexpected errors are logged with their full chain and reported to the
/// caller as [`INTERNAL_ERROR_MESSAGE`]. The chain is attached as `detail`
/// in debug mode.
async fn render_error(
    state: &AppState,
    correlation_id: &CorrelationId,
    error: ApiError,
) -> Response {
    let (status, message) = if error.is_expected() {
        debug!(
            correlation_id = %correlation_id,
            status = error.status_code().as_u16(),
            error = %error,
            "Request rejected"
        );
        (error.status_code(), error.to_string())
    } else {
        error!(correlation_id = %correlation_id, chain = ?error.chain(), "{}", error);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE.to_string(),
        )
    };

    let mut details = Map::new();
    details.insert("id".to_string(), json!(correlation_id.as_str()));
    details.insert("code".to_string(), json!(status.as_u16()));
    details.insert("message".to_string(), json!(message));
    if state.config.debug {
        details.insert("detail".to_string(), json!(error.chain()));
    }
    let details = Value::Object(details);

    let mut response = match render_error_command(state, details.clone(), status).await {
        Ok(rendered) => into_http(rendered),
        Err(failure) => {
            error!(
                correlation_id = %correlation_id,
                chain = ?failure.chain(),
                "Error response could not be rendered"
            );
            (status, Json(json!({"status": false, "error": details}))).into_response()
        }
    };

    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store,no-cache"),
    );
    response
}

async fn render_error_command(
    state: &AppState,
    error: Value,
    status: StatusCode,
) -> Result<RenderedResponse, ApiError> {
    let mut command = state.commands.create(&CommandKind::ErrorResponse.name())?;
    command
        .set_field("error", error)?
        .set_field("status_code", status.as_u16())?;
    dispatch_response(state, command).await
}

async fn dispatch_response(
    state: &AppState,
    command: Command,
) -> Result<RenderedResponse, ApiError> {
    let kind = command.kind();
    state.bus.dispatch(command).await?.into_rendered().ok_or_else(|| {
        ApiError::from(RelayError::Internal {
            message: format!("{kind} produced no response"),
        })
    })
}

fn into_http(rendered: RenderedResponse) -> Response {
    let status =
        StatusCode::from_u16(rendered.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(rendered.body)).into_response()
}

// ============================================================================
// Middleware
// ============================================================================

/// Assign a correlation id to every request.
///
/// An incoming `x-correlation-id` is reused when it is a valid id. The id is
/// made available to controllers as an extension and echoed in the response.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn correlation_middleware(mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<CorrelationId>().ok())
        .unwrap_or_default();

    tracing::Span::current().record("correlation_id", correlation_id.as_str().as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&correlation_id.as_str()) {
        response
            .headers_mut()
            .insert(CORRELATION_HEADER, header_value);
    }

    let status = response.status();
    let duration = start.elapsed();
    if status.is_server_error() {
        error!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
