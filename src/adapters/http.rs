//! HTTP entrypoint: `POST /v1/ports/provision`.
//!
//! Decodes the JSON body whatever its `Content-Type`, hands it to the
//! [`DispatchPipeline`] and maps the outcome to a status code. The pipeline is shared by every request.

use crate::core::{DispatchContext, DispatchPipeline};
use crate::utils::error::{AggregatorError, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const PROVISION_PATH: &str = "/v1/ports/provision";

const INVALID_BODY: &str = "Invalid request body per OpenAPI spec";
const DISPATCH_FAILED: &str = "Failed to dispatch task";
const ACCEPTED: &str = "Provisioning initiated";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub port_id: String,
    pub vlan_id: i64,
    pub fabric_zone: String,
}

impl ProvisionRequest {
    /// Parses a request body. Every field must be present and the string
    /// fields non-empty; their content is otherwise left alone.
    pub fn from_body(body: &[u8]) -> std::result::Result<Self, String> {
        let req: Self = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        if req.port_id.is_empty() {
            return Err("portId is required".to_string());
        }
        if req.fabric_zone.is_empty() {
            return Err("fabricZone is required".to_string());
        }
        Ok(req)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DispatchPipeline>,
    pub dispatch_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(pipeline: Arc<DispatchPipeline>, dispatch_timeout: Option<Duration>) -> Self {
        Self {
            pipeline,
            dispatch_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PROVISION_PATH, post(provision_port))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router until `shutdown` resolves, then lets in-flight
/// requests finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Fabric Aggregator listening on {}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Status code an internal error is reported with.
///
/// Caller-correctable validation failures become 400; broker, encoding and
/// cancellation failures all surface as 500.
pub fn status_for(err: &AggregatorError) -> StatusCode {
    if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &AggregatorError) -> Response {
    let status = status_for(err);
    let message = if status == StatusCode::BAD_REQUEST {
        err.to_string()
    } else {
        DISPATCH_FAILED.to_string()
    };
    (status, Json(ErrorBody { error: message })).into_response()
}

fn invalid_body() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: INVALID_BODY.to_string(),
        }),
    )
        .into_response()
}

async fn provision_port(State(state): State<AppState>, body: Bytes) -> Response {
    let req = match ProvisionRequest::from_body(&body) {
        Ok(req) => req,
        Err(reason) => {
            tracing::debug!(error = %reason, "malformed provisioning request");
            return invalid_body();
        }
    };

    let mut ctx = DispatchContext::new();
    if let Some(timeout) = state.dispatch_timeout {
        ctx = ctx.with_timeout(timeout);
    }

    match state
        .pipeline
        .provision_port(&ctx, &req.port_id, req.vlan_id, &req.fabric_zone)
        .await
    {
        Ok(_) => (
            StatusCode::ACCEPTED,
            Json(StatusBody {
                status: ACCEPTED.to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
