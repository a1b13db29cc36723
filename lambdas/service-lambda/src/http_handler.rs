use image_labels_shared::error::ServiceError;
use image_labels_shared::service::{self, ServiceOutput};
use image_labels_shared::types::ServiceRequest;
use image_labels_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth;

/// Main Lambda handler - decodes the request once and dispatches on its action
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    tracing::info!("Service Lambda invoked - Method: {} Path: {}", method, event.uri().path());

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    if method != Method::POST && method != Method::GET {
        tracing::warn!("⚠️ Method {} not allowed", method);
        return json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({"error": "MethodNotAllowed", "message": "Method not allowed"}),
        );
    }

    if let Err(e) = auth::require_bearer(&event) {
        tracing::warn!("Rejected request: {}", e);
        return error_response(&e);
    }
    if let Some(caller) = auth::caller_id(&event) {
        tracing::info!("Caller: {}", caller);
    }

    let query: HashMap<String, String> = event
        .query_string_parameters()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let request = match ServiceRequest::decode(event.body(), &query) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Failed to decode request: {}", e);
            return error_response(&e);
        }
    };
    tracing::info!("Action {:?} for key {}", request.action, request.key);

    match service::handle(&state, &request).await {
        Ok(ServiceOutput::Labels(output)) => json_response(StatusCode::OK, &output),
        Ok(ServiceOutput::Deleted(output)) => json_response(StatusCode::OK, &output),
        Err(e) => {
            tracing::error!("Action {:?} for {} failed: {}", request.action, request.key, e);
            error_response(&e)
        }
    }
}

fn error_response(error: &ServiceError) -> Result<Response<Body>, Error> {
    json_response(error.status_code(), &error.to_response())
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}
