//! HTTP Adapter
//!
//! Exposes `PanVerificationApi` as `POST /api/kyc/pan`. Authentication is
//! resolved upstream; this layer only requires that an `AuthenticatedUser`
//! extension is present on the request.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | No authenticated user | 401 | `{"error":"Unauthorized"}` |
//! | Malformed body or invalid PAN | 400 | `{"error":"Invalid request"}` |
//! | Any verification failure | 500 | `{"error":"PAN verification failed"}` |
//! | Verified | 200 | masked provider response |

use crate::domain::{KycError, VerifyPanRequest};
use crate::ports::inbound::PanVerificationApi;
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use std::sync::Arc;
use tracing::{error, warn};

/// Route for PAN verification.
pub const PAN_ROUTE: &str = "/api/kyc/pan";

/// Header carrying the caller identity when a trusted proxy performs
/// authentication.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// Identity of the caller, inserted by the authentication layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[derive(Clone)]
struct AppState {
    api: Arc<dyn PanVerificationApi>,
}

/// Build the verification router.
pub fn router(api: Arc<dyn PanVerificationApi>) -> Router {
    Router::new()
        .route(PAN_ROUTE, post(verify_pan))
        .with_state(AppState { api })
}

/// Middleware that trusts `x-authenticated-user` set by a fronting proxy.
///
/// Only mount this behind a proxy that strips the header from client
/// requests.
pub async fn user_from_header(mut req: Request, next: Next) -> Response {
    let user = req
        .headers()
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| AuthenticatedUser(v.to_string()));

    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn verify_pan(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    body: Result<Json<VerifyPanRequest>, JsonRejection>,
) -> Response {
    let Some(Extension(AuthenticatedUser(user_id))) = user else {
        return error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let Ok(Json(request)) = body else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid request");
    };

    match state.api.verify_pan(Some(user_id), request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(KycError::Validation(reason)) => {
            warn!("[kyc-01] Rejected PAN request: {}", reason);
            error_body(StatusCode::BAD_REQUEST, "Invalid request")
        }
        Err(err) => {
            error!(kind = err.kind(), "[kyc-01] PAN verification failed: {}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "PAN verification failed")
        }
    }
}
