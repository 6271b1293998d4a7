use crate::error::VerifyError;
use crate::verify::TrustDecision;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};

use super::{AppState, TOKEN_HEADER};

/// Exactly one non-empty, visible-ASCII `token` header, or `MissingProof`.
pub(super) fn extract_token(headers: &HeaderMap) -> Result<&str, VerifyError> {
    let mut values = headers.get_all(TOKEN_HEADER).iter();
    let (Some(value), None) = (values.next(), values.next()) else {
        return Err(VerifyError::MissingProof);
    };

    value
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(VerifyError::MissingProof)
}

async fn decide(state: &AppState, headers: &HeaderMap) -> Result<(), VerifyError> {
    let token = extract_token(headers)?;
    match tokio::time::timeout(state.verify_timeout, state.verifier.assess(token)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(VerifyError::ProviderUnavailable("verifier timed out".into())),
    }
}

/// GET|POST <verify_route> — exchange a proof token for a trust decision.
///
/// Always 200. The rejection reason is logged and never returned.
pub(super) async fn handle_verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let decision = match decide(&state, &headers).await {
        Ok(()) => TrustDecision::verified(),
        Err(error) => {
            tracing::debug!(reason = error.reason(), "proof token rejected");
            TrustDecision::rejected()
        }
    };

    (StatusCode::OK, Json(decision))
}

/// Outermost mapping for the verify route: a response produced by a
/// middleware rejection (body limit, request timeout, bad method) becomes a
/// plain rejection so callers always see `200 {"verified": false}`.
pub(super) async fn fail_closed(response: Response) -> Response {
    if response.status() == StatusCode::OK {
        return response;
    }
    tracing::debug!(status = %response.status(), "verify request rejected by middleware");
    (StatusCode::OK, Json(TrustDecision::rejected())).into_response()
}

/// GET /health — always public (no secrets leaked)
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}
