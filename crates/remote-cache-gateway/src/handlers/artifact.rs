//! Artifact access handler (presigned URL grants)

use crate::presign::ArtifactOperation;
use crate::routes::header_str;
use crate::{ApiError, AppState};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// OPTIONS /v8/artifacts/{hash} - Grant a presigned URL for the team's artifact
///
/// The operation comes from `Access-Control-Request-Method`. Authentication
/// runs first, so an unsupported hint with a bad token is still a 401.
pub async fn artifact_grant(
    state: &AppState,
    hash: &str,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let authorization = header_str(headers, header::AUTHORIZATION.as_str()).unwrap_or("");
    let tenant = state.authenticator.authenticate(authorization)?;

    // The path segment is still percent-encoded; the signer encodes the key
    // itself, so the key is built from the decoded hash.
    let hash = urlencoding::decode(hash).map_err(|_| ApiError::NotFound)?;

    // Keys are always namespaced by the verified team
    let key = tenant.object_key(&hash);

    let operation = header_str(headers, header::ACCESS_CONTROL_REQUEST_METHOD.as_str())
        .and_then(ArtifactOperation::from_method)
        .ok_or(ApiError::NotFound)?;

    let url = state
        .signer
        .sign(operation, &key, &tenant, state.config.presign_expiry_secs)
        .await?;

    tracing::debug!(team = %tenant, %operation, %key, "Issued presigned artifact URL");

    Ok((StatusCode::OK, [(header::LOCATION, url)], "").into_response())
}
