use super::{AppState, error::ApiError};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use subtle::ConstantTimeEq;

/// Extractor that admits only requests bearing the configured admin token.
///
/// Expects `Authorization: Bearer <token>`. Anything else is rejected with
/// [`ApiError::Unauthorized`] before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match presented {
            Some(token) if tokens_match(token, &state.admin_token) => Ok(Self),
            _ => {
                tracing::warn!(uri = %parts.uri, "rejected admin request");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Constant-time token comparison.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
