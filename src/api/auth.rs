// =============================================================================
// Bearer Token Authentication: Axum extractor for admin endpoints
// =============================================================================
//
// The expected token is read from `TRENDLINE_ADMIN_TOKEN` on every request.
// When the variable is unset or empty, every admin request is refused. Read
// endpoints (health, catalog, view) never use this extractor.
// =============================================================================

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

pub const ADMIN_TOKEN_VAR: &str = "TRENDLINE_ADMIN_TOKEN";

/// Token comparison whose running time depends only on the token length.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Check a presented `Authorization` header value against `expected`.
fn check_header(header: Option<&str>, expected: &str) -> Result<(), &'static str> {
    if expected.is_empty() {
        return Err("Server authentication not configured");
    }
    let token = header
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or("Missing or invalid authorization token")?;
    if !tokens_match(token, expected) {
        return Err("Invalid authorization token");
    }
    Ok(())
}

/// Guards admin handlers. Yields nothing useful; its presence is the check.
pub struct AdminAuth;

pub struct AuthRejection {
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": "FORBIDDEN",
            "error": self.message,
        });
        (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let expected = std::env::var(ADMIN_TOKEN_VAR).unwrap_or_default();
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        check_header(header, &expected).map_err(|message| {
            warn!(reason = message, "admin request rejected");
            AuthRejection { message }
        })?;

        Ok(AdminAuth)
    }
}

// =============================================================================
// Tests
// =============================================================================
