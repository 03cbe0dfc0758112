use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use event_roster_assignment::Store;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt as _};
use http::HeaderMap;

use crate::error::AppError;
use crate::AppState;

/// Checks `Authorization: Bearer <operator_token>`.
///
/// Without a configured token no request is an operator request.
pub fn require_operator(headers: &HeaderMap, operator_token: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = operator_token.filter(|token| !token.is_empty()) else {
        return Err(AppError::Unauthorized);
    };
    match headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) if bearer.token() == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// Route layer in front of every operator route.
pub async fn operator_only<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_operator(request.headers(), state.config.operator_token.as_deref())?;
    Ok(next.run(request).await)
}
