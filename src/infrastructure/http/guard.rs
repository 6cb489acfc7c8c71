use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::access::{AuthStatus, GuardDecision, RouteGuard, User};
use crate::domain::auth::ClaimsReader;

/// Everything the guard middleware needs for one group of routes.
#[derive(Clone)]
pub struct GuardState {
    claims: Arc<ClaimsReader>,
    guard: RouteGuard,
    login_path: Arc<str>,
}

impl GuardState {
    pub fn new(claims: Arc<ClaimsReader>, guard: RouteGuard, login_path: &str) -> Self {
        Self {
            claims,
            guard,
            login_path: Arc::from(login_path),
        }
    }
}

#[derive(Debug, Serialize)]
struct AccessDeniedBody {
    message: String,
    required_role: String,
    user_role: String,
}

/// Route guard middleware.
///
/// Resolves the caller from the `Authorization: Bearer` header and applies
/// the route's `RouteGuard`. On `Render` the resolved `User` is added to the
/// request extensions.
pub async fn route_guard(
    State(state): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    let status = auth_status(&state.claims, request.headers());
    let location = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match state.guard.evaluate(&status, &location) {
        GuardDecision::Render => {
            if let AuthStatus::Authenticated(Some(user)) = status {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GuardDecision::RedirectToLogin { from } => {
            let target = format!("{}?redirect={}", state.login_path, urlencoding::encode(&from));
            tracing::debug!(from = %from, "Redirecting anonymous visitor to login");
            match HeaderValue::from_str(&target) {
                Ok(value) => (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response(),
                Err(_) => StatusCode::UNAUTHORIZED.into_response(),
            }
        }
        GuardDecision::AccessDenied { required, actual } => (
            StatusCode::FORBIDDEN,
            Json(AccessDeniedBody {
                message: format!("This page requires the {} role", required),
                required_role: required.to_string(),
                user_role: actual.to_string(),
            }),
        )
            .into_response(),
        // Bearer headers resolve in the same call, so this only fires for
        // guards fed a pending status by another adapter.
        GuardDecision::Loading => retry_later(),
    }
}

fn retry_later() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, HeaderValue::from_static("1"))],
    )
        .into_response()
}

fn auth_status(claims: &ClaimsReader, headers: &HeaderMap) -> AuthStatus {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AuthStatus::Anonymous;
    };

    match claims.read(token) {
        Ok(claims) => AuthStatus::Authenticated(Some(User::from(claims))),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable bearer token");
            AuthStatus::Anonymous
        }
    }
}

/// Wrap `routes` with the guard and request tracing.
pub fn guarded<S>(routes: Router<S>, state: GuardState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(state, route_guard)),
    )
}
