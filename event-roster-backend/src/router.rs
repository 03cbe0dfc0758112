use core::any::Any;
use core::time::Duration;
use std::sync::Arc;

use axum::body::Body;
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use event_roster_assignment::Store;
use http::{Request, StatusCode};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{error, info_span, Level, Span};

use crate::auth;
use crate::error::AppError;
use crate::extract::FORM_LIMIT;
use crate::notice::{json_response, Notice, NoticeKind};
use crate::routes::{bookings, events, index, newsletter, profiles, roster, volunteers};
use crate::AppState;

/// The whole HTTP surface. Only the home page and the public submission forms
/// skip the operator check.
pub fn router<S: Store + 'static>(state: Arc<AppState<S>>) -> Router {
    let public: Router<Arc<AppState<S>>> = Router::new()
        .route("/", get(index::index::<S>))
        .route("/bookings", post(bookings::create::<S>))
        .route("/newsletter", post(newsletter::subscribe::<S>));

    let operator: Router<Arc<AppState<S>>> = Router::new()
        .route("/events", get(events::list::<S>).post(events::create::<S>))
        .route(
            "/events/:id",
            get(events::details::<S>)
                .put(events::update::<S>)
                .delete(events::delete::<S>),
        )
        .route("/events/:id/volunteers", post(roster::assign::<S>))
        .route("/events/:id/volunteers/remove", post(roster::remove::<S>))
        .route("/volunteers/:id/events", get(volunteers::events::<S>))
        .route(
            "/profiles",
            get(profiles::list::<S>).post(profiles::create::<S>),
        )
        .route(
            "/profiles/:id",
            axum::routing::put(profiles::update::<S>).delete(profiles::delete::<S>),
        )
        .route("/profiles/:id/powerhouse", post(profiles::powerhouse::<S>))
        .route("/bookings", get(bookings::list::<S>))
        .route("/bookings/:id/note", post(bookings::note::<S>))
        .route("/newsletter", get(newsletter::list::<S>))
        .route(
            "/newsletter/:id",
            axum::routing::delete(newsletter::unsubscribe::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::operator_only::<S>,
        ));

    let request_timeout = state.config.request_timeout();
    layers(
        public
            .merge(operator)
            .fallback(not_found)
            .with_state(state),
        request_timeout,
    )
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Request id, tracing, panic and timeout handling around every route.
///
/// The timeout covers reading the body, so a client that stops sending
/// cannot hold a connection open past it.
pub fn layers(app: Router, request_timeout: Duration) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            )
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(RequestBodyLimitLayer::new(FORM_LIMIT))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    info_span!(
        "request",
        request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    error!("handler panicked: {message}");
    let notice = Notice::new(
        NoticeKind::ServerError,
        "Something went wrong. Please try again later.",
    );
    json_response(StatusCode::INTERNAL_SERVER_ERROR, Some(&notice), &()).unwrap_or_else(|err| {
        error!("failed to encode panic notice: {err}");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
