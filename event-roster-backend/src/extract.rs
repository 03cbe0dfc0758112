//! Extractors that turn rejections into [`AppError`] notices.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

/// Forms are small; bigger bodies are cut off by the body limit layer.
pub const FORM_LIMIT: usize = 64 * 1024;

/// An `application/x-www-form-urlencoded` body.
pub struct Form<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Form<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Form(value) = axum::Form::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

/// A numeric id from the path. Ids that do not parse match nothing.
pub struct Id<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Id<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), "unusable path id: {rejection}");
                Err(AppError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::routing::{get, post};
    use axum::Router;
    use event_roster_assignment::EventId;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;
    use serde::Deserialize;
    use tower::ServiceExt as _;

    use super::*;

    #[derive(Deserialize)]
    struct Assign {
        volunteer: Option<String>,
        department: Option<String>,
    }

    async fn echo(Form(form): Form<Assign>) -> String {
        format!(
            "{}|{}",
            form.volunteer.unwrap_or_default(),
            form.department.unwrap_or_default()
        )
    }

    async fn event(Id(id): Id<EventId>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/form", post(echo))
            .route("/events/:id", get(event))
    }

    async fn text(router: Router, request: Request) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), FORM_LIMIT)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn form(body: &'static str) -> Request {
        Request::post("/form")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn decodes_urlencoded_fields() {
        let (status, body) = text(app(), form("volunteer=3&department=F%26B")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3|F&B");

        let (_, body) = text(app(), form("")).await;
        assert_eq!(body, "|");
    }

    #[tokio::test]
    async fn ids_that_are_not_numbers_are_not_found() {
        let (status, body) =
            text(app(), Request::get("/events/12").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "12");

        let (status, body) =
            text(app(), Request::get("/events/gala").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("not_found"), "{body}");
    }
}
