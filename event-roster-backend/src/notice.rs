//! The JSON document every route answers with.

use axum::body::Body;
use axum::response::Response;
use headers::{ContentType, HeaderMapExt as _};
use http::StatusCode;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    NoOp,
    NotFound,
    ValidationFailed,
    ServerError,
    Unauthorized,
}

/// Outcome message shown to the operator after a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    pub fn no_op(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::NoOp, message)
    }
}

#[derive(Serialize)]
struct Document<'a, T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<&'a Notice>,
    data: &'a T,
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    notice: Option<&Notice>,
    data: &T,
) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(&Document { notice, data })?;
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .typed_insert(ContentType::from(mime::APPLICATION_JSON));
    Ok(response)
}

/// 200 with data only, for reads.
pub fn data<T: Serialize>(data: &T) -> Result<Response, serde_json::Error> {
    json_response(StatusCode::OK, None, data)
}

/// 200 with a notice, for mutations.
pub fn noticed<T: Serialize>(
    notice: &Notice,
    data: &T,
) -> Result<Response, serde_json::Error> {
    json_response(StatusCode::OK, Some(notice), data)
}
