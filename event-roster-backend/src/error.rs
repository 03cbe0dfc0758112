use core::convert::Infallible;

use axum::body::Body;
use axum::extract::rejection::FormRejection;
use axum::response::{IntoResponse, Response};
use event_roster_assignment::AssignmentError;
use event_roster_config::ConfigError;
use event_roster_database::error::DatabaseError;
use http::StatusCode;
use tracing::{error, warn};

use crate::notice::{json_response, Notice, NoticeKind};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("form submission error: {0}")]
    Form(#[from] FormRejection),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Assignment(#[from] AssignmentError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("rustls error: {0}")]
    Rustls(#[from] tokio_rustls::rustls::Error),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("page not found")]
    NotFound,
    #[error("operator credentials required")]
    Unauthorized,
}

impl From<Infallible> for AppError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl AppError {
    pub const fn kind(&self) -> NoticeKind {
        match self {
            Self::Assignment(AssignmentError::NotFound(_)) | Self::NotFound => NoticeKind::NotFound,
            Self::Assignment(AssignmentError::InvalidInput(_)) | Self::Form(_) => {
                NoticeKind::ValidationFailed
            }
            Self::Unauthorized => NoticeKind::Unauthorized,
            Self::Assignment(AssignmentError::Persistence(_))
            | Self::Json(_)
            | Self::Database(_)
            | Self::Config(_)
            | Self::File(_)
            | Self::Rustls(_)
            | Self::NoPrivateKey(_) => NoticeKind::ServerError,
        }
    }

    /// Rejected forms keep axum's status, so an oversized body is still a 413.
    pub fn status(&self) -> StatusCode {
        if let Self::Form(rejection) = self {
            return rejection.status();
        }
        match self.kind() {
            NoticeKind::NotFound => StatusCode::NOT_FOUND,
            NoticeKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            NoticeKind::Unauthorized => StatusCode::UNAUTHORIZED,
            NoticeKind::Success | NoticeKind::NoOp | NoticeKind::ServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Internal failures are logged here and reported with a generic message.
    pub fn notice(&self) -> Notice {
        let kind = self.kind();
        match kind {
            NoticeKind::ServerError => {
                error!("request failed: {self}");
                Notice::new(kind, "Something went wrong. Please try again later.")
            }
            NoticeKind::ValidationFailed => {
                warn!("rejected input: {self}");
                Notice::new(kind, self.to_string())
            }
            _ => Notice::new(kind, self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let notice = self.notice();
        json_response(status, Some(&notice), &()).unwrap_or_else(|err| {
            error!("failed to encode error notice: {err}");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            response
        })
    }
}
