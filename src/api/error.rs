use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use snafu::Snafu;

use super::validate::ValidationError;
use crate::database::DatabaseError;
use crate::model::VideoId;
use crate::store::StoreError;
use crate::Located;

#[derive(Debug, Snafu, Serialize)]
#[snafu(visibility(pub(crate)))]
#[serde(tag = "error", content = "data")]
pub enum ApiError {
    #[snafu(display("{source}"))]
    InvalidArguments {
        #[serde(rename = "reason")]
        source: ValidationError,
    },

    #[snafu(display("Could not find video with that ID"))]
    VideoNotFound { video_id: VideoId },

    #[snafu(display("Video doesn't exist, cannot update"))]
    CannotUpdate { video_id: VideoId },

    #[snafu(display("Video ID already taken..."))]
    VideoIdTaken { video_id: VideoId },

    #[snafu(display("video id must be an integer"))]
    InvalidVideoId { reason: String },

    #[snafu(display("the video store is unavailable"))]
    Storage {
        #[serde(skip)]
        source: DatabaseError,
    },
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { video_id } => ApiError::VideoNotFound { video_id },
            StoreError::Conflict { video_id } => ApiError::VideoIdTaken { video_id },
            StoreError::Database { source } => ApiError::Storage { source },
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // argument errors answer 404 like every other rejected video request
            ApiError::InvalidArguments { .. }
            | ApiError::VideoNotFound { .. }
            | ApiError::CannotUpdate { .. }
            | ApiError::InvalidVideoId { .. } => StatusCode::NOT_FOUND,
            ApiError::VideoIdTaken { .. } => StatusCode::CONFLICT,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(flatten)]
    data: ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage { source } = &self {
            tracing::error!(error = %source, location = %source.location(), "database request failed");
        }

        let status = self.status();
        let content = ErrorResponse {
            message: self.to_string(),
            data: self,
        };

        (status, Json(content)).into_response()
    }
}
