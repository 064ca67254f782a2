use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use snafu::ResultExt as _;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::error::{ApplicationError, BindAddressSnafu, WebServerSnafu};
use crate::model::{Video, VideoId};
use crate::store::StoreError;

mod error;
mod state;
pub mod validate;

pub use error::*;
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

type VideoPath = std::result::Result<Path<VideoId>, PathRejection>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route(
            "/video/:video_id",
            get(video::info).put(video::create).patch(video::update),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Serve the API on `address` until the process receives Ctrl-C.
pub async fn serve(address: SocketAddr, app: App) -> std::result::Result<(), ApplicationError> {
    let listener = TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!("listening on http://{}", address);

    axum::serve(listener, create_router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(WebServerSnafu)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for the shutdown signal");
        return std::future::pending().await;
    }
    tracing::info!("received shutdown signal");
}

/// A path segment that is not a non-negative integer is answered like an unknown route.
fn video_id(path: VideoPath) -> Result<VideoId> {
    let Path(video_id) = path.map_err(|rejection| ApiError::InvalidVideoId {
        reason: rejection.body_text(),
    })?;

    if video_id < 0 {
        return Err(ApiError::InvalidVideoId {
            reason: format!("video id `{video_id}` is negative"),
        });
    }

    Ok(video_id)
}

pub mod video {
    use super::*;

    #[instrument(skip_all)]
    pub async fn info(State(app): State<App>, path: VideoPath) -> Result<Json<Video>> {
        let video_id = video_id(path)?;
        let video = app.store().get(video_id).await?;
        Ok(Json(video))
    }

    #[instrument(skip_all)]
    pub async fn create(
        State(app): State<App>, path: VideoPath, body: Bytes,
    ) -> Result<(StatusCode, Json<Video>)> {
        let video_id = video_id(path)?;
        let video = validate::create(&body).context(InvalidArgumentsSnafu)?;

        let video = app.store().create(video_id, video).await?;
        Ok((StatusCode::CREATED, Json(video)))
    }

    #[instrument(skip_all)]
    pub async fn update(
        State(app): State<App>, path: VideoPath, body: Bytes,
    ) -> Result<Json<Video>> {
        let video_id = video_id(path)?;
        let patch = validate::update(&body).context(InvalidArgumentsSnafu)?;

        let video = app
            .store()
            .update(video_id, patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { video_id } => ApiError::CannotUpdate { video_id },
                err => err.into(),
            })?;
        Ok(Json(video))
    }
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::database::in_memory;
    use crate::store::VideoStore;

    async fn server() -> TestServer {
        let app = App::new(VideoStore::new(in_memory().await));
        TestServer::new(create_router(app)).unwrap()
    }

    #[tokio::test]
    async fn create_then_update_likes() {
        let server = server().await;

        let response = server
            .put("/video/1")
            .json(&json!({ "name": "a", "views": 5, "likes": 2 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({ "id": 1, "name": "a", "views": 5, "likes": 2 }));

        let response = server.patch("/video/1").json(&json!({ "likes": 10 })).await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({ "id": 1, "name": "a", "views": 5, "likes": 10 }));

        let response = server.get("/video/1").await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({ "id": 1, "name": "a", "views": 5, "likes": 10 }));
    }

    #[tokio::test]
    async fn get_missing_video() {
        let server = server().await;

        let response = server.get("/video/99").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["message"], "Could not find video with that ID");
        assert_eq!(body["error"], "VideoNotFound");
    }

    #[tokio::test]
    async fn duplicate_put_conflicts() {
        let server = server().await;
        server
            .put("/video/1")
            .json(&json!({ "name": "a", "views": 5, "likes": 2 }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put("/video/1")
            .json(&json!({ "name": "b", "views": 0, "likes": 0 }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        server
            .get("/video/1")
            .await
            .assert_json(&json!({ "id": 1, "name": "a", "views": 5, "likes": 2 }));
    }

    #[tokio::test]
    async fn put_missing_field_writes_nothing() {
        let server = server().await;

        let response = server
            .put("/video/2")
            .json(&json!({ "name": "a", "views": 5 }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"], "InvalidArguments");
        assert_eq!(body["message"], "likes: likes on the video is required");

        server.get("/video/2").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_missing_video_creates_nothing() {
        let server = server().await;

        let response = server.patch("/video/3").json(&json!({ "likes": 1 })).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["message"], "Video doesn't exist, cannot update");

        server.get("/video/3").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_with_mistyped_field_changes_nothing() {
        let server = server().await;
        server
            .put("/video/4")
            .json(&json!({ "name": "a", "views": 5, "likes": 2 }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .patch("/video/4")
            .json(&json!({ "name": "b", "views": "lots" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        server
            .get("/video/4")
            .await
            .assert_json(&json!({ "id": 4, "name": "a", "views": 5, "likes": 2 }));
    }

    #[tokio::test]
    async fn non_integer_id_is_not_found() {
        let server = server().await;

        let response = server.get("/video/abc").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"], "InvalidVideoId");
    }

    #[tokio::test]
    async fn negative_id_is_not_found() {
        let server = server().await;

        let response = server
            .put("/video/-5")
            .json(&json!({ "name": "a", "views": 5, "likes": 2 }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"], "InvalidVideoId");

        server.get("/video/-5").await.assert_status(StatusCode::NOT_FOUND);
        server
            .patch("/video/-5")
            .json(&json!({ "likes": 1 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_with_mistyped_field_writes_nothing() {
        let server = server().await;

        for body in [
            json!({ "name": "a", "views": "5", "likes": 2 }),
            json!({ "name": "a", "views": 5, "likes": 2.5 }),
            json!({ "name": 12, "views": 5, "likes": 2 }),
        ] {
            let response = server.put("/video/6").json(&body).await;
            response.assert_status(StatusCode::NOT_FOUND);

            let error: Value = response.json();
            assert_eq!(error["error"], "InvalidArguments", "body {body} must be rejected");
        }

        server.get("/video/6").await.assert_status(StatusCode::NOT_FOUND);
    }
}
