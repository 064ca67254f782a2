use derive_new::new;
use serde::Deserialize;
use snafu::{OptionExt as _, ResultExt as _, Snafu};
use surrealdb::sql::Id;
use tracing::instrument;

use crate::database::{
    Database, DatabaseError, DatabaseQuerySnafu, EmptyQuerySnafu, Thing, UnexpectedKeySnafu,
};
use crate::model::{NewVideo, Video, VideoId, VideoPatch};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

const TABLE: &str = "videos";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("video `{video_id}` does not exist"))]
    NotFound { video_id: VideoId },

    #[snafu(display("video `{video_id}` already exists"))]
    Conflict { video_id: VideoId },

    #[snafu(transparent)]
    Database { source: DatabaseError },
}

/// A row of the `videos` table as SurrealDB returns it, keyed by a record id like `videos:1`.
#[derive(Debug, Deserialize)]
struct VideoRecord {
    id: Thing,
    name: String,
    views: i64,
    likes: i64,
}

impl TryFrom<VideoRecord> for Video {
    type Error = DatabaseError;

    fn try_from(record: VideoRecord) -> std::result::Result<Self, Self::Error> {
        let Id::Number(id) = record.id.id else {
            return UnexpectedKeySnafu { id: record.id }.fail();
        };

        Ok(Video {
            id,
            name: record.name,
            views: record.views,
            likes: record.likes,
        })
    }
}

/// Reads and writes single rows of the `videos` table.
#[derive(Debug, Clone, new)]
pub struct VideoStore {
    database: Database,
}

impl VideoStore {
    #[instrument(skip(self))]
    pub async fn get(&self, video_id: VideoId) -> Result<Video> {
        tracing::debug!("fetching video `{}` from database", video_id);
        self.find(video_id).await?.context(NotFoundSnafu { video_id })
    }

    /// Insert a new video. An existing record with the same id is never overwritten.
    ///
    /// The insert itself is the existence check, so two requests racing for one id end with exactly one video
    /// and one [StoreError::Conflict].
    #[instrument(skip(self))]
    pub async fn create(&self, video_id: VideoId, video: NewVideo) -> Result<Video> {
        let created: surrealdb::Result<Option<VideoRecord>> = self
            .database
            .create((TABLE, video_id))
            .content(video)
            .await;

        let record = match created {
            Err(err) if record_exists(&err) => return ConflictSnafu { video_id }.fail(),
            created => created.context(DatabaseQuerySnafu)?,
        };

        let video = Video::try_from(record.context(EmptyQuerySnafu)?)?;
        tracing::info!(video = %video, "inserted video `{}` to database", video_id);
        Ok(video)
    }

    /// Overwrite the supplied fields of an existing video and leave the rest untouched.
    #[instrument(skip(self))]
    pub async fn update(&self, video_id: VideoId, patch: VideoPatch) -> Result<Video> {
        let current = self.find(video_id).await?.context(NotFoundSnafu { video_id })?;

        if patch.is_empty() {
            return Ok(current);
        }

        let record: Option<VideoRecord> = self
            .database
            .update((TABLE, video_id))
            .merge(patch)
            .await
            .context(DatabaseQuerySnafu)?;

        let video = Video::try_from(record.context(EmptyQuerySnafu)?)?;
        tracing::info!(video = %video, "updated video `{}` in database", video_id);
        Ok(video)
    }

    async fn find(&self, video_id: VideoId) -> Result<Option<Video>, DatabaseError> {
        let record: Option<VideoRecord> = self
            .database
            .select((TABLE, video_id))
            .await
            .context(DatabaseQuerySnafu)?;

        record.map(Video::try_from).transpose()
    }
}

/// The embedded engines report a duplicate key as a typed error, remote engines only as query text.
fn record_exists(err: &surrealdb::Error) -> bool {
    match err {
        surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. }) => true,
        surrealdb::Error::Api(surrealdb::error::Api::Query(message)) => {
            message.contains("already exists")
        }
        _ => false,
    }
}
