use super::error::{VideoError, VideoResult};
use super::media::{AudioVideoMedia, ImageMedia};
use super::model::{Rating, Video, VideoId, VideoProps};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

const MAX_SAVE_ATTEMPTS: usize = 5;

/// Raised by [`VideoRepository::save`] when the stored revision moved on since the video was loaded.
#[derive(Debug, Error)]
#[error("Video {0} was modified concurrently")]
pub struct ConcurrentModification(pub VideoId);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>>;

    /// Inserts a new video or updates the revision it was loaded at. Fails with
    /// [`ConcurrentModification`] when that revision is no longer current.
    async fn save(&self, video: Video) -> Result<Video>;

    async fn delete_by_id(&self, id: VideoId) -> Result<()>;
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VideoRow {
    id: Uuid,
    title: String,
    description: String,
    launched_at: i32,
    duration: f64,
    opened: bool,
    published: bool,
    rating: String,
    categories: Vec<Uuid>,
    genres: Vec<Uuid>,
    cast_members: Vec<Uuid>,
    video: Option<Json<AudioVideoMedia>>,
    trailer: Option<Json<AudioVideoMedia>>,
    banner: Option<Json<ImageMedia>>,
    thumbnail: Option<Json<ImageMedia>>,
    thumbnail_half: Option<Json<ImageMedia>>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    version: i64,
}

impl VideoRow {
    fn into_aggregate(self) -> Result<Video> {
        let rating = Rating::of(&self.rating)
            .ok_or_else(|| anyhow!("Unknown rating '{}' stored for video {}", self.rating, self.id))?;

        Ok(Video {
            id: VideoId::from_uuid(self.id),
            props: VideoProps {
                title: self.title,
                description: self.description,
                launched_at: self.launched_at,
                duration: self.duration,
                opened: self.opened,
                published: self.published,
                rating,
                categories: self.categories.into_iter().collect(),
                genres: self.genres.into_iter().collect(),
                cast_members: self.cast_members.into_iter().collect(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            banner: self.banner.map(|m| m.0),
            thumbnail: self.thumbnail.map(|m| m.0),
            thumbnail_half: self.thumbnail_half.map(|m| m.0),
            trailer: self.trailer.map(|m| m.0),
            video: self.video.map(|m| m.0),
            events: Vec::new(),
            version: self.version,
        })
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>("SELECT * FROM videos WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch video {id}"))?;

        row.map(VideoRow::into_aggregate).transpose()
    }

    async fn save(&self, mut video: Video) -> Result<Video> {
        let expected = video.version();

        let query = if expected == 0 {
            bind_columns(
                sqlx::query(
                    r#"
                    INSERT INTO videos (
                        id, title, description, launched_at, duration, opened, published, rating,
                        categories, genres, cast_members,
                        video, trailer, banner, thumbnail, thumbnail_half,
                        created_at, updated_at, version
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, 1)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                ),
                &video,
            )
        } else {
            bind_columns(
                sqlx::query(
                    r#"
                    UPDATE videos SET
                        title = $2,
                        description = $3,
                        launched_at = $4,
                        duration = $5,
                        opened = $6,
                        published = $7,
                        rating = $8,
                        categories = $9,
                        genres = $10,
                        cast_members = $11,
                        video = $12,
                        trailer = $13,
                        banner = $14,
                        thumbnail = $15,
                        thumbnail_half = $16,
                        created_at = $17,
                        updated_at = $18,
                        version = version + 1
                    WHERE id = $1 AND version = $19
                    "#,
                ),
                &video,
            )
            .bind(expected)
        };

        let result = query
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to save video {}", video.id()))?;

        if result.rows_affected() == 0 {
            return Err(ConcurrentModification(video.id()).into());
        }

        video.version = expected + 1;
        Ok(video)
    }

    async fn delete_by_id(&self, id: VideoId) -> Result<()> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete video {id}"))?;

        Ok(())
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

fn bind_columns<'q>(query: PgQuery<'q>, video: &'q Video) -> PgQuery<'q> {
    let props = video.props();
    query
        .bind(video.id().value())
        .bind(&props.title)
        .bind(&props.description)
        .bind(props.launched_at)
        .bind(props.duration)
        .bind(props.opened)
        .bind(props.published)
        .bind(props.rating.as_str())
        .bind(props.categories.iter().copied().collect::<Vec<Uuid>>())
        .bind(props.genres.iter().copied().collect::<Vec<Uuid>>())
        .bind(props.cast_members.iter().copied().collect::<Vec<Uuid>>())
        .bind(video.video().map(Json))
        .bind(video.trailer().map(Json))
        .bind(video.banner().map(Json))
        .bind(video.thumbnail().map(Json))
        .bind(video.thumbnail_half().map(Json))
        .bind(video.created_at())
        .bind(video.updated_at())
}

/// Result of a change applied by [`modify_video`].
pub enum Change<T> {
    Save(T),
    /// Nothing to persist.
    Keep(T),
}

/// Loads the video, applies `apply` and saves it against the loaded revision. A save that
/// loses the race against another writer is retried on a fresh copy.
///
/// Returns `None` when the video does not exist.
pub async fn modify_video<T, F>(
    videos: &dyn VideoRepository,
    id: VideoId,
    mut apply: F,
) -> VideoResult<Option<(Video, T)>>
where
    F: FnMut(&mut Video) -> VideoResult<Change<T>> + Send,
    T: Send,
{
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        let Some(mut video) = videos.find_by_id(id).await.map_err(VideoError::Persistence)? else {
            return Ok(None);
        };

        let value = match apply(&mut video)? {
            Change::Keep(value) => return Ok(Some((video, value))),
            Change::Save(value) => value,
        };

        match videos.save(video).await {
            Ok(saved) => return Ok(Some((saved, value))),
            Err(e) if e.downcast_ref::<ConcurrentModification>().is_some() => {
                warn!("Video {} changed during save (attempt {}/{}), retrying", id, attempt, MAX_SAVE_ATTEMPTS);
            }
            Err(e) => return Err(VideoError::Persistence(e)),
        }
    }

    Err(VideoError::Conflict(id))
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Test double keeping saved aggregates in a map.
    #[derive(Clone, Default)]
    pub(crate) struct InMemoryVideoRepository {
        videos: Arc<Mutex<HashMap<VideoId, Video>>>,
        saves: Arc<Mutex<usize>>,
    }

    impl InMemoryVideoRepository {
        pub(crate) async fn with(videos: impl IntoIterator<Item = Video>) -> Self {
            let repository = Self::default();
            {
                let mut map = repository.videos.lock().await;
                for mut video in videos {
                    video.take_events();
                    video.version += 1;
                    map.insert(video.id(), video);
                }
            }
            repository
        }

        pub(crate) async fn save_count(&self) -> usize {
            *self.saves.lock().await
        }
    }

    #[async_trait]
    impl VideoRepository for InMemoryVideoRepository {
        async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>> {
            Ok(self.videos.lock().await.get(&id).cloned())
        }

        async fn save(&self, mut video: Video) -> Result<Video> {
            let mut map = self.videos.lock().await;
            let current = map.get(&video.id()).map_or(0, Video::version);
            if current != video.version {
                return Err(ConcurrentModification(video.id()).into());
            }

            *self.saves.lock().await += 1;
            video.version += 1;
            let stored = Video {
                events: Vec::new(),
                ..video.clone()
            };
            map.insert(video.id(), stored);
            Ok(video)
        }

        async fn delete_by_id(&self, id: VideoId) -> Result<()> {
            self.videos.lock().await.remove(&id);
            Ok(())
        }
    }
}
