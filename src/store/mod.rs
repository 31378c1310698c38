use crate::core::{OrderBy, PageSource, Thumbnail, Video};
use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

// Row ids are assigned in insertion order, and videos are inserted in
// playlist order, so `ORDER BY id` reproduces the playlist's own ordering.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        video_id TEXT NOT NULL UNIQUE,
        channel_title TEXT NOT NULL,
        channel_id TEXT NOT NULL,
        uploader_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        thumbnails TEXT NOT NULL,
        view_count INTEGER NOT NULL,
        duration REAL NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

const COLUMNS: &str =
    "video_id, channel_title, channel_id, uploader_id, title, description, thumbnails, view_count, duration";

/// Videos of one playlist, kept in an SQLite file.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening store {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Stores `video` after every video stored so far. Returns false, and
    /// stores nothing, when a video with the same id is already present.
    pub fn create(&self, video: &Video) -> Result<bool> {
        let thumbnails = serde_json::to_string(&video.thumbnails)?;
        let view_count = i64::try_from(video.view_count).unwrap_or(i64::MAX);

        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO videos ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(video_id) DO NOTHING"
            ),
            params![
                &video.id,
                &video.channel.title,
                &video.channel.id,
                &video.channel.alternate_id,
                &video.title,
                &video.description,
                thumbnails,
                view_count,
                video.duration_seconds,
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn find_all(&self) -> Result<Vec<Video>> {
        let mut stmt = self.conn.prepare(&format!("SELECT {COLUMNS} FROM videos ORDER BY id"))?;
        let rows = stmt.query_map([], video_from_row)?;
        collect_rows(rows)
    }

    pub fn find_by_video_id(&self, video_id: &str) -> Result<Option<Video>> {
        let video = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM videos WHERE video_id = ?1"),
                [video_id],
                video_from_row,
            )
            .optional()?;
        video.map(|(video, thumbnails)| attach_thumbnails(video, &thumbnails)).transpose()
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl PageSource for Store {
    fn find(&self, order_by: OrderBy, limit: usize, offset: usize) -> Result<Vec<Video>> {
        let order = match order_by {
            OrderBy::Insertion => "id ASC",
            OrderBy::InsertionDesc => "id DESC",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM videos ORDER BY {order} LIMIT ?1 OFFSET ?2"))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit, offset], video_from_row)?;
        collect_rows(rows)
    }
}

/// Thumbnails are stored as JSON and decoded outside the row callback so a
/// bad value surfaces as malformed input rather than a driver error.
fn video_from_row(row: &Row<'_>) -> rusqlite::Result<(Video, String)> {
    let view_count: i64 = row.get(7)?;
    let mut video = Video {
        id: row.get(0)?,
        title: row.get(4)?,
        description: row.get(5)?,
        view_count: view_count.max(0) as u64,
        duration_seconds: row.get(8)?,
        ..Default::default()
    };
    video.channel.title = row.get(1)?;
    video.channel.id = row.get(2)?;
    video.channel.alternate_id = row.get(3)?;
    Ok((video, row.get(6)?))
}

fn attach_thumbnails(mut video: Video, thumbnails: &str) -> Result<Video> {
    video.thumbnails = serde_json::from_str::<Vec<Thumbnail>>(thumbnails)
        .map_err(|e| Error::MalformedInput(format!("thumbnails of video {}: {}", video.id, e)))?;
    Ok(video)
}

fn collect_rows(rows: impl Iterator<Item = rusqlite::Result<(Video, String)>>) -> Result<Vec<Video>> {
    rows.map(|row| {
        let (video, thumbnails) = row?;
        attach_thumbnails(video, &thumbnails)
    })
    .collect()
}
