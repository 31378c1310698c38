pub mod file;
pub mod ytdlp;

pub use file::JsonFileSource;
pub use ytdlp::YtDlpSource;

use crate::core::Playlist;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

/// Somewhere a playlist document can be fetched from.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn suitable(&self, input: &str) -> bool;
    async fn fetch(&self, input: &str) -> Result<Playlist>;
}

pub struct SourceEngine {
    pub sources: Vec<Box<dyn PlaylistSource>>,
}

impl SourceEngine {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn register_source(&mut self, source: Box<dyn PlaylistSource>) {
        self.sources.push(source);
    }

    pub async fn fetch(&self, input: &str) -> Result<Playlist> {
        for source in &self.sources {
            if source.suitable(input) {
                debug!("Fetching {} with {}", input, source.name());
                return source.fetch(input).await;
            }
        }

        Err(Error::Source(format!("no source can read {:?}", input)))
    }
}

impl Default for SourceEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode_playlist(data: &[u8]) -> Result<Playlist> {
    Ok(serde_json::from_slice(data)?)
}

/// Drops repeated video ids (keeping the first) and reports anything about
/// `playlist` that does not add up. Problems are returned, not raised: a
/// playlist that disagrees with itself is still worth storing.
pub fn reconcile(playlist: &mut Playlist) -> Vec<Error> {
    let mut problems = Vec::new();

    let mut seen = HashSet::new();
    let before = playlist.entries.len();
    playlist.entries.retain(|video| {
        let first = seen.insert(video.id.clone());
        if !first {
            problems.push(Error::MalformedInput(format!(
                "video {} appears more than once in the playlist",
                video.id
            )));
        }
        first
    });

    if playlist.count != before as u64 {
        problems.push(Error::MalformedInput(format!(
            "playlist declares {} videos but lists {}",
            playlist.count, before
        )));
    }

    problems
}
