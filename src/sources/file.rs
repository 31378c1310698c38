use crate::core::Playlist;
use crate::error::Result;
use crate::sources::{decode_playlist, PlaylistSource};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Reads a document saved earlier with `yt-dlp -J --flat-playlist <url> > file.json`.
pub struct JsonFileSource;

#[async_trait]
impl PlaylistSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn suitable(&self, input: &str) -> bool {
        let path = Path::new(input);
        path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) && path.is_file()
    }

    async fn fetch(&self, input: &str) -> Result<Playlist> {
        let data = tokio::fs::read(input).await?;
        debug!("Read {} bytes from {}", data.len(), input);
        decode_playlist(&data)
    }
}
