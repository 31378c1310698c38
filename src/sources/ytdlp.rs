use crate::core::Playlist;
use crate::error::{Error, Result};
use crate::sources::{decode_playlist, PlaylistSource};
use crate::utils::validate_playlist_or_feed_url;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Fetches playlist metadata by running yt-dlp. Only metadata is
/// requested; no media is downloaded.
pub struct YtDlpSource {
    program: String,
    /// Show yt-dlp's own progress output on stderr.
    verbose: bool,
}

impl YtDlpSource {
    pub fn new(program: impl Into<String>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    pub fn args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "-J".to_string(),
            "--flat-playlist".to_string(),
            "--ignore-no-formats-error".to_string(),
        ];
        if self.verbose {
            args.push("--verbose".to_string());
        }
        args
    }
}

#[async_trait]
impl PlaylistSource for YtDlpSource {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn suitable(&self, input: &str) -> bool {
        validate_playlist_or_feed_url(input).is_ok()
    }

    async fn fetch(&self, input: &str) -> Result<Playlist> {
        validate_playlist_or_feed_url(input)?;

        info!("Running {} for {}", self.program, input);
        let output = Command::new(&self.program)
            .args(self.args(input))
            .stdin(Stdio::null())
            .stderr(if self.verbose { Stdio::inherit() } else { Stdio::null() })
            .output()
            .await
            .map_err(|e| Error::Source(format!("could not start {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(Error::Source(format!("{} exited with {}", self.program, output.status)));
        }

        debug!("{} wrote {} bytes", self.program, output.stdout.len());
        decode_playlist(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let source = YtDlpSource::new("yt-dlp", false);
        assert_eq!(
            source.args("https://www.youtube.com/playlist?list=WL"),
            vec![
                "https://www.youtube.com/playlist?list=WL",
                "-J",
                "--flat-playlist",
                "--ignore-no-formats-error"
            ]
        );
        assert!(YtDlpSource::new("yt-dlp", true).args("u").contains(&"--verbose".to_string()));
    }

    #[test]
    fn test_suitable() {
        let source = YtDlpSource::new("yt-dlp", false);
        assert!(source.suitable("https://www.youtube.com/playlist?list=WL"));
        assert!(source.suitable("https://www.youtube.com/feed/history"));
        assert!(!source.suitable("playlist.json"));
    }
}
