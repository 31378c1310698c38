use crate::error::{Error, Result};
use std::path::PathBuf;
use url::Url;

pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Where a fetched playlist is stored when no path is given.
pub fn database_filename(playlist_title: &str) -> PathBuf {
    let stem = sanitize_filename(playlist_title.trim());
    let stem = if stem.is_empty() { "playlist".to_string() } else { stem };
    PathBuf::from(format!("{}.sqlite", stem))
}

/// Parses `raw` and checks it is an https youtube.com URL.
fn parse_youtube_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e.to_string()))?;
    if url.scheme() != "https" {
        return Err(Error::invalid_url(raw, "expected https"));
    }
    match url.host_str() {
        Some("youtube.com") | Some("www.youtube.com") => Ok(url),
        _ => Err(Error::invalid_url(raw, "not a youtube url")),
    }
}

fn has_query_key(url: &Url, key: &str) -> bool {
    url.query_pairs().any(|(k, _)| k == key)
}

pub fn validate_playlist_url(raw: &str) -> Result<()> {
    let url = parse_youtube_url(raw)?;
    if url.path() != "/playlist" {
        return Err(Error::invalid_url(raw, "not a playlist url"));
    }
    if !has_query_key(&url, "list") {
        return Err(Error::invalid_url(raw, "no playlist id in url"));
    }
    Ok(())
}

/// Feeds such as `/feed/history` behave like playlists for yt-dlp.
pub fn validate_feed_url(raw: &str) -> Result<()> {
    let url = parse_youtube_url(raw)?;
    if !url.path().starts_with("/feed/") {
        return Err(Error::invalid_url(raw, "not a feed url"));
    }
    Ok(())
}

pub fn validate_playlist_or_feed_url(raw: &str) -> Result<()> {
    match (validate_playlist_url(raw), validate_feed_url(raw)) {
        (Err(Error::InvalidUrl { reason: a, .. }), Err(Error::InvalidUrl { reason: b, .. })) if a != b => {
            Err(Error::invalid_url(raw, format!("{}; {}", a, b)))
        }
        (Err(err), Err(_)) => Err(err),
        _ => Ok(()),
    }
}

pub fn validate_video_url(raw: &str) -> Result<()> {
    let url = parse_youtube_url(raw)?;
    if url.path() != "/watch" {
        return Err(Error::invalid_url(raw, "not a video url"));
    }
    if !has_query_key(&url, "v") {
        return Err(Error::invalid_url(raw, "no video id in url"));
    }
    Ok(())
}

/// The `v` parameter of a video URL.
pub fn video_url_id(raw: &str) -> Result<String> {
    validate_video_url(raw)?;
    let url = parse_youtube_url(raw)?;
    url.query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| Error::invalid_url(raw, "no video id in url"))
}
