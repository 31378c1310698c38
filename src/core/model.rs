use crate::core::formatter::{Field, FieldValue, Fields};
use serde::{Deserialize, Deserializer, Serialize};

/// yt-dlp emits `null` for fields it could not resolve (deleted or private
/// entries in a flat playlist), so every scalar falls back to its default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: u32,
}

impl Thumbnail {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Uploader of a video or owner of a playlist.
///
/// Each video carries its own copy, taken when the playlist was fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Display name, e.g. `Mudan`.
    #[serde(rename = "channel", default, deserialize_with = "null_as_default")]
    pub title: String,

    /// e.g. `UCZTgg6AiQkSHtL5Jj0IO6MQ`
    #[serde(rename = "channel_id", default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Handle, e.g. `@Mudan`. Empty for channels without one.
    #[serde(rename = "uploader_id", default, deserialize_with = "null_as_default")]
    pub alternate_id: String,
}

impl Channel {
    pub fn url(&self) -> String {
        if !self.alternate_id.is_empty() {
            return format!("youtube.com/{}", self.alternate_id);
        }
        format!("youtube.com/channel/{}", self.id)
    }
}

impl Fields for Channel {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("ChannelTitle", FieldValue::Str(self.title.clone())),
            Field::new("ChannelId", FieldValue::Str(self.id.clone())),
            Field::new("UploaderId", FieldValue::Str(self.alternate_id.clone())),
            Field::new("ChannelUrl", FieldValue::Str(self.url())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(flatten)]
    pub channel: Channel,

    /// e.g. `rlHBvH87G14`
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnails: Vec<Thumbnail>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub view_count: u64,

    /// Length in seconds.
    #[serde(rename = "duration", default, deserialize_with = "null_as_default")]
    pub duration_seconds: f64,
}

impl Video {
    pub fn url(&self) -> String {
        format!("youtube.com/watch?v={}", self.id)
    }

    /// Largest thumbnail by pixel area; the first one wins a tie.
    pub fn biggest_thumbnail(&self) -> Thumbnail {
        let mut biggest = Thumbnail::default();
        for thumbnail in &self.thumbnails {
            if thumbnail.area() > biggest.area() {
                biggest = thumbnail.clone();
            }
        }
        biggest
    }

    /// Length as `[D:][HH:]MM:SS`.
    ///
    /// Days are not padded and only shown when non-zero; hours are shown
    /// whenever days are, or when they are non-zero themselves.
    pub fn duration_string(&self) -> String {
        // `as` saturates: negative and NaN durations become zero.
        let total = self.duration_seconds as u64;

        let days = total / 86_400;
        let hours = total % 86_400 / 3_600;
        let minutes = total % 3_600 / 60;
        let seconds = total % 60;

        let clock = format!("{:02}:{:02}", minutes, seconds);
        if days > 0 {
            format!("{}:{:02}:{}", days, hours, clock)
        } else if hours > 0 {
            format!("{:02}:{}", hours, clock)
        } else {
            clock
        }
    }
}

impl Fields for Video {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        Field::embed(&mut fields, &self.channel);
        fields.extend([
            Field::new("VideoId", FieldValue::Str(self.id.clone())),
            Field::new("Title", FieldValue::Str(self.title.clone())),
            Field::new("Description", FieldValue::Str(self.description.clone())),
            Field::new("Thumbnails", FieldValue::Composite),
            Field::new("ViewCount", FieldValue::Uint(self.view_count)),
            Field::new("Duration", FieldValue::Float(self.duration_seconds)),
        ]);
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Public,
    Private,
    Unlisted,
    /// Anything else yt-dlp reports, e.g. `needs_auth`.
    #[serde(other)]
    Other,
}

/// One fetched playlist. Never stored itself; only its entries are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub availability: Option<Availability>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Count as declared by the site; may disagree with `entries.len()`.
    #[serde(rename = "playlist_count", default, deserialize_with = "null_as_default")]
    pub count: u64,

    /// e.g. `20231125`
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_date: String,

    #[serde(flatten)]
    pub channel: Channel,

    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<Video>,
}
