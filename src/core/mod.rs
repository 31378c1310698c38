pub mod formatter;
pub mod fzf;
pub mod model;
pub mod paginator;
pub mod ranker;

pub use formatter::{format, format_videos, Field, FieldValue, Fields, VideoRow, DEFAULT_TEMPLATE};
pub use fzf::FzfSelector;
pub use model::{Availability, Channel, Playlist, Thumbnail, Video};
pub use paginator::{OrderBy, PageSource, Paginator};
pub use ranker::{search_videos, FuzzyRanker, Matcher, SearchField, Strategy};
