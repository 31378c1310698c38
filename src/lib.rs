pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod sources;
pub mod store;
pub mod utils;

pub use crate::core::{FuzzyRanker, Paginator, Playlist, Video};
pub use error::{Error, Result};
pub use sources::{PlaylistSource, SourceEngine};
pub use store::Store;
