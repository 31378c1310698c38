use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The ingestion document could not be decoded, or decoded into something inconsistent.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("no videos match query {query:?}")]
    NoMatch { query: String },

    /// Placeholders that no field of the record can resolve.
    #[error("template has unknown placeholders: {}", .0.join(", "))]
    InvalidTemplate(Vec<String>),

    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The playlist could not be fetched at all.
    #[error("ingestion failed: {0}")]
    Source(String),

    #[error("selector failed: {0}")]
    Selector(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

impl Error {
    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Error::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_lists_names() {
        let err = Error::InvalidTemplate(vec!["Foo".to_string(), "Bar".to_string()]);
        assert_eq!(err.to_string(), "template has unknown placeholders: Foo, Bar");
    }

    #[test]
    fn test_json_errors_are_malformed_input() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::MalformedInput(_)));
    }
}
