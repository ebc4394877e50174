pub type Result<T> = std::result::Result<T, Error>;

/// Startup failures. Nothing during play is an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ingredient catalog has no entries")]
    EmptyCatalog,
}
