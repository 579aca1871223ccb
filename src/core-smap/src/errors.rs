//! Error types for sitemap generation.

use std::fmt;

use thiserror::Error;

use crate::publish::ArtifactName;

/// Main error type for sitemap generation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured site URL cannot serve as the base of every location.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A location is not an absolute http(s) URL.
    #[error("Invalid location '{0}'")]
    InvalidLocation(String),

    /// Priority outside of [0.0, 1.0].
    #[error("Priority must be within [0.0, 1.0], got {0}")]
    InvalidPriority(f64),

    /// Reading one of the catalog collections failed. Nothing is published.
    #[error("Failed to fetch {collection}: {source}")]
    SourceFetch {
        collection: Collection,
        #[source]
        source: SourceError,
    },

    /// A rendered document did not parse back to what was rendered. This is a bug.
    #[error("Rendered {artifact} failed verification: {reason}")]
    Render { artifact: ArtifactName, reason: String },

    /// One or more artifacts could not be written. Artifacts that succeeded stay published.
    #[error("Failed to publish {0}")]
    Publish(PublishFailures),

    /// Environment or command-line configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Type alias for Result with the core Error
pub type Result<T> = std::result::Result<T, Error>;

/// The catalog collections a run reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Categories,
    Products,
    BlogPosts,
    Settings,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Categories => "categories",
            Collection::Products => "products",
            Collection::BlogPosts => "blog posts",
            Collection::Settings => "settings",
        };
        write!(f, "{}", name)
    }
}

/// Why a catalog read failed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Db(#[from] diesel::result::Error),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl<E: fmt::Debug> From<deadpool::managed::PoolError<E>> for SourceError {
    fn from(error: deadpool::managed::PoolError<E>) -> Self {
        SourceError::Pool(format!("{:?}", error))
    }
}

/// Why a single artifact write failed.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Write refused: {0}")]
    Refused(String),
}

/// Every artifact that failed to publish in one run, in publication order.
#[derive(Debug)]
pub struct PublishFailures(pub Vec<(ArtifactName, DestinationError)>);

impl PublishFailures {
    pub fn artifacts(&self) -> Vec<ArtifactName> {
        self.0.iter().map(|(name, _)| *name).collect()
    }
}

impl fmt::Display for PublishFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, error)| format!("{} ({})", name, error))
            .collect();
        write!(f, "{} artifact(s): {}", self.0.len(), parts.join(", "))
    }
}
