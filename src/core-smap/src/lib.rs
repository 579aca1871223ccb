pub mod aggregate;
pub mod builder;
pub mod common;
pub mod errors;
pub mod publish;
pub mod record;
pub mod render;
pub mod source;

pub use aggregate::{Aggregation, SitemapOptions, SitemapSet, SkipCounts, aggregate};
pub use common::logging::setup_logging;
pub use errors::{Collection, DestinationError, Error, PublishFailures, Result, SourceError};
pub use publish::{ArtifactName, Destination, PublishReport, RenderedSitemaps, publish};
pub use record::{BaseUrl, ChangeFrequency, Location, Priority, SitemapRef, UrlRecord};
pub use source::{PgSource, SitemapSource, Snapshot, SnapshotSource};
