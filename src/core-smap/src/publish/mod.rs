//! Rendering a sitemap set into its four artifacts and writing them to a destination.

pub mod fs;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod object_storage;

use std::fmt;

use async_trait::async_trait;
use futures::future::join_all;

pub use fs::FsDestination;
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MemoryDestination;
pub use object_storage::ObjectStorageDestination;

use crate::aggregate::SitemapSet;
use crate::errors::{DestinationError, Error, PublishFailures, Result};
use crate::record::{SitemapRef, UrlRecord, format_timestamp};
use crate::render::{ParsedDocument, parse_document, render_sitemap, render_sitemap_index};

/// Protocol limit on URLs per sitemap document.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Protocol limit on the uncompressed size of one sitemap document.
pub const MAX_SITEMAP_BYTES: usize = 50 * 1024 * 1024;

/// The four artifacts of a run. Keys are fixed file names at the destination root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactName {
    Index,
    Categories,
    Products,
    Blog,
}

impl ArtifactName {
    /// Sub-sitemaps in publication and index order.
    pub const SUB_SITEMAPS: [ArtifactName; 3] = [ArtifactName::Categories, ArtifactName::Products, ArtifactName::Blog];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactName::Index => "sitemap.xml",
            ArtifactName::Categories => "sitemap-categories.xml",
            ArtifactName::Products => "sitemap-products.xml",
            ArtifactName::Blog => "sitemap-blog.xml",
        }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Where artifacts go. Each `put` replaces the whole object under `key`.
#[async_trait]
pub trait Destination: Send + Sync {
    async fn put(&self, key: &str, body: &str) -> std::result::Result<(), DestinationError>;

    /// Human readable target, for logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<D: Destination + ?Sized> Destination for Box<D> {
    async fn put(&self, key: &str, body: &str) -> std::result::Result<(), DestinationError> {
        (**self).put(key, body).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// One rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub name: ArtifactName,
    pub body: String,
    /// `<url>` entries, or `<sitemap>` entries for the index.
    pub entries: usize,
}

/// All four documents of a run, rendered and verified. Sub-sitemaps first, index last.
#[derive(Debug, Clone)]
pub struct RenderedSitemaps {
    artifacts: Vec<RenderedArtifact>,
}

impl RenderedSitemaps {
    /// Renders every document and reads each one back. A document that does not parse back to
    /// the records it was rendered from fails the run before anything is written.
    pub fn render(set: &SitemapSet) -> Result<Self> {
        let mut artifacts = Vec::with_capacity(4);

        for name in ArtifactName::SUB_SITEMAPS {
            let records = set.records(name).unwrap_or_default();
            let body = render_sitemap(records);
            verify_sitemap(name, &body, records)?;
            warn_on_protocol_limits(name, &body, records.len());
            artifacts.push(RenderedArtifact {
                name,
                body,
                entries: records.len(),
            });
        }

        let refs = set.index_refs()?;
        let body = render_sitemap_index(&refs);
        verify_index(&body, &refs)?;
        artifacts.push(RenderedArtifact {
            name: ArtifactName::Index,
            body,
            entries: refs.len(),
        });

        Ok(RenderedSitemaps { artifacts })
    }

    pub fn get(&self, name: ArtifactName) -> Option<&RenderedArtifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedArtifact> {
        self.artifacts.iter()
    }

    /// URL entries across the three sub-sitemaps.
    pub fn url_count(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|artifact| artifact.name != ArtifactName::Index)
            .map(|artifact| artifact.entries)
            .sum()
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|artifact| artifact.body.len()).sum()
    }
}

fn parse_rendered(name: ArtifactName, body: &str, expected_root: &str) -> Result<ParsedDocument> {
    let parsed = parse_document(body).map_err(|reason| Error::Render { artifact: name, reason })?;
    if parsed.root != expected_root {
        return Err(Error::Render {
            artifact: name,
            reason: format!("root element is <{}>, expected <{}>", parsed.root, expected_root),
        });
    }
    Ok(parsed)
}

fn verify_sitemap(name: ArtifactName, body: &str, records: &[UrlRecord]) -> Result<()> {
    let parsed = parse_rendered(name, body, "urlset")?;
    if parsed.entries.len() != records.len() {
        return Err(Error::Render {
            artifact: name,
            reason: format!("{} entries read back, {} rendered", parsed.entries.len(), records.len()),
        });
    }
    for (entry, record) in parsed.entries.iter().zip(records) {
        if entry.loc != record.location.as_str() {
            return Err(Error::Render {
                artifact: name,
                reason: format!("location '{}' read back as '{}'", record.location, entry.loc),
            });
        }
    }
    Ok(())
}

fn verify_index(body: &str, refs: &[SitemapRef]) -> Result<()> {
    let name = ArtifactName::Index;
    let parsed = parse_rendered(name, body, "sitemapindex")?;
    if parsed.entries.len() != ArtifactName::SUB_SITEMAPS.len() {
        return Err(Error::Render {
            artifact: name,
            reason: format!("index lists {} sitemaps", parsed.entries.len()),
        });
    }
    for (entry, sitemap) in parsed.entries.iter().zip(refs) {
        let lastmod = format_timestamp(&sitemap.last_modified);
        if entry.loc != sitemap.location.as_str() || entry.lastmod.as_deref() != Some(lastmod.as_str()) {
            return Err(Error::Render {
                artifact: name,
                reason: format!("reference to '{}' read back as '{}'", sitemap.location, entry.loc),
            });
        }
    }
    Ok(())
}

/// Logs a warning for each protocol limit the document exceeds. True if any was exceeded.
fn warn_on_protocol_limits(name: ArtifactName, body: &str, urls: usize) -> bool {
    let too_many_urls = urls > MAX_URLS_PER_SITEMAP;
    let too_large = body.len() > MAX_SITEMAP_BYTES;
    if too_many_urls {
        tracing::warn!(
            "{} lists {} URLs, above the protocol limit of {}",
            name,
            urls,
            MAX_URLS_PER_SITEMAP
        );
    }
    if too_large {
        tracing::warn!(
            "{} is {} bytes, above the protocol limit of {}",
            name,
            body.len(),
            MAX_SITEMAP_BYTES
        );
    }
    too_many_urls || too_large
}

/// What a publish wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub published: Vec<ArtifactName>,
    pub bytes: usize,
}

/// Writes the three sub-sitemaps concurrently, then the index.
///
/// Every artifact is attempted even when an earlier one fails; a failed write leaves whatever
/// the previous run wrote for that key. Any failure is reported as [`Error::Publish`].
pub async fn publish<D: Destination + ?Sized>(destination: &D, rendered: &RenderedSitemaps) -> Result<PublishReport> {
    let target = destination.describe();
    let mut published = Vec::with_capacity(4);
    let mut failures = Vec::new();
    let mut bytes = 0;

    let sub_sitemaps: Vec<&RenderedArtifact> = rendered
        .iter()
        .filter(|artifact| artifact.name != ArtifactName::Index)
        .collect();
    let results = join_all(sub_sitemaps.iter().map(|artifact| put_artifact(destination, artifact))).await;

    let index = rendered.get(ArtifactName::Index);
    let index_result = match index {
        Some(artifact) => Some(put_artifact(destination, artifact).await),
        None => None,
    };

    let attempted = sub_sitemaps.into_iter().zip(results).chain(index.zip(index_result));
    for (artifact, result) in attempted {
        match result {
            Ok(()) => {
                tracing::debug!("Wrote {} ({} bytes) to {}", artifact.name, artifact.body.len(), target);
                bytes += artifact.body.len();
                published.push(artifact.name);
            }
            Err(e) => {
                tracing::error!("Failed to write {} to {}: {}", artifact.name, target, e);
                failures.push((artifact.name, e));
            }
        }
    }

    if !failures.is_empty() {
        return Err(Error::Publish(PublishFailures(failures)));
    }

    tracing::info!("Published {} artifacts ({} bytes) to {}", published.len(), bytes, target);
    Ok(PublishReport { published, bytes })
}

async fn put_artifact<D: Destination + ?Sized>(
    destination: &D,
    artifact: &RenderedArtifact,
) -> std::result::Result<(), DestinationError> {
    destination.put(artifact.name.file_name(), &artifact.body).await
}
