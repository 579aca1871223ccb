pub mod errors;

use std::time::Duration;

use chrono::{DateTime, Utc};
use core_smap::{
    ArtifactName, BaseUrl, Collection, Destination, RenderedSitemaps, SitemapOptions, SitemapSource, SkipCounts,
    aggregate, publish,
};

pub use errors::Error;

/// Default log filter for the binary.
pub const DEFAULT_LOG_SETTINGS: &str = "cron_smap=info,core_smap=info";

/// How one run behaves.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Used instead of the stored site URL when set.
    pub base_url: Option<String>,
    /// Fetch, build, render and verify, but write nothing.
    pub dry_run: bool,
    /// Pins the index timestamps. Defaults to the current time.
    pub generated_at: Option<DateTime<Utc>>,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub base_url: String,
    pub categories: usize,
    pub products: usize,
    pub blog: usize,
    pub skipped: SkipCounts,
    /// Empty on a dry run.
    pub published: Vec<ArtifactName>,
    pub bytes: usize,
    pub dry_run: bool,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} URLs for {} ({} categories, {} products, {} blog), {} skipped",
            self.categories + self.products + self.blog,
            self.base_url,
            self.categories,
            self.products,
            self.blog,
            self.skipped.total()
        )?;
        if self.dry_run {
            write!(f, ", dry run: nothing published")
        } else {
            write!(f, ", published {} artifacts ({} bytes)", self.published.len(), self.bytes)
        }
    }
}

/// Regenerates the full sitemap set from `source` and publishes it to `destination`.
///
/// A fetch failure or a render defect fails the run before anything is written. A failed
/// write does not stop the other artifacts from being attempted.
pub async fn run<S, D>(source: &S, destination: &D, options: &RunOptions) -> Result<RunSummary, Error>
where
    S: SitemapSource + ?Sized,
    D: Destination + ?Sized,
{
    let base_url = resolve_base_url(source, options.base_url.as_deref()).await?;
    tracing::info!("Generating sitemaps for {}", base_url);

    let mut sitemap_options = SitemapOptions::builder();
    if let Some(generated_at) = options.generated_at {
        sitemap_options = sitemap_options.generated_at(generated_at);
    }
    let aggregation = aggregate(source, &base_url, &sitemap_options.build()).await?;

    let rendered = RenderedSitemaps::render(&aggregation.set)?;
    tracing::debug!(
        "Rendered {} URLs across {} artifacts ({} bytes)",
        rendered.url_count(),
        rendered.iter().count(),
        rendered.total_bytes()
    );

    let (published, bytes) = if options.dry_run {
        tracing::info!("Dry run: skipping publish to {}", destination.describe());
        (vec![], 0)
    } else {
        let report = publish(destination, &rendered).await?;
        (report.published, report.bytes)
    };

    Ok(RunSummary {
        base_url: base_url.to_string(),
        categories: aggregation.set.categories.len(),
        products: aggregation.set.products.len(),
        blog: aggregation.set.blog.len(),
        skipped: aggregation.skipped,
        published,
        bytes,
        dry_run: options.dry_run,
    })
}

/// Same as `run`, abandoned with [`Error::DeadlineExceeded`] once `deadline` passes.
/// Writes already issued when the deadline passes are not rolled back.
pub async fn run_with_deadline<S, D>(
    source: &S,
    destination: &D,
    options: &RunOptions,
    deadline: Duration,
) -> Result<RunSummary, Error>
where
    S: SitemapSource + ?Sized,
    D: Destination + ?Sized,
{
    tokio::time::timeout(deadline, run(source, destination, options))
        .await
        .map_err(|_| Error::DeadlineExceeded(deadline))?
}

/// The override wins; otherwise the stored site URL is used.
async fn resolve_base_url<S: SitemapSource + ?Sized>(source: &S, override_url: Option<&str>) -> Result<BaseUrl, Error> {
    if let Some(url) = override_url {
        return Ok(BaseUrl::new(url)?);
    }

    let stored = source
        .fetch_site_url()
        .await
        .map_err(|source| core_smap::Error::SourceFetch {
            collection: Collection::Settings,
            source,
        })?;

    match stored {
        Some(url) if !url.trim().is_empty() => Ok(BaseUrl::new(&url)?),
        _ => Err(Error::MissingSiteUrl),
    }
}
