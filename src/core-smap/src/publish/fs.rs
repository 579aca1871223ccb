//! Writes artifacts into a directory served as the site's public root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::DestinationError;
use crate::publish::Destination;

#[derive(Debug, Clone)]
pub struct FsDestination {
    dir: PathBuf,
}

impl FsDestination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsDestination { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Destination for FsDestination {
    /// Writes to a temporary sibling and renames it over the target, so readers never see a
    /// partially written document.
    async fn put(&self, key: &str, body: &str) -> Result<(), DestinationError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.starts_with('.') {
            return Err(DestinationError::Refused(format!("'{}' is not a plain file name", key)));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(key);
        let temp = self.dir.join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&temp, body).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("directory '{}'", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("smap-fs-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_creates_dir_and_replaces_file() {
        let dir = temp_dir();
        let destination = FsDestination::new(&dir);

        destination.put("sitemap.xml", "first").await.unwrap();
        destination.put("sitemap.xml", "second").await.unwrap();

        let content = tokio::fs::read_to_string(dir.join("sitemap.xml")).await.unwrap();
        assert_eq!(content, "second");

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["sitemap.xml"]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_refuses_paths() {
        let destination = FsDestination::new(temp_dir());
        assert!(matches!(
            destination.put("../escape.xml", "x").await,
            Err(DestinationError::Refused(_))
        ));
        assert!(matches!(destination.put("", "x").await, Err(DestinationError::Refused(_))));
    }
}
