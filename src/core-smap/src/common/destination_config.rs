use std::path::PathBuf;

use crate::errors::{Error, Result};
use crate::publish::object_storage::{DEFAULT_BUCKET, DEFAULT_CACHE_CONTROL_S};
use crate::publish::{Destination, FsDestination, ObjectStorageDestination};

pub const DEFAULT_OUTPUT_DIR: &str = "public";

/// Where a run publishes, as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationConfig {
    Filesystem {
        output_dir: PathBuf,
    },
    ObjectStorage {
        storage_url: String,
        bucket: String,
        service_key: String,
        cache_control_s: u64,
    },
}

impl DestinationConfig {
    /// Reads SITEMAP_DESTINATION (`fs` or `object-storage`, default `fs`) and the variables the
    /// chosen destination needs. `output_dir` takes precedence over SITEMAP_OUTPUT_DIR.
    pub fn from_env(output_dir: Option<PathBuf>) -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok(), output_dir)
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>, output_dir: Option<PathBuf>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let kind = var("SITEMAP_DESTINATION").unwrap_or_else(|| "fs".to_string());
        match kind.to_lowercase().as_str() {
            "fs" | "filesystem" => Ok(DestinationConfig::Filesystem {
                output_dir: output_dir
                    .or_else(|| var("SITEMAP_OUTPUT_DIR").map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            }),
            "object-storage" | "storage" => {
                let storage_url = var("STORAGE_URL")
                    .ok_or_else(|| Error::Config("STORAGE_URL is required for object storage".to_string()))?;
                url::Url::parse(&storage_url)
                    .map_err(|e| Error::Config(format!("STORAGE_URL '{}' is not a URL: {}", storage_url, e)))?;
                let service_key = var("STORAGE_SERVICE_KEY")
                    .ok_or_else(|| Error::Config("STORAGE_SERVICE_KEY is required for object storage".to_string()))?;
                let cache_control_s = match var("SITEMAP_CACHE_CONTROL_S") {
                    Some(v) => v
                        .parse::<u64>()
                        .map_err(|e| Error::Config(format!("SITEMAP_CACHE_CONTROL_S must be a number: {}", e)))?,
                    None => DEFAULT_CACHE_CONTROL_S,
                };
                Ok(DestinationConfig::ObjectStorage {
                    storage_url,
                    bucket: var("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                    service_key,
                    cache_control_s,
                })
            }
            other => Err(Error::Config(format!(
                "SITEMAP_DESTINATION must be 'fs' or 'object-storage', got '{}'",
                other
            ))),
        }
    }

    pub fn into_destination(self) -> Result<Box<dyn Destination>> {
        match self {
            DestinationConfig::Filesystem { output_dir } => Ok(Box::new(FsDestination::new(output_dir))),
            DestinationConfig::ObjectStorage {
                storage_url,
                bucket,
                service_key,
                cache_control_s,
            } => {
                let destination =
                    ObjectStorageDestination::with_default_client(&storage_url, &bucket, &service_key, cache_control_s)
                        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
                Ok(Box::new(destination))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_to_public_dir() {
        let config = DestinationConfig::from_vars(vars(&[]), None).unwrap();
        assert_eq!(config, DestinationConfig::Filesystem {
            output_dir: PathBuf::from("public")
        });
    }

    #[test]
    fn test_output_dir_precedence() {
        let config = DestinationConfig::from_vars(vars(&[("SITEMAP_OUTPUT_DIR", "/srv/www")]), None).unwrap();
        assert_eq!(config, DestinationConfig::Filesystem {
            output_dir: PathBuf::from("/srv/www")
        });

        let config =
            DestinationConfig::from_vars(vars(&[("SITEMAP_OUTPUT_DIR", "/srv/www")]), Some(PathBuf::from("out")))
                .unwrap();
        assert_eq!(config, DestinationConfig::Filesystem {
            output_dir: PathBuf::from("out")
        });
    }

    #[test]
    fn test_object_storage() {
        let config = DestinationConfig::from_vars(
            vars(&[
                ("SITEMAP_DESTINATION", "object-storage"),
                ("STORAGE_URL", "https://storage.example.com/storage/v1"),
                ("STORAGE_SERVICE_KEY", "secret"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config, DestinationConfig::ObjectStorage {
            storage_url: "https://storage.example.com/storage/v1".to_string(),
            bucket: "sitemaps".to_string(),
            service_key: "secret".to_string(),
            cache_control_s: 3600,
        });
        assert!(config.into_destination().is_ok());
    }

    #[test]
    fn test_object_storage_requires_credentials() {
        let missing_key = DestinationConfig::from_vars(
            vars(&[
                ("SITEMAP_DESTINATION", "object-storage"),
                ("STORAGE_URL", "https://storage.example.com"),
            ]),
            None,
        );
        assert!(matches!(missing_key, Err(Error::Config(_))));

        let bad_url = DestinationConfig::from_vars(
            vars(&[
                ("SITEMAP_DESTINATION", "object-storage"),
                ("STORAGE_URL", "not a url"),
                ("STORAGE_SERVICE_KEY", "secret"),
            ]),
            None,
        );
        assert!(matches!(bad_url, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_destination() {
        let config = DestinationConfig::from_vars(vars(&[("SITEMAP_DESTINATION", "ftp")]), None);
        assert!(matches!(config, Err(Error::Config(_))));
    }
}
