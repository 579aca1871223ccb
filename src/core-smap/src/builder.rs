//! Maps catalog entities onto URL records.
//!
//! Every function here is pure. An entity that cannot produce a well-formed location
//! is reported as a [`SkipReason`] and left out of the output; it never fails the run.

use std::fmt;

use data_model_smap::models::{BlogPostEntry, CategoryEntry, ProductEntry};

use crate::record::{BaseUrl, ChangeFrequency, Location, Priority, UrlRecord};

pub const CATEGORY_PRIORITY: Priority = Priority::constant(0.8);
pub const PRODUCT_PRIORITY: Priority = Priority::constant(0.9);
pub const BLOG_POST_PRIORITY: Priority = Priority::constant(0.7);

/// A fixed page of the site that is always listed in the categories document.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPage {
    /// Absolute path below the base URL. Empty for the site root.
    pub path: &'static str,
    pub change_frequency: ChangeFrequency,
    pub priority: Priority,
}

const fn page(path: &'static str, change_frequency: ChangeFrequency, priority: f64) -> StaticPage {
    StaticPage {
        path,
        change_frequency,
        priority: Priority::constant(priority),
    }
}

/// Home, catalog, sale, blog, about, contact and calculators, in that order.
pub const DEFAULT_STATIC_PAGES: [StaticPage; 7] = [
    page("", ChangeFrequency::Daily, 1.0),
    page("/catalog", ChangeFrequency::Daily, 0.9),
    page("/sale", ChangeFrequency::Daily, 0.9),
    page("/blog", ChangeFrequency::Daily, 0.8),
    page("/about", ChangeFrequency::Monthly, 0.5),
    page("/contact", ChangeFrequency::Monthly, 0.5),
    page("/calculators", ChangeFrequency::Monthly, 0.6),
];

/// An entity that can be listed in a sitemap.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    StaticPage(&'a StaticPage),
    Category(&'a CategoryEntry),
    Product(&'a ProductEntry),
    BlogPost(&'a BlogPostEntry),
}

/// Why an entity was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A slug (or id) that would leave a hole in the path.
    MalformedSlug { kind: &'static str, value: String },
    /// The product's category join did not resolve.
    UnresolvedCategory { product_id: String },
    /// Drafts are never listed.
    Unpublished { slug: String },
    /// The assembled string is not an absolute URL.
    InvalidLocation(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedSlug { kind, value } => write!(f, "malformed {} '{}'", kind, value),
            SkipReason::UnresolvedCategory { product_id } => {
                write!(f, "product '{}' has no resolvable category", product_id)
            }
            SkipReason::Unpublished { slug } => write!(f, "blog post '{}' is not published", slug),
            SkipReason::InvalidLocation(location) => write!(f, "invalid location '{}'", location),
        }
    }
}

/// Converts one entity into its URL record.
pub fn build(entity: Entity<'_>, base_url: &BaseUrl) -> Result<UrlRecord, SkipReason> {
    match entity {
        Entity::StaticPage(page) => static_page_record(page, base_url),
        Entity::Category(category) => category_record(category, base_url),
        Entity::Product(product) => product_record(product, base_url),
        Entity::BlogPost(post) => blog_post_record(post, base_url),
    }
}

fn static_page_record(page: &StaticPage, base_url: &BaseUrl) -> Result<UrlRecord, SkipReason> {
    Ok(UrlRecord::new(location(base_url.join(page.path))?)
        .change_frequency(page.change_frequency)
        .priority(page.priority))
}

fn category_record(category: &CategoryEntry, base_url: &BaseUrl) -> Result<UrlRecord, SkipReason> {
    let slug = path_segment("category slug", &category.slug)?;
    Ok(UrlRecord::new(location(base_url.join(&format!("/category/{}", slug)))?)
        .last_modified(category.updated_at)
        .change_frequency(ChangeFrequency::Daily)
        .priority(CATEGORY_PRIORITY))
}

fn product_record(product: &ProductEntry, base_url: &BaseUrl) -> Result<UrlRecord, SkipReason> {
    let category_slug = product
        .category_slug
        .as_deref()
        .ok_or_else(|| SkipReason::UnresolvedCategory {
            product_id: product.id.clone(),
        })?;
    let category_slug = path_segment("category slug", category_slug)?;
    let product_id = path_segment("product id", &product.id)?;

    let path = format!("/category/{}/product/{}", category_slug, product_id);
    Ok(UrlRecord::new(location(base_url.join(&path))?)
        .last_modified(product.updated_at)
        .change_frequency(ChangeFrequency::Daily)
        .priority(PRODUCT_PRIORITY))
}

fn blog_post_record(post: &BlogPostEntry, base_url: &BaseUrl) -> Result<UrlRecord, SkipReason> {
    if !post.is_published {
        return Err(SkipReason::Unpublished {
            slug: post.slug.clone(),
        });
    }
    let slug = path_segment("blog slug", &post.slug)?;
    Ok(UrlRecord::new(location(base_url.join(&format!("/blog/{}", slug)))?)
        .last_modified(post.last_modified())
        .change_frequency(ChangeFrequency::Weekly)
        .priority(BLOG_POST_PRIORITY))
}

/// A slug must be non-empty, stay within a single path segment and carry no control characters
/// (most of which XML 1.0 cannot represent at all).
fn path_segment<'a>(kind: &'static str, value: &'a str) -> Result<&'a str, SkipReason> {
    if value.trim().is_empty()
        || value.contains('/')
        || value.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        Err(SkipReason::MalformedSlug {
            kind,
            value: value.to_string(),
        })
    } else {
        Ok(value)
    }
}

fn location(raw: String) -> Result<Location, SkipReason> {
    Location::new(raw).map_err(|e| match e {
        crate::Error::InvalidLocation(raw) => SkipReason::InvalidLocation(raw),
        other => SkipReason::InvalidLocation(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn base() -> BaseUrl {
        BaseUrl::new("https://rusdecor.info/").unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_category_record() {
        let category = CategoryEntry {
            slug: "sofas".to_string(),
            updated_at: at(15),
        };
        let record = build(Entity::Category(&category), &base()).unwrap();
        assert_eq!(record.location.as_str(), "https://rusdecor.info/category/sofas");
        assert_eq!(record.last_modified, Some(at(15)));
        assert_eq!(record.change_frequency, Some(ChangeFrequency::Daily));
        assert_eq!(record.priority, Some(CATEGORY_PRIORITY));
    }

    #[test]
    fn test_product_record() {
        let product = ProductEntry {
            id: "abc123".to_string(),
            updated_at: at(16),
            category_slug: Some("sofas".to_string()),
        };
        let record = build(Entity::Product(&product), &base()).unwrap();
        assert_eq!(
            record.location.as_str(),
            "https://rusdecor.info/category/sofas/product/abc123"
        );
        assert_eq!(record.last_modified, Some(at(16)));
        assert_eq!(record.priority, Some(PRODUCT_PRIORITY));
    }

    #[test]
    fn test_product_without_category_is_skipped() {
        let product = ProductEntry {
            id: "orphan".to_string(),
            updated_at: at(16),
            category_slug: None,
        };
        assert_eq!(
            build(Entity::Product(&product), &base()),
            Err(SkipReason::UnresolvedCategory {
                product_id: "orphan".to_string()
            })
        );
    }

    #[test]
    fn test_product_with_empty_category_slug_is_skipped() {
        let product = ProductEntry {
            id: "abc123".to_string(),
            updated_at: at(16),
            category_slug: Some(String::new()),
        };
        assert!(matches!(
            build(Entity::Product(&product), &base()),
            Err(SkipReason::MalformedSlug { .. })
        ));
    }

    #[test]
    fn test_blog_post_uses_updated_then_published() {
        let mut post = BlogPostEntry {
            slug: "hello-world".to_string(),
            published_at: at(10),
            updated_at: None,
            is_published: true,
        };
        let record = build(Entity::BlogPost(&post), &base()).unwrap();
        assert_eq!(record.location.as_str(), "https://rusdecor.info/blog/hello-world");
        assert_eq!(record.last_modified, Some(at(10)));
        assert_eq!(record.change_frequency, Some(ChangeFrequency::Weekly));

        post.updated_at = Some(at(20));
        let record = build(Entity::BlogPost(&post), &base()).unwrap();
        assert_eq!(record.last_modified, Some(at(20)));
    }

    #[test]
    fn test_unpublished_blog_post_is_skipped() {
        let post = BlogPostEntry {
            slug: "draft".to_string(),
            published_at: at(10),
            updated_at: None,
            is_published: false,
        };
        assert_eq!(
            build(Entity::BlogPost(&post), &base()),
            Err(SkipReason::Unpublished {
                slug: "draft".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_slugs_are_skipped() {
        for slug in ["", "   ", "a/b", "two words"] {
            let category = CategoryEntry {
                slug: slug.to_string(),
                updated_at: at(1),
            };
            assert!(
                matches!(
                    build(Entity::Category(&category), &base()),
                    Err(SkipReason::MalformedSlug { .. })
                ),
                "slug '{}' should be skipped",
                slug
            );
        }
    }

    #[test]
    fn test_control_characters_are_malformed() {
        let category = CategoryEntry {
            slug: "sof\u{1}as".to_string(),
            updated_at: at(1),
        };
        assert_eq!(
            build(Entity::Category(&category), &base()),
            Err(SkipReason::MalformedSlug {
                kind: "category slug",
                value: "sof\u{1}as".to_string(),
            })
        );

        let product = ProductEntry {
            id: "abc\u{1f}123".to_string(),
            updated_at: at(1),
            category_slug: Some("sofas".to_string()),
        };
        assert!(matches!(
            build(Entity::Product(&product), &base()),
            Err(SkipReason::MalformedSlug { kind: "product id", .. })
        ));

        let post = BlogPostEntry {
            slug: "hello\u{7f}".to_string(),
            published_at: at(1),
            updated_at: None,
            is_published: true,
        };
        assert!(matches!(
            build(Entity::BlogPost(&post), &base()),
            Err(SkipReason::MalformedSlug { .. })
        ));
    }

    #[test]
    fn test_static_pages_have_no_lastmod() {
        let records: Vec<UrlRecord> = DEFAULT_STATIC_PAGES
            .iter()
            .map(|page| build(Entity::StaticPage(page), &base()).unwrap())
            .collect();

        assert_eq!(records.len(), 7);
        assert_eq!(records[0].location.as_str(), "https://rusdecor.info");
        assert_eq!(records[0].priority, Some(Priority::HIGHEST));
        assert_eq!(records[6].location.as_str(), "https://rusdecor.info/calculators");
        assert!(records.iter().all(|r| r.last_modified.is_none()));
    }
}
