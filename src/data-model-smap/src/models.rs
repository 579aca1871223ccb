use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key of the `settings` row holding the public site URL.
pub const SITE_URL_KEY: &str = "site_url";

// categories table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// products table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Owning category. `None` once the category is deleted.
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// blog_posts table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::blog_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// settings table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Setting {
    pub key: String,
    pub value: String,
}

// Read-only projections consumed by sitemap generation.
// These are the only fields a sitemap needs from each collection.

/// A category as seen by the sitemap: its slug and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its owning category's slug.
/// `category_slug` is `None` when the join did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub category_slug: Option<String>,
}

/// A blog post with the fields that decide whether, and how, it is listed.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct BlogPostEntry {
    pub slug: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_published: bool,
}

impl BlogPostEntry {
    /// Last edit if the post was ever edited, otherwise its publication time.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.published_at)
    }
}

impl From<&Category> for CategoryEntry {
    fn from(category: &Category) -> Self {
        CategoryEntry {
            slug: category.slug.clone(),
            updated_at: category.updated_at,
        }
    }
}

impl From<&BlogPost> for BlogPostEntry {
    fn from(post: &BlogPost) -> Self {
        BlogPostEntry {
            slug: post.slug.clone(),
            published_at: post.published_at,
            updated_at: post.updated_at,
            is_published: post.is_published,
        }
    }
}

impl ProductEntry {
    /// Pairs a product row with the slug its category join resolved to (if any).
    pub fn from_joined(product_id: Uuid, updated_at: DateTime<Utc>, category_slug: Option<String>) -> Self {
        ProductEntry {
            id: product_id.to_string(),
            updated_at,
            category_slug,
        }
    }
}
