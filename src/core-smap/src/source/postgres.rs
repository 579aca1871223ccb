//! Catalog reads against the Postgres backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use data_model_smap::{
    db::DbPool,
    models::{BlogPostEntry, CategoryEntry, ProductEntry, SITE_URL_KEY},
    schema::{blog_posts, categories, products, settings},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::errors::SourceError;
use crate::source::SitemapSource;

/// Reads each collection on its own pooled connection, so the three fetches can overlap.
#[derive(Clone)]
pub struct PgSource {
    pool: DbPool,
}

impl PgSource {
    pub fn new(pool: DbPool) -> Self {
        PgSource { pool }
    }
}

#[async_trait]
impl SitemapSource for PgSource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, SourceError> {
        let mut conn = self.pool.get().await?;
        let rows = categories::table
            .select((categories::slug, categories::updated_at))
            .order((categories::updated_at.desc(), categories::slug.asc()))
            .load::<CategoryEntry>(&mut conn)
            .await?;
        tracing::debug!("Loaded {} categories", rows.len());
        Ok(rows)
    }

    async fn fetch_products(&self) -> Result<Vec<ProductEntry>, SourceError> {
        let mut conn = self.pool.get().await?;
        // Left join: products whose category is gone still come back, and are skipped and counted later.
        let rows = products::table
            .left_join(categories::table.on(products::category_id.eq(categories::id.nullable())))
            .select((products::id, products::updated_at, categories::slug.nullable()))
            .order((products::updated_at.desc(), products::id.asc()))
            .load::<(Uuid, DateTime<Utc>, Option<String>)>(&mut conn)
            .await?;
        tracing::debug!("Loaded {} products", rows.len());
        Ok(rows
            .into_iter()
            .map(|(id, updated_at, category_slug)| ProductEntry::from_joined(id, updated_at, category_slug))
            .collect())
    }

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPostEntry>, SourceError> {
        let mut conn = self.pool.get().await?;
        let rows = blog_posts::table
            .filter(blog_posts::is_published.eq(true))
            .select((
                blog_posts::slug,
                blog_posts::published_at,
                blog_posts::updated_at,
                blog_posts::is_published,
            ))
            .order((blog_posts::published_at.desc(), blog_posts::slug.asc()))
            .load::<BlogPostEntry>(&mut conn)
            .await?;
        tracing::debug!("Loaded {} published blog posts", rows.len());
        Ok(rows)
    }

    async fn fetch_site_url(&self) -> Result<Option<String>, SourceError> {
        let mut conn = self.pool.get().await?;
        let site_url = settings::table
            .filter(settings::key.eq(SITE_URL_KEY))
            .select(settings::value)
            .first::<String>(&mut conn)
            .await
            .optional()?;
        Ok(site_url)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use data_model_smap::test_helpers::{
        clean_test_db, create_test_blog_post, create_test_category, create_test_product, set_test_site_url,
        test_db_pool,
    };

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test_with::env(TEST_DATABASE_URL)]
    #[test]
    fn test_pg_source_reads_catalog() {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let pool = test_db_pool().await;
            clean_test_db(&pool).await;

            let sofas = create_test_category(&pool, "sofas", at(15)).await;
            let product = create_test_product(&pool, Some(&sofas), at(16)).await;
            let orphan = create_test_product(&pool, None, at(17)).await;
            create_test_blog_post(&pool, "hello-world", true, at(10), None).await;
            create_test_blog_post(&pool, "draft", false, at(11), None).await;
            set_test_site_url(&pool, "https://rusdecor.info/").await;

            let source = PgSource::new(pool.clone());

            let categories = source.fetch_categories().await.unwrap();
            assert_eq!(categories, vec![CategoryEntry {
                slug: "sofas".to_string(),
                updated_at: at(15),
            }]);

            let products = source.fetch_products().await.unwrap();
            assert_eq!(products.len(), 2);
            assert_eq!(products[0].id, orphan.id.to_string());
            assert_eq!(products[0].category_slug, None);
            assert_eq!(products[1].id, product.id.to_string());
            assert_eq!(products[1].category_slug.as_deref(), Some("sofas"));

            let posts = source.fetch_blog_posts().await.unwrap();
            assert_eq!(posts.len(), 1);
            assert_eq!(posts[0].slug, "hello-world");

            let site_url = source.fetch_site_url().await.unwrap();
            assert_eq!(site_url.as_deref(), Some("https://rusdecor.info/"));

            clean_test_db(&pool).await;
        });
    }
}
