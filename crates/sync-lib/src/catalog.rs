//! Catalog product source
//!
//! The syncer reads products page by page through [`ProductSource`].
//! [`CatalogFile`] serves pages from a JSON catalog export.

use crate::models::{ProductRecord, SyncFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// One page request against the product source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub filter: SyncFilter,
    pub batch_size: usize,
    /// 1-based page number
    pub batch_number: usize,
}

/// One page of products plus pagination metadata for the whole pull
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    pub total_batches: usize,
}

/// Source of paginated catalog products
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch a single page of products matching the query's filter
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<ProductPage>;
}

/// Number of pages needed for `matching` items
pub fn batch_count(matching: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    matching.div_ceil(batch_size)
}

/// Product source backed by a catalog export held in memory
#[derive(Debug, Clone, Default)]
pub struct CatalogFile {
    products: Vec<ProductRecord>,
}

impl CatalogFile {
    pub fn new(mut products: Vec<ProductRecord>) -> Self {
        products.sort_by_key(|p| p.id);
        Self { products }
    }

    /// Load a JSON array of products from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read catalog file {:?}", path))?;
        let products: Vec<ProductRecord> =
            serde_json::from_slice(&data).context("Failed to parse catalog file")?;

        info!(path = %path.display(), products = products.len(), "Loaded catalog");
        Ok(Self::new(products))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn matching<'a>(&'a self, filter: &'a SyncFilter) -> impl Iterator<Item = &'a ProductRecord> {
        self.products.iter().filter(move |p| {
            p.store_ids.contains(&filter.store_id)
                && filter
                    .updated_since
                    .map_or(true, |since| p.updated_at >= since)
        })
    }
}

#[async_trait]
impl ProductSource for CatalogFile {
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<ProductPage> {
        if query.batch_size == 0 {
            anyhow::bail!("Batch size must be greater than zero");
        }
        if query.batch_number == 0 {
            anyhow::bail!("Batch numbers start at 1");
        }

        let matching = self.matching(&query.filter).count();
        let total_batches = batch_count(matching, query.batch_size);
        let products: Vec<ProductRecord> = self
            .matching(&query.filter)
            .skip((query.batch_number - 1) * query.batch_size)
            .take(query.batch_size)
            .cloned()
            .collect();

        debug!(
            store_id = query.filter.store_id,
            batch = query.batch_number,
            products = products.len(),
            total_batches,
            "Fetched catalog page"
        );

        Ok(ProductPage {
            products,
            total_batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: u64, stores: &[u32], updated_day: u32) -> ProductRecord {
        ProductRecord {
            id,
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            price: 19.99,
            currency: "USD".to_string(),
            store_ids: stores.to_vec(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, updated_day, 0, 0, 0).unwrap(),
            type_id: "simple".to_string(),
            category: None,
            description: None,
            image_url: None,
            parent_sku: None,
        }
    }

    #[test]
    fn test_batch_count() {
        assert_eq!(batch_count(0, 10), 0);
        assert_eq!(batch_count(5, 2), 3);
        assert_eq!(batch_count(4, 2), 2);
        assert_eq!(batch_count(5, 0), 0);
    }

    #[test]
    fn test_pages_are_scoped_to_store() {
        let catalog = CatalogFile::new(vec![
            product(3, &[1], 1),
            product(1, &[1, 2], 1),
            product(2, &[2], 1),
        ]);

        let page = tokio_test::block_on(catalog.fetch_batch(&BatchQuery {
            filter: SyncFilter::full(1),
            batch_size: 10,
            batch_number: 1,
        }))
        .unwrap();

        let ids: Vec<u64> = page.products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(page.total_batches, 1);
    }

    #[tokio::test]
    async fn test_updated_since_is_inclusive() {
        let catalog = CatalogFile::new(vec![
            product(1, &[1], 1),
            product(2, &[1], 5),
            product(3, &[1], 9),
        ]);
        let since = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();

        let page = catalog
            .fetch_batch(&BatchQuery {
                filter: SyncFilter::since(1, since),
                batch_size: 10,
                batch_number: 1,
            })
            .await
            .unwrap();

        let ids: Vec<u64> = page.products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_pagination() {
        let catalog = CatalogFile::new((1..=5).map(|id| product(id, &[1], 1)).collect());
        let query = |n| BatchQuery {
            filter: SyncFilter::full(1),
            batch_size: 2,
            batch_number: n,
        };

        let sizes: Vec<usize> = {
            let mut sizes = Vec::new();
            for n in 1..=4 {
                sizes.push(catalog.fetch_batch(&query(n)).await.unwrap().products.len());
            }
            sizes
        };
        assert_eq!(sizes, vec![2, 2, 1, 0]);
        assert_eq!(catalog.fetch_batch(&query(1)).await.unwrap().total_batches, 3);
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let catalog = CatalogFile::default();
        let result = catalog
            .fetch_batch(&BatchQuery {
                filter: SyncFilter::full(1),
                batch_size: 0,
                batch_number: 1,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::to_vec(&vec![product(1, &[1], 1), product(2, &[1], 2)]).unwrap();
        std::fs::write(&path, json).unwrap();

        let catalog = CatalogFile::load(&path).await.unwrap();
        assert_eq!(catalog.len(), 2);
    }
}
