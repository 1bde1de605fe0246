//! Paging state for one store's product pull

use crate::catalog::{BatchQuery, ProductSource};
use crate::models::{ProductRecord, SyncFilter};
use anyhow::{Context, Result};
use tracing::debug;

/// Fetch session owned for the duration of one store's pass
///
/// Opening the session fetches batch 1 and fixes the total batch count
/// for the whole pull. Later pages are requested with the same filter and
/// batch size, and the count is never re-read, so pages keep coming until
/// the recorded total even when one comes back empty.
pub struct FetchSession<'a> {
    source: &'a dyn ProductSource,
    filter: SyncFilter,
    batch_size: usize,
    total_batches: usize,
    next_batch: usize,
    first_page: Option<Vec<ProductRecord>>,
}

impl<'a> FetchSession<'a> {
    /// Fetch the first page and record the pull's batch count
    pub async fn open(
        source: &'a dyn ProductSource,
        filter: SyncFilter,
        batch_size: usize,
    ) -> Result<FetchSession<'a>> {
        let query = BatchQuery {
            filter: filter.clone(),
            batch_size,
            batch_number: 1,
        };
        let page = source.fetch_batch(&query).await.with_context(|| {
            format!("Failed to fetch products batch 1 for store {}", filter.store_id)
        })?;

        debug!(
            store_id = filter.store_id,
            incremental = filter.is_incremental(),
            batch_size,
            total_batches = page.total_batches,
            "Opened fetch session"
        );

        Ok(Self {
            source,
            filter,
            batch_size,
            total_batches: page.total_batches,
            next_batch: 1,
            first_page: Some(page.products),
        })
    }

    pub fn filter(&self) -> &SyncFilter {
        &self.filter
    }

    /// Batch count reported by the first page
    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    /// Last batch number this session yields. Batch 1 is always yielded.
    pub fn last_batch(&self) -> usize {
        self.total_batches.max(1)
    }

    /// Next `(batch_number, products)` pair, or `None` once the pull is done
    pub async fn next_batch(&mut self) -> Result<Option<(usize, Vec<ProductRecord>)>> {
        if self.next_batch > self.last_batch() {
            return Ok(None);
        }

        let batch_number = self.next_batch;
        let products = match self.first_page.take() {
            Some(products) => products,
            None => {
                let query = BatchQuery {
                    filter: self.filter.clone(),
                    batch_size: self.batch_size,
                    batch_number,
                };
                self.source
                    .fetch_batch(&query)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to fetch products batch {} for store {}",
                            batch_number, self.filter.store_id
                        )
                    })?
                    .products
            }
        };

        self.next_batch += 1;
        Ok(Some((batch_number, products)))
    }
}
