//! Aggregation of the upstream broadcast listing
//!
//! The upstream only serves fixed-size batches, so a listing request walks
//! every batch sequentially, merges the items, ranks them by viewers and
//! re-paginates locally.

use std::pin::pin;
use std::sync::Arc;

use common::{BroadcastBatch, BroadcastItem, BroadcastSource, UpstreamError, UpstreamResult};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info, warn};

use crate::models::{BroadcastFilter, BroadcastPage, PageRequest, RankedBroadcast};

/// Every broadcast fetched for one request
#[derive(Debug, Clone, Default)]
pub struct Aggregated {
    /// Total reported by the first upstream response
    pub total: u64,
    pub items: Vec<BroadcastItem>,
}

/// Walks the upstream listing batch by batch
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn BroadcastSource>,
    batch_size: u64,
    max_batches: u64,
}

struct Cursor {
    offset: u64,
    total: Option<u64>,
    calls: u64,
}

impl Aggregator {
    /// Create a new aggregator; a zero batch size or batch limit counts as one
    pub fn new(source: Arc<dyn BroadcastSource>, batch_size: u64, max_batches: u64) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
            max_batches: max_batches.max(1),
        }
    }

    pub fn source(&self) -> &Arc<dyn BroadcastSource> {
        &self.source
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Lazy sequence of upstream batches
    ///
    /// The first batch is always requested. Further batches are requested
    /// while the offset stays below the total reported by the first batch,
    /// and never more than `max_batches` in total.
    pub fn batches(&self) -> impl Stream<Item = UpstreamResult<BroadcastBatch>> + Send {
        let source = Arc::clone(&self.source);
        let batch_size = self.batch_size;
        let max_batches = self.max_batches;

        let start = Cursor {
            offset: 0,
            total: None,
            calls: 0,
        };

        stream::try_unfold(start, move |mut cursor| {
            let source = Arc::clone(&source);
            async move {
                if cursor.total.is_some_and(|total| cursor.offset >= total) {
                    return Ok::<_, UpstreamError>(None);
                }
                if cursor.calls >= max_batches {
                    warn!(
                        "Stopping after {} upstream batches at offset {} of {}",
                        cursor.calls,
                        cursor.offset,
                        cursor.total.unwrap_or_default()
                    );
                    return Ok(None);
                }

                let batch = source.fetch_batch(cursor.offset, batch_size).await?;
                let total = *cursor.total.get_or_insert(batch.total);
                if batch.total != total {
                    debug!(
                        "Upstream total moved from {} to {} at offset {}, keeping {}",
                        total, batch.total, cursor.offset, total
                    );
                }
                debug!(
                    "Received {} broadcasts at offset {}",
                    batch.items.len(),
                    cursor.offset
                );

                cursor.offset += batch_size;
                cursor.calls += 1;
                Ok(Some((batch, cursor)))
            }
        })
    }

    /// Fetch and merge every upstream batch
    pub async fn collect_all(&self) -> UpstreamResult<Aggregated> {
        let mut batches = pin!(self.batches());
        let mut total = None;
        let mut items = Vec::new();

        while let Some(batch) = batches.try_next().await? {
            total.get_or_insert(batch.total);
            items.extend(batch.items);
        }

        let total = total.unwrap_or_default();
        info!("Aggregated {} broadcasts (upstream total {})", items.len(), total);

        Ok(Aggregated { total, items })
    }
}

/// Sort by viewers, most watched first, and number the result from 1
///
/// The sort is stable: broadcasts with the same viewer count keep their
/// upstream order.
pub fn rank(mut items: Vec<BroadcastItem>) -> Vec<RankedBroadcast> {
    items.sort_by(|a, b| b.viewers.cmp(&a.viewers));
    items
        .into_iter()
        .zip(1..)
        .map(|(item, rank)| RankedBroadcast { rank, item })
        .collect()
}

/// Items of the 1-based `page` when split into pages of `limit`
pub fn page_slice<T>(items: &[T], page: u64, limit: u64) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(limit);
    let start = usize::try_from(start).unwrap_or(usize::MAX).min(items.len());
    let end = start
        .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
        .min(items.len());
    &items[start..end]
}

pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

/// Rank, filter and paginate an aggregated listing
///
/// `total` is the upstream total when no filter is set, otherwise the
/// number of matching broadcasts. Ranks are assigned before filtering.
pub fn build_page(
    aggregated: Aggregated,
    request: &PageRequest,
    filter: &BroadcastFilter,
) -> BroadcastPage {
    let ranked = rank(aggregated.items);

    let (total, ranked) = if filter.is_empty() {
        (aggregated.total, ranked)
    } else {
        let matching: Vec<RankedBroadcast> = ranked
            .into_iter()
            .filter(|broadcast| filter.matches(&broadcast.item))
            .collect();
        (matching.len() as u64, matching)
    };

    BroadcastPage {
        total,
        page: request.page,
        total_pages: total_pages(total, request.limit),
        items: page_slice(&ranked, request.page, request.limit).to_vec(),
    }
}
