//! Paged feed over a materialized result set
//!
//! The result set is computed once when the query is opened. Pages are
//! cut by `max_item_count`; the continuation token is the decimal offset
//! of the next item.

use cosmosql_core::{FeedCursor, FeedPage, StoreError, StoreResult};
use serde_json::Value;

/// Page size used when the caller leaves `max_item_count` unset.
pub const DEFAULT_MAX_ITEM_COUNT: usize = 100;

/// Cursor over a materialized query result.
#[derive(Debug)]
pub struct MemoryFeed {
    items: Vec<Value>,
    offset: usize,
    page_size: usize,
    fetched: bool,
}

impl MemoryFeed {
    /// Create a feed starting at the offset encoded in `continuation`.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a token that is not a valid offset.
    pub fn new(
        items: Vec<Value>,
        max_item_count: Option<usize>,
        continuation: Option<&str>,
    ) -> StoreResult<Self> {
        let offset = match continuation {
            Some(token) => token
                .parse::<usize>()
                .ok()
                .filter(|offset| *offset <= items.len())
                .ok_or_else(|| {
                    StoreError::BadRequest(format!("invalid continuation token '{}'", token))
                })?,
            None => 0,
        };
        let page_size = max_item_count
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ITEM_COUNT);
        Ok(Self {
            items,
            offset,
            page_size,
            fetched: false,
        })
    }

    /// Total number of items in the result set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FeedCursor for MemoryFeed {
    fn has_more(&self) -> bool {
        // An empty feed still yields one (empty) page
        !self.fetched || self.offset < self.items.len()
    }

    fn fetch_next(&mut self) -> StoreResult<FeedPage> {
        self.fetched = true;
        let end = (self.offset + self.page_size).min(self.items.len());
        let items = self.items[self.offset..end].to_vec();
        self.offset = end;
        let continuation = (end < self.items.len()).then(|| end.to_string());
        Ok(FeedPage {
            items,
            continuation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn values(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!(i)).collect()
    }

    #[test]
    fn pages_by_max_item_count() {
        let mut feed = MemoryFeed::new(values(5), Some(2), None).unwrap();
        let mut pages = Vec::new();
        while feed.has_more() {
            pages.push(feed.fetch_next().unwrap());
        }
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].continuation.as_deref(), Some("2"));
        assert_eq!(pages[1].continuation.as_deref(), Some("4"));
        assert_eq!(pages[2].items, vec![json!(4)]);
        assert_eq!(pages[2].continuation, None);
    }

    #[test]
    fn empty_feed_yields_one_page() {
        let mut feed = MemoryFeed::new(Vec::new(), Some(10), None).unwrap();
        assert!(feed.has_more());
        assert!(feed.fetch_next().unwrap().items.is_empty());
        assert!(!feed.has_more());
    }

    #[test]
    fn resumes_from_continuation() {
        let mut feed = MemoryFeed::new(values(5), Some(10), Some("3")).unwrap();
        assert_eq!(feed.fetch_next().unwrap().items, vec![json!(3), json!(4)]);
        assert!(MemoryFeed::new(values(5), None, Some("9")).is_err());
        assert!(MemoryFeed::new(values(5), None, Some("x")).is_err());
    }

    #[test]
    fn zero_page_size_uses_default() {
        let mut feed = MemoryFeed::new(values(150), Some(0), None).unwrap();
        assert_eq!(feed.fetch_next().unwrap().items.len(), DEFAULT_MAX_ITEM_COUNT);
    }

    proptest! {
        #[test]
        fn pages_concatenate_to_the_result(len in 0usize..60, size in 1usize..20) {
            let mut feed = MemoryFeed::new(values(len), Some(size), None).unwrap();
            let mut seen = Vec::new();
            let mut pages = 0;
            while feed.has_more() {
                let page = feed.fetch_next().unwrap();
                prop_assert!(page.items.len() <= size);
                seen.extend(page.items);
                pages += 1;
            }
            prop_assert_eq!(seen, values(len));
            prop_assert_eq!(pages, ((len + size - 1) / size).max(1));
        }
    }
}
