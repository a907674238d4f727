//! Page-number pagination over a cursor feed
//!
//! A SELECT that binds `@Page` runs in two passes:
//!
//! 1. Id pass: the projection becomes `VALUE <root>.id` and the feed is
//!    drained with `max_item_count = page * per_page` until it is exhausted
//!    or that many ids are held
//! 2. Final pass: the original projection with `<root>.id IN (<window>)`
//!    AND-ed in, where the window is `ids[per_page*(page-1) ..][..per_page]`
//!
//! An empty window returns no rows without a second round trip. `@Page`
//! and `@PerPage` are never forwarded to the store.

use cosmosql_core::{
    FeedOptions, Operand, ParameterSet, Predicate, Projection, QueryParameter, SelectQuery, ID_KEY,
};
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::{Error, Result};

/// Page number parameter.
pub const PAGE_PARAM: &str = "@Page";
/// Page size parameter.
pub const PER_PAGE_PARAM: &str = "@PerPage";

/// A 1-based page of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: usize,
    per_page: usize,
}

impl PageWindow {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when either value is below 1 or the window end
    /// overflows.
    pub fn new(page: i64, per_page: i64) -> Result<Self> {
        let page = positive(page, PAGE_PARAM)?;
        let per_page = positive(per_page, PER_PAGE_PARAM)?;
        page.checked_mul(per_page)
            .ok_or_else(|| Error::invalid_input("page window is too large"))?;
        Ok(Self { page, per_page })
    }

    /// Window requested by bound parameters, if `@Page` is bound.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Option<Self>> {
        let Some(page) = parameters.get(PAGE_PARAM) else {
            return Ok(None);
        };
        let page = page
            .value()
            .as_i64()
            .ok_or_else(|| Error::invalid_input("@Page must be an integer"))?;
        let per_page = parameters
            .get(PER_PAGE_PARAM)
            .ok_or_else(|| Error::invalid_input("@Page is bound without @PerPage"))?
            .value()
            .as_i64()
            .ok_or_else(|| Error::invalid_input("@PerPage must be an integer"))?;
        Self::new(page, per_page).map(Some)
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Ids needed to cover this page: `page * per_page`.
    pub fn fetch_limit(&self) -> usize {
        self.page * self.per_page
    }

    /// Index of the first id of the page.
    pub fn offset(&self) -> usize {
        self.per_page * (self.page - 1)
    }

    /// The page's slice of `ids`.
    pub fn slice<'a, T>(&self, ids: &'a [T]) -> &'a [T] {
        let start = self.offset().min(ids.len());
        let end = (start + self.per_page).min(ids.len());
        &ids[start..end]
    }
}

fn positive(value: i64, name: &str) -> Result<usize> {
    if value < 1 {
        return Err(Error::invalid_input(format!(
            "{} must be at least 1, got {}",
            name, value
        )));
    }
    usize::try_from(value).map_err(|_| Error::invalid_input(format!("{} is too large", name)))
}

/// Whether a parameter name is one of the paging controls.
pub fn is_paging_parameter(name: &str) -> bool {
    let bound = cosmosql_core::bind_name(name);
    bound == PAGE_PARAM || bound == PER_PAGE_PARAM
}

/// Runs the two-pass paged read.
pub struct PagingTranslator<'c, 'a> {
    ctx: &'c ExecutionContext<'a>,
}

impl<'c, 'a> PagingTranslator<'c, 'a> {
    /// Create a translator over a context.
    pub fn new(ctx: &'c ExecutionContext<'a>) -> Self {
        Self { ctx }
    }

    /// The id-pass query: `VALUE <root>.id` over the same source and filter.
    pub fn id_query(query: &SelectQuery) -> SelectQuery {
        query.with_projection(Projection::Value(query.qualify(ID_KEY)))
    }

    /// The final query: the original with `<root>.id IN (...)` added.
    pub fn window_query(query: &SelectQuery, ids: &[String]) -> SelectQuery {
        let mut window = query.clone();
        window.and(Predicate::In {
            path: query.qualify(ID_KEY),
            values: ids.iter().map(|id| Operand::text(id.as_str())).collect(),
        });
        window
    }

    /// Fetch the rows of one page.
    ///
    /// `parameters` must not contain the paging controls.
    pub fn fetch(
        &self,
        query: &SelectQuery,
        parameters: &[QueryParameter],
        window: PageWindow,
    ) -> Result<Vec<Value>> {
        let limit = window.fetch_limit();
        let spec = self.ctx.prepare(Self::id_query(query), parameters);
        let ids: Vec<String> = self
            .ctx
            .drain(spec, FeedOptions::with_max_item_count(limit), Some(limit))?
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();

        let page_ids = window.slice(&ids);
        debug!(
            target: "cosmosql::paging",
            page = window.page(),
            per_page = window.per_page(),
            collected = ids.len(),
            window = page_ids.len(),
            "page window computed"
        );
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }

        let spec = self
            .ctx
            .prepare(Self::window_query(query, page_ids), parameters);
        self.ctx.drain(
            spec,
            FeedOptions::with_max_item_count(window.per_page()),
            None,
        )
    }
}
