//! Order query pipeline: enrichment, filtering, pagination
//!
//! Orders are first joined with their client, then kept only when every
//! active filter matches, then cut into fixed-size pages. Nothing here can
//! fail; an empty page is a valid result.

use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{Activity, Client, OrderStatus, Priority, WorkOrder};

/// Rows per page
pub const PAGE_SIZE: usize = 10;

/// Display name used when an order references an unknown client
pub const MISSING_CLIENT: &str = "Cliente no encontrado";

/// A work order joined with the client it references
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnrichedOrder<'a> {
    #[serde(flatten)]
    pub order: &'a WorkOrder,

    /// `None` when `order.client_id` matches no stored client
    pub client: Option<&'a Client>,
}

impl EnrichedOrder<'_> {
    pub fn client_name(&self) -> &str {
        self.client.map_or(MISSING_CLIENT, |c| c.name.as_str())
    }

    pub fn client_identification(&self) -> &str {
        self.client.map_or("", |c| c.identification.as_str())
    }
}

/// Attach to each order the client whose id equals its `client_id`
///
/// Order is preserved. When several clients share an id, the first one wins.
pub fn enrich<'a>(orders: &'a [WorkOrder], clients: &'a [Client]) -> Vec<EnrichedOrder<'a>> {
    let mut by_id: HashMap<&str, &Client> = HashMap::with_capacity(clients.len());
    for client in clients {
        by_id.entry(client.id.as_str()).or_insert(client);
    }

    orders
        .iter()
        .map(|order| EnrichedOrder {
            order,
            client: by_id.get(order.client_id.as_str()).copied(),
        })
        .collect()
}

/// Filter criteria; blank text and `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Matched against order number, client name and description
    pub text: String,
    pub status: Option<OrderStatus>,
    pub activity: Option<Activity>,
    pub priority: Option<Priority>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.status.is_none()
            && self.activity.is_none()
            && self.priority.is_none()
    }

    pub fn matches(&self, row: &EnrichedOrder<'_>) -> bool {
        self.matches_text(row)
            && self.status.map_or(true, |s| row.order.status == s)
            && self.activity.map_or(true, |a| row.order.activity == a)
            && self.priority.map_or(true, |p| row.order.priority == p)
    }

    fn matches_text(&self, row: &EnrichedOrder<'_>) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();

        row.order.order_number.contains(&self.text)
            || row
                .client
                .is_some_and(|c| c.name.to_lowercase().contains(&needle))
            || row.order.description.to_lowercase().contains(&needle)
    }
}

/// Keep the rows matching every active criterion
pub fn filter_orders<'a>(rows: &[EnrichedOrder<'a>], filter: &OrderFilter) -> Vec<EnrichedOrder<'a>> {
    rows.iter().filter(|row| filter.matches(row)).copied().collect()
}

/// Position of one page within a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page index
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// 1-based index of the first row shown, 0 when the page is empty
    pub range_start: usize,
    /// 1-based index of the last row shown, 0 when the page is empty
    pub range_end: usize,
}

impl PageInfo {
    pub fn new(total_count: usize, page: usize) -> Self {
        let page = page.max(1);
        let total_pages = total_count.div_ceil(PAGE_SIZE);
        // Overflow means the page lies past any possible result
        let start = (page - 1).checked_mul(PAGE_SIZE).unwrap_or(usize::MAX);

        let (range_start, range_end) = if start < total_count {
            (start + 1, page.saturating_mul(PAGE_SIZE).min(total_count))
        } else {
            (0, 0)
        };

        Self {
            current_page: page,
            total_pages,
            total_count,
            range_start,
            range_end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range_start == 0
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Slice out page `page` (1-based; 0 is treated as 1)
pub fn paginate<T: Clone>(items: &[T], page: usize) -> (Vec<T>, PageInfo) {
    let info = PageInfo::new(items.len(), page);
    if info.is_empty() {
        return (Vec::new(), info);
    }
    (items[info.range_start - 1..info.range_end].to_vec(), info)
}

/// One computed page of enriched, filtered orders
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage<'a> {
    pub rows: Vec<EnrichedOrder<'a>>,
    #[serde(flatten)]
    pub info: PageInfo,
}

/// Filter and page state of an order listing
///
/// Changing the filter keeps the current page; every [`OrderQuery::run`]
/// clamps it into the valid range of the new result. [`OrderQuery::clear`]
/// drops all filters and returns to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    filter: OrderFilter,
    page: usize,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderQuery {
    pub fn new() -> Self {
        Self {
            filter: OrderFilter::default(),
            page: 1,
        }
    }

    pub fn with_filter(filter: OrderFilter) -> Self {
        Self { filter, page: 1 }
    }

    pub fn filter(&self) -> &OrderFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filter(&mut self, filter: OrderFilter) {
        self.filter = filter;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Drop every filter and go back to the first page
    pub fn clear(&mut self) {
        self.filter = OrderFilter::default();
        self.page = 1;
    }

    /// Enrich, filter and paginate, clamping the page to the result
    pub fn run<'a>(&mut self, orders: &'a [WorkOrder], clients: &'a [Client]) -> OrderPage<'a> {
        let enriched = enrich(orders, clients);
        let filtered = filter_orders(&enriched, &self.filter);

        let last_page = filtered.len().div_ceil(PAGE_SIZE).max(1);
        if self.page > last_page {
            tracing::debug!(requested = self.page, last_page, "page out of range, clamping");
        }
        self.page = self.page.clamp(1, last_page);

        let (rows, info) = paginate(&filtered, self.page);
        OrderPage { rows, info }
    }
}
