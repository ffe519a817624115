use serde::Deserialize;

use crate::model::EndpointDescriptor;

/// Pagination cursor for one committed query result.
///
/// Invariants: `total_pages = ceil(total_items / page_size)`,
/// `has_next = current_page < total_pages`, `has_prev = current_page > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PaginationState {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationState {
    pub fn compute(current_page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size);
        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }
}

/// Case-insensitive substring filter over endpoint name and path. An empty
/// query keeps everything.
pub fn filter_by_query(items: &[EndpointDescriptor], query: &str) -> Vec<EndpointDescriptor> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|endpoint| {
            endpoint.name.to_lowercase().contains(&needle)
                || endpoint.path.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// First page of a locally filtered dataset, shaped exactly like the remote
/// pagination payload for the same inputs. When pagination is disabled the
/// full filtered list is kept.
pub fn first_page(
    filtered: Vec<EndpointDescriptor>,
    page_size: usize,
    paginate: bool,
) -> (Vec<EndpointDescriptor>, PaginationState) {
    let page_size = page_size.max(1);
    let total_items = filtered.len();
    let state = PaginationState {
        current_page: 1,
        page_size,
        total_items,
        total_pages: total_items.div_ceil(page_size),
        has_next: total_items > page_size,
        has_prev: false,
    };
    let items = if paginate {
        filtered.into_iter().take(page_size).collect()
    } else {
        filtered
    };
    (items, state)
}
