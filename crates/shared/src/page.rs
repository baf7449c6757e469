//! 1-indexed fixed-size page arithmetic shared by sources and the session.

/// Number of products per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Returns the `page`-th slice of `items` split into chunks of `page_size`.
///
/// Pages are 1-indexed. A page past the end (or page 0, or a zero page size)
/// yields an empty slice rather than an error.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let Some(start) = (page - 1).checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `count` items; zero items means zero pages.
pub fn page_count(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Whether a fetched page of `fetched` items implies another page may follow.
pub fn is_full_page(fetched: usize, page_size: usize) -> bool {
    fetched == page_size
}
