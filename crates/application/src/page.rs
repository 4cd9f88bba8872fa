use dramashelf_core::PageSize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    /// 1-based page actually shown after clamping.
    pub current_page: usize,
}

/// Slices `items` into the requested 1-based page, clamping out-of-range
/// page numbers to the nearest valid page.
pub fn paginate<T: Clone>(items: &[T], size: PageSize, current_page: usize) -> Page<T> {
    let size = match size {
        PageSize::All | PageSize::Count(0) => {
            return Page {
                items: items.to_vec(),
                total_pages: 1,
                current_page: 1,
            };
        }
        PageSize::Count(n) => n,
    };

    let total_pages = items.len().div_ceil(size);
    let current_page = current_page.clamp(1, total_pages.max(1));
    let start = ((current_page - 1) * size).min(items.len());
    let end = (current_page * size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        total_pages,
        current_page,
    }
}
