use std::num::NonZeroUsize;

/// One page of a list. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// The page actually shown, after clamping.
    pub number: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Slice out page `number` of `list`.
///
/// Out-of-range page numbers are clamped: 0 shows the first page and
/// anything past the end shows the last. An empty list yields page 1 of 0.
pub fn paginate<T>(list: &[T], number: usize, page_size: NonZeroUsize) -> Page<'_, T> {
    let total = total_pages(list.len(), page_size);
    let number = number.clamp(1, total.max(1));
    let start = (number - 1) * page_size.get();
    let end = (start + page_size.get()).min(list.len());

    Page {
        items: list.get(start..end).unwrap_or(&[]),
        number,
        total_pages: total,
    }
}
