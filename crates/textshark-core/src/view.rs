//! Read-only views over parsed packets: filtering and pagination.
//!
//! Views borrow from a `ParseResult` and never reorder or modify it.

use crate::PacketRecord;

/// Packets per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Protocol filter value that disables protocol filtering.
pub const ALL_PROTOCOLS: &str = "all";
/// Maximum number of page numbers shown around the current page.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Search and protocol filter.
///
/// # Examples
/// ```
/// use textshark_core::PacketRecord;
/// use textshark_core::view::PacketFilter;
///
/// let packets = vec![
///     PacketRecord { protocol: "TCP".into(), source: "10.0.0.1".into(), ..Default::default() },
///     PacketRecord { protocol: "UDP".into(), source: "10.0.0.2".into(), ..Default::default() },
/// ];
/// let filter = PacketFilter::default().with_protocol("tcp");
/// assert_eq!(filter.apply(&packets).len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketFilter {
    /// Case-insensitive substring over source, destination, protocol and info.
    pub query: Option<String>,
    /// Case-insensitive substring of the protocol label; `all` matches any.
    pub protocol: Option<String>,
}

impl PacketFilter {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Whether the filter lets every packet through.
    pub fn is_empty(&self) -> bool {
        self.active_protocol().is_none() && self.active_query().is_none()
    }

    pub fn matches(&self, packet: &PacketRecord) -> bool {
        if let Some(protocol) = self.active_protocol() {
            if !packet.protocol.to_lowercase().contains(&protocol) {
                return false;
            }
        }
        if let Some(query) = self.active_query() {
            let fields = [
                &packet.source,
                &packet.destination,
                &packet.protocol,
                &packet.info,
            ];
            if !fields
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
            {
                return false;
            }
        }
        true
    }

    /// Matching packets, in their original order.
    pub fn apply<'a>(&self, packets: &'a [PacketRecord]) -> Vec<&'a PacketRecord> {
        packets.iter().filter(|packet| self.matches(packet)).collect()
    }

    fn active_protocol(&self) -> Option<String> {
        self.protocol
            .as_deref()
            .map(str::trim)
            .filter(|protocol| !protocol.is_empty() && !protocol.eq_ignore_ascii_case(ALL_PROTOCOLS))
            .map(str::to_lowercase)
    }

    fn active_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase)
    }
}

/// One page of a sequence.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number actually shown.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// 1-based index of the first item on the page, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on the page, 0 when empty.
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + self.items.len()
        }
    }
}

/// Slice out a 1-based page. Pages past the end clamp to the last page.
///
/// # Examples
/// ```
/// use textshark_core::view::paginate;
///
/// let items: Vec<u32> = (1..=45).collect();
/// let page = paginate(&items, 3, 20);
/// assert_eq!(page.items, &[41, 42, 43, 44, 45]);
/// assert_eq!(page.total_pages, 3);
/// assert_eq!((page.first_index(), page.last_index()), (41, 45));
/// ```
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start..end],
        page,
        per_page,
        total_pages,
        total_items: items.len(),
    }
}

/// Entry of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Page numbers to display around `current`, with first/last pages and gaps.
pub fn visible_page_numbers(current: usize, total_pages: usize) -> Vec<PageMarker> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(PageMarker::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);

    let mut markers = Vec::new();
    if start > 1 {
        markers.push(PageMarker::Page(1));
        if start > 2 {
            markers.push(PageMarker::Ellipsis);
        }
    }
    markers.extend((start..=end).map(PageMarker::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            markers.push(PageMarker::Ellipsis);
        }
        markers.push(PageMarker::Page(total_pages));
    }
    markers
}
