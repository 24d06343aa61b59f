//! Page-number window for pagination controls.

/// Numeric entries shown at most.
const MAX_VISIBLE: u32 = 5;

/// One slot of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A selectable page number.
    Page(u32),
    /// A gap of skipped pages.
    Ellipsis,
}

/// Pages to show for `current` out of `total`.
///
/// Up to five pages are listed in full. Beyond that the first and last
/// pages stay visible and a short run around `current` is kept, with
/// ellipses for the gaps. Returns an empty list when `total <= 1`.
#[must_use]
pub fn visible_pages(current: u32, total: u32) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }
    if total <= MAX_VISIBLE {
        return (1..=total).map(PageLink::Page).collect();
    }

    let mut links = Vec::with_capacity(7);
    if current <= 3 {
        links.extend((1..=4).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    } else if current >= total.saturating_sub(2) {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((total.saturating_sub(3)..=total).map(PageLink::Page));
    } else {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((current.saturating_sub(1)..=current.saturating_add(1)).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    }
    links
}
