use std::str::FromStr;

use serde::Serialize;

/// Rows shown per results page.
pub const PAGE_SIZE: u64 = 10;

/// Which navigation button a legacy page-indicator link carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Previous,
    Next,
}

impl FromStr for NavDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "previous" => Ok(Self::Previous),
            "next" => Ok(Self::Next),
            other => Err(format!("unknown navigation direction '{other}'")),
        }
    }
}

/// A window of search results addressed by raw row offset.
///
/// This is the only pagination state the views see: the previous/next links
/// carry offsets, so every results page is a plain stateless GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetWindow {
    pub limit: u64,
    pub offset: u64,
    pub page: u64,
    pub prev_offset: u64,
    pub next_offset: u64,
}

impl OffsetWindow {
    /// Resolves the window for a requested offset. Missing or negative
    /// offsets address the first page.
    pub fn at(requested_offset: Option<i64>) -> Self {
        let offset = requested_offset
            .and_then(|o| u64::try_from(o).ok())
            .unwrap_or(0);
        let limit = PAGE_SIZE;

        Self {
            limit,
            offset,
            page: offset / limit + 1,
            prev_offset: offset.saturating_sub(limit),
            next_offset: offset.saturating_add(limit),
        }
    }

    pub const fn has_previous(&self) -> bool {
        self.offset > 0
    }

    /// A full page suggests more rows follow; the catalog is never counted.
    pub const fn has_next(&self, rows_on_page: usize) -> bool {
        rows_on_page as u64 >= self.limit
    }
}

/// Page-number state carried by older result links (`page=N&s=previous|next`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    pub page: u64,
    pub offset: u64,
    pub first_page: bool,
    pub nav: Option<NavDirection>,
}

impl PageCursor {
    /// Applies the pressed button to the page the link was rendered on.
    /// The resulting page never goes below 1.
    pub fn resolve(requested_page: Option<i64>, nav: Option<NavDirection>) -> Self {
        let current = requested_page.filter(|p| *p >= 1).unwrap_or(1);
        let target = match nav {
            Some(NavDirection::Previous) => current.saturating_sub(1),
            Some(NavDirection::Next) => current.saturating_add(1),
            None => current,
        };
        let page = u64::try_from(target.max(1)).unwrap_or(1);

        Self {
            page,
            offset: (page - 1).saturating_mul(PAGE_SIZE),
            first_page: page == 1,
            nav,
        }
    }
}

/// Picks the results window for a search request.
///
/// An explicit `offset` wins. Without one, a legacy `page`/`s` pair is
/// translated to the offset it pointed at.
pub fn resolve_window(
    offset: Option<i64>,
    page: Option<i64>,
    nav: Option<NavDirection>,
) -> OffsetWindow {
    match offset {
        Some(offset) => OffsetWindow::at(Some(offset)),
        None if page.is_some() || nav.is_some() => {
            let cursor = PageCursor::resolve(page, nav);
            OffsetWindow::at(Some(i64::try_from(cursor.offset).unwrap_or(i64::MAX)))
        }
        None => OffsetWindow::at(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_window_has_no_previous() {
        let window = OffsetWindow::at(Some(0));

        assert_eq!(window.limit, 10);
        assert_eq!(window.page, 1);
        assert_eq!(window.prev_offset, 0);
        assert_eq!(window.next_offset, 10);
        assert!(!window.has_previous());
    }

    #[test]
    fn missing_offset_means_first_page() {
        assert_eq!(OffsetWindow::at(None), OffsetWindow::at(Some(0)));
    }

    #[test]
    fn page_follows_offset() {
        for offset in [0_i64, 1, 9, 10, 11, 19, 20, 95, 1000] {
            let window = OffsetWindow::at(Some(offset));
            let expected = u64::try_from(offset).unwrap() / 10 + 1;
            assert_eq!(window.page, expected, "offset {offset}");
        }
    }

    #[test]
    fn navigation_offsets_never_go_negative() {
        for offset in [0_i64, 3, 9, 10, 15, 42] {
            let window = OffsetWindow::at(Some(offset));
            let raw = u64::try_from(offset).unwrap();
            assert_eq!(window.next_offset, raw + 10);
            assert_eq!(window.prev_offset, raw.saturating_sub(10));
        }
        assert_eq!(OffsetWindow::at(Some(5)).prev_offset, 0);
        assert_eq!(OffsetWindow::at(Some(25)).prev_offset, 15);
    }

    #[test]
    fn negative_offset_is_clamped_to_first_page() {
        let window = OffsetWindow::at(Some(-30));

        assert_eq!(window.offset, 0);
        assert_eq!(window.page, 1);
        assert_eq!(window.prev_offset, 0);
    }

    #[test]
    fn huge_offset_saturates() {
        let window = OffsetWindow::at(Some(i64::MAX));
        assert_eq!(window.offset, 9_223_372_036_854_775_807);
        assert_eq!(window.page, 922_337_203_685_477_581);
        assert!(window.has_previous());

        let cursor = PageCursor::resolve(Some(i64::MAX), Some(NavDirection::Next));
        assert_eq!(cursor.offset, u64::MAX);
    }

    #[test]
    fn has_next_only_for_full_pages() {
        let window = OffsetWindow::at(Some(0));
        assert!(window.has_next(10));
        assert!(!window.has_next(3));
        assert!(!window.has_next(0));
    }

    #[test]
    fn page_offset_is_page_minus_one_times_limit() {
        for page in 1_i64..=50 {
            let cursor = PageCursor::resolve(Some(page), None);
            assert_eq!(cursor.offset, u64::try_from(page - 1).unwrap() * 10);
        }
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(PageCursor::resolve(None, None).page, 1);
        assert_eq!(PageCursor::resolve(Some(0), None).page, 1);
        assert_eq!(PageCursor::resolve(Some(-4), None).page, 1);
    }

    #[test]
    fn buttons_move_one_page() {
        let next = PageCursor::resolve(Some(1), Some(NavDirection::Next));
        assert_eq!((next.page, next.offset), (2, 10));

        let previous = PageCursor::resolve(Some(3), Some(NavDirection::Previous));
        assert_eq!((previous.page, previous.offset), (2, 10));
    }

    #[test]
    fn first_page_flag_matches_page_indicator_links() {
        // page 1, no button
        assert!(PageCursor::resolve(Some(1), None).first_page);
        // previous from page 2
        assert!(PageCursor::resolve(Some(2), Some(NavDirection::Previous)).first_page);
        // next from page 1
        assert!(!PageCursor::resolve(Some(1), Some(NavDirection::Next)).first_page);
        // landing directly on a later page
        assert!(!PageCursor::resolve(Some(3), None).first_page);
        assert!(!PageCursor::resolve(Some(4), Some(NavDirection::Previous)).first_page);
    }

    #[test]
    fn repeated_previous_stops_at_first_page() {
        let cursor = PageCursor::resolve(Some(1), Some(NavDirection::Previous));

        assert_eq!(cursor.page, 1);
        assert_eq!(cursor.offset, 0);
        assert!(cursor.first_page);
    }

    #[test]
    fn nav_direction_parses_known_values_only() {
        assert_eq!("previous".parse(), Ok(NavDirection::Previous));
        assert_eq!("next".parse(), Ok(NavDirection::Next));
        assert!("sideways".parse::<NavDirection>().is_err());
    }

    #[test]
    fn explicit_offset_wins_over_page() {
        let window = resolve_window(Some(30), Some(1), Some(NavDirection::Next));
        assert_eq!(window.offset, 30);
        assert_eq!(window.page, 4);
    }

    #[test]
    fn legacy_page_links_translate_to_offsets() {
        let window = resolve_window(None, Some(2), Some(NavDirection::Next));
        assert_eq!(window.offset, 20);
        assert_eq!(window.page, 3);

        let window = resolve_window(None, Some(2), Some(NavDirection::Previous));
        assert_eq!(window.offset, 0);
        assert_eq!(window.page, 1);
    }

    #[test]
    fn no_parameters_address_first_page() {
        assert_eq!(resolve_window(None, None, None), OffsetWindow::at(Some(0)));
    }
}
