use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    pub max_page: i64,
    pub next_page: Option<i64>,
    pub prev_page: Option<i64>,
}

/// `(offset, limit)` of the half-open window `[page * page_size, (page + 1) * page_size)`.
pub fn bounds(page: u32, page_size: i64) -> (i64, i64) {
    (i64::from(page) * page_size, page_size)
}

/// computes navigation for `page` over `total_count` items.
///
/// `max_page` is `total_count / page_size`, so a count that is an exact
/// multiple of the page size has one trailing empty page.
pub fn pagination_info(total_count: i64, page: i64, page_size: i64) -> Result<PageInfo, AppError> {
    let max_page = total_count / page_size;

    if page < 0 || page > max_page {
        return Err(AppError::NotFound);
    }

    Ok(PageInfo {
        max_page,
        next_page: (page < max_page).then_some(page + 1),
        prev_page: (page > 0).then_some(page - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_no_previous() {
        for (total, size) in [(0, 30), (1, 30), (29, 30), (30, 30), (95, 30), (7, 3)] {
            let info = pagination_info(total, 0, size).unwrap();
            assert_eq!(info.prev_page, None, "total={total} size={size}");
        }
    }

    #[test]
    fn last_page_has_no_next() {
        for (total, size) in [(0, 30), (1, 30), (29, 30), (30, 30), (95, 30), (7, 3)] {
            let info = pagination_info(total, total / size, size).unwrap();
            assert_eq!(info.next_page, None, "total={total} size={size}");
        }
    }

    #[test]
    fn exact_multiple_keeps_trailing_empty_page() {
        let info = pagination_info(30, 1, 30).unwrap();
        assert_eq!(
            info,
            PageInfo {
                max_page: 1,
                next_page: None,
                prev_page: Some(0),
            }
        );

        assert!(matches!(pagination_info(30, 2, 30), Err(AppError::NotFound)));
    }

    #[test]
    fn middle_page_links_both_ways() {
        let info = pagination_info(95, 1, 30).unwrap();
        assert_eq!(info.max_page, 3);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.prev_page, Some(0));
    }

    #[test]
    fn negative_page_is_not_found() {
        assert!(matches!(pagination_info(95, -1, 30), Err(AppError::NotFound)));
    }

    #[test]
    fn bounds_follow_page_size() {
        assert_eq!(bounds(0, 30), (0, 30));
        assert_eq!(bounds(4, 30), (120, 30));
    }
}
