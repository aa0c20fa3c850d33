//! Fixed-page-size slicing and page-count computation.

/// Offset/limit pair for a page fetch plus the total page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub offset: i64,
    pub limit: i64,
    pub page_count: u32,
}

/// A `page` beyond the last page is not an error; it yields an empty fetch
/// (callers may be mid-navigation while data changes underneath them).
pub fn paginate(total_count: i64, page_size: u32, page: u32) -> PageSlice {
    PageSlice {
        offset: i64::from(page) * i64::from(page_size),
        limit: i64::from(page_size),
        page_count: page_count(total_count, page_size),
    }
}

pub fn page_count(total_count: i64, page_size: u32) -> u32 {
    if total_count <= 0 || page_size == 0 {
        return 0;
    }
    (total_count as u64).div_ceil(u64::from(page_size)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(41, 20), 3);
    }

    #[test]
    fn consecutive_pages_cover_the_total_exactly() {
        for total in [0i64, 1, 19, 20, 21, 99, 100, 101] {
            let size = 20u32;
            let slices = page_count(total, size);
            let mut covered = 0i64;
            for page in 0..slices {
                let slice = paginate(total, size, page);
                assert_eq!(slice.offset, covered);
                covered += slice.limit.min(total - slice.offset);
            }
            assert_eq!(covered, total, "total: {total}");
        }
    }

    #[test]
    fn page_beyond_end_is_an_empty_fetch_not_an_error() {
        let slice = paginate(30, 20, 50);
        assert_eq!(slice.page_count, 2);
        assert_eq!(slice.offset, 1000);
        // The store will simply return no rows at this offset.
    }
}
