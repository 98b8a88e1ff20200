/// 页窗口 - 对已筛选、已排序的序列做的一次切片计算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 实际页码（已收敛到合法区间）
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    /// 总条数
    pub total: usize,
    /// 总页数（空集为 0）
    pub total_pages: usize,
    /// 切片起始位置（含）
    pub start: usize,
    /// 切片结束位置（不含）
    pub end: usize,
}

/// 计算页窗口
///
/// 页码收敛到 [1, max(total_pages, 1)]：空集也停留在第 1 页，
/// 超出范围的页码收敛到最后一页，不存在非法状态。
pub fn paginate(total: usize, page: usize, limit: usize) -> PageWindow {
    let limit = limit.max(1);
    let total_pages = (total + limit - 1) / limit;
    let page = page.max(1).min(total_pages.max(1));

    let start = (page - 1) * limit;
    let end = (start + limit).min(total);
    // 空集时 start 可能越过 total
    let start = start.min(total);

    PageWindow {
        page,
        limit,
        total,
        total_pages,
        start,
        end,
    }
}

/// 取出当前页的切片
pub fn page_slice<'a, T>(items: &'a [T], window: &PageWindow) -> &'a [T] {
    &items[window.start..window.end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_partial_page() {
        // 25 条记录、每页 10 条：第 3 页是第 21-25 条
        let window = paginate(25, 3, 10);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.start, 20);
        assert_eq!(window.end, 25);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let window = paginate(25, 4, 10);
        assert_eq!(window.page, 3);
        assert_eq!(window.start, 20);
    }

    #[test]
    fn page_zero_clamps_to_first() {
        let window = paginate(25, 0, 10);
        assert_eq!(window.page, 1);
        assert_eq!(window.start, 0);
        assert_eq!(window.end, 10);
    }

    #[test]
    fn empty_set_stays_on_page_one_with_zero_pages() {
        let window = paginate(0, 5, 10);
        assert_eq!(window.page, 1);
        assert_eq!(window.total_pages, 0);
        assert_eq!(window.start, 0);
        assert_eq!(window.end, 0);
    }

    #[test]
    fn evenly_divisible_total() {
        let window = paginate(30, 3, 10);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.end - window.start, 10);
    }

    #[test]
    fn concatenated_pages_equal_whole_sequence() {
        let items: Vec<usize> = (0..25).collect();
        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let window = paginate(items.len(), page, 10);
            collected.extend_from_slice(page_slice(&items, &window));
            if page >= window.total_pages {
                break;
            }
            page += 1;
        }
        assert_eq!(collected, items);
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        let window = paginate(3, 1, 0);
        assert_eq!(window.limit, 1);
        assert_eq!(window.total_pages, 3);
    }
}
