use serde::{Deserialize, Serialize};

use crate::models::FilterParams;
use crate::url_state::UrlState;

/// 每页默认条数
fn default_page_size() -> usize {
    12
}

/// 视图配置 - 组件挂载时一次性传入
#[derive(Deserialize, Debug, Clone)]
pub struct ViewConfig {
    /// 每页条数
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// 搜索输入防抖毫秒数，0 表示每次按键立即筛选
    /// 引擎本身同步计算，防抖由宿主在事件侧执行，这里只承载配置
    #[serde(default)]
    pub debounce_ms: u64,
    /// 领域分组的固定优先级顺序
    #[serde(default)]
    pub domain_priority: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: 0,
            domain_priority: Vec::new(),
        }
    }
}

/// 视图状态 - 单个组件实例的全部瞬时 UI 状态
///
/// 挂载时创建（可由 URL 播种），只存在于内存，组件卸载即丢弃；
/// 除地址栏外不写回任何存储。
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ViewState {
    /// 文本搜索，空字符串表示不筛选
    pub search_query: String,
    /// 记录类型选择，空字符串或 "all" 表示不筛选
    pub kind: String,
    /// 分类选择
    pub category: String,
    /// 领域选择
    pub domain: String,
    /// 国家选择
    pub country: String,
    /// 年份选择
    pub year: Option<i32>,
    /// 标签多选
    pub tags: Vec<String>,
    /// 仅保留有视频的记录
    pub has_video: bool,
    /// 时间窗口: "all"、"upcoming"、"past"（空字符串等同 "all"）
    pub time: String,
    /// 排序方式（空字符串表示默认排序）
    pub sort: String,
    /// 透镜（展示视角），只影响渲染，不影响序列
    pub lens: String,
    /// 当前页码（≥ 1）
    pub page: usize,
    /// 展开的记录 id，同一时刻最多一条
    pub expanded_id: Option<String>,
}

impl ViewState {
    /// 创建初始状态（第 1 页，全部维度不激活）
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    // 任何筛选/搜索/排序维度变化都回到第 1 页
    fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.reset_page();
    }

    pub fn set_kind(&mut self, kind: &str) {
        self.kind = kind.to_string();
        self.reset_page();
    }

    /// 切换分类标签页：除重置页码外还会收起已展开的记录
    pub fn set_category(&mut self, category: &str) {
        if self.category != category {
            self.expanded_id = None;
        }
        self.category = category.to_string();
        self.reset_page();
    }

    /// 切换领域标签页：除重置页码外还会收起已展开的记录
    pub fn set_domain(&mut self, domain: &str) {
        if self.domain != domain {
            self.expanded_id = None;
        }
        self.domain = domain.to_string();
        self.reset_page();
    }

    pub fn set_country(&mut self, country: &str) {
        self.country = country.to_string();
        self.reset_page();
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
        self.reset_page();
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
        self.reset_page();
    }

    /// 切换单个标签的选中状态
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
        self.reset_page();
    }

    pub fn set_has_video(&mut self, has_video: bool) {
        self.has_video = has_video;
        self.reset_page();
    }

    pub fn set_time(&mut self, time: &str) {
        self.time = time.to_string();
        self.reset_page();
    }

    pub fn set_sort(&mut self, sort: &str) {
        self.sort = sort.to_string();
        self.reset_page();
    }

    /// 透镜只改变展示方式，不改变序列，因此不重置页码
    pub fn set_lens(&mut self, lens: &str) {
        self.lens = lens.to_string();
    }

    /// 页码至少为 1；相对筛选结果的上限收敛在分页阶段完成
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// 展开/收起一条记录
    ///
    /// 状态机：Collapsed --toggle(id)--> Expanded(id)；
    /// Expanded(id) --toggle(id)--> Collapsed；
    /// Expanded(id) --toggle(id2)--> Expanded(id2)。
    /// 被筛掉的展开记录保留在内存中，直到再次切换或切换领域/分类标签页。
    pub fn toggle_expand(&mut self, id: &str) {
        if self.expanded_id.as_deref() == Some(id) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id.to_string());
        }
    }

    /// 投影为筛选参数
    pub fn to_filter_params(&self, page_size: usize) -> FilterParams {
        fn active(value: &str) -> Option<String> {
            if value.is_empty() || value == "all" {
                None
            } else {
                Some(value.to_string())
            }
        }

        FilterParams {
            query: if self.search_query.trim().is_empty() {
                None
            } else {
                Some(self.search_query.clone())
            },
            kind: active(&self.kind),
            category: active(&self.category),
            domain: active(&self.domain),
            country: active(&self.country),
            year: self.year,
            tags: if self.tags.is_empty() {
                None
            } else {
                Some(self.tags.clone())
            },
            has_video: if self.has_video { Some(true) } else { None },
            time: active(&self.time),
            date: None,
            sort: active(&self.sort),
            page: Some(self.page),
            limit: Some(page_size),
        }
    }

    /// 提取需要同步到地址栏的子集
    pub fn url_state(&self) -> UrlState {
        fn active(value: &str) -> Option<String> {
            if value.is_empty() || value == "all" {
                None
            } else {
                Some(value.to_string())
            }
        }

        UrlState {
            domain: active(&self.domain),
            lens: active(&self.lens),
            expanded: self.expanded_id.clone(),
        }
    }

    /// 从地址栏状态播种/回放（挂载时和 hashchange 时调用）
    pub fn apply_url_state(&mut self, url: &UrlState) {
        if let Some(domain) = &url.domain {
            self.set_domain(domain);
        }
        if let Some(lens) = &url.lens {
            self.set_lens(lens);
        }
        // 展开状态在领域应用之后恢复，避免被 set_domain 清掉
        self.expanded_id = url.expanded.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dimension_setter_resets_page() {
        let setters: Vec<(&str, fn(&mut ViewState))> = vec![
            ("search", |s| s.set_search_query("x")),
            ("kind", |s| s.set_kind("talk")),
            ("category", |s| s.set_category("workshop")),
            ("domain", |s| s.set_domain("product")),
            ("country", |s| s.set_country("Switzerland")),
            ("year", |s| s.set_year(Some(2024))),
            ("tags", |s| s.set_tags(vec!["react".to_string()])),
            ("toggle_tag", |s| s.toggle_tag("rust")),
            ("has_video", |s| s.set_has_video(true)),
            ("time", |s| s.set_time("upcoming")),
            ("sort", |s| s.set_sort("popularity")),
        ];

        for (name, setter) in setters {
            let mut state = ViewState::new();
            state.set_page(5);
            setter(&mut state);
            assert_eq!(state.page, 1, "设置 {} 后页码应回到 1", name);
        }
    }

    #[test]
    fn lens_change_keeps_page() {
        let mut state = ViewState::new();
        state.set_page(3);
        state.set_lens("outcomes");
        assert_eq!(state.page, 3);
    }

    #[test]
    fn set_page_floors_at_one() {
        let mut state = ViewState::new();
        state.set_page(0);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn expansion_state_machine() {
        let mut state = ViewState::new();
        assert!(state.expanded_id.is_none());

        state.toggle_expand("abc");
        assert_eq!(state.expanded_id.as_deref(), Some("abc"));

        // 切换另一条记录会替换展开状态，任何时刻最多一条展开
        state.toggle_expand("xyz");
        assert_eq!(state.expanded_id.as_deref(), Some("xyz"));

        state.toggle_expand("xyz");
        assert!(state.expanded_id.is_none());
    }

    #[test]
    fn domain_change_collapses_expansion() {
        let mut state = ViewState::new();
        state.toggle_expand("abc");
        state.set_domain("community");
        assert!(state.expanded_id.is_none());

        // 设置相同领域不算切换标签页
        state.toggle_expand("abc");
        state.set_domain("community");
        assert_eq!(state.expanded_id.as_deref(), Some("abc"));
    }

    #[test]
    fn category_change_collapses_expansion() {
        let mut state = ViewState::new();
        state.toggle_expand("abc");
        state.set_category("workshop");
        assert!(state.expanded_id.is_none());

        // 设置相同分类不算切换标签页
        state.toggle_expand("abc");
        state.set_category("workshop");
        assert_eq!(state.expanded_id.as_deref(), Some("abc"));
    }

    #[test]
    fn expansion_survives_filter_changes() {
        // 被筛掉的展开记录保留在内存里（不自动清除）
        let mut state = ViewState::new();
        state.toggle_expand("abc");
        state.set_search_query("nothing-matches");
        assert_eq!(state.expanded_id.as_deref(), Some("abc"));
    }

    #[test]
    fn filter_params_projection_maps_sentinels() {
        let mut state = ViewState::new();
        state.set_kind("all");
        state.set_time("");
        state.set_search_query("  ");
        let params = state.to_filter_params(10);
        assert!(params.kind.is_none());
        assert!(params.time.is_none());
        assert!(params.query.is_none());
        assert!(params.has_video.is_none());
        assert_eq!(params.limit, Some(10));

        state.set_kind("talk");
        state.set_has_video(true);
        state.toggle_tag("react");
        let params = state.to_filter_params(10);
        assert_eq!(params.kind.as_deref(), Some("talk"));
        assert_eq!(params.has_video, Some(true));
        assert_eq!(params.tags.as_deref(), Some(&["react".to_string()][..]));
        assert_eq!(params.page, Some(1));
    }

    #[test]
    fn url_round_trip_reconstructs_view() {
        let mut state = ViewState::new();
        state.set_domain("product");
        state.set_lens("outcomes");
        state.toggle_expand("retention");

        let url = state.url_state();
        let parsed = crate::url_state::UrlState::parse(&url.query_string(), &url.hash_fragment());

        let mut restored = ViewState::new();
        restored.apply_url_state(&parsed);
        assert_eq!(restored.domain, "product");
        assert_eq!(restored.lens, "outcomes");
        assert_eq!(restored.expanded_id.as_deref(), Some("retention"));
    }

    #[test]
    fn view_config_defaults() {
        let config: ViewConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.debounce_ms, 0);
        assert!(config.domain_priority.is_empty());
    }
}
