use wasm_bindgen::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use once_cell::sync::OnceCell;
use std::sync::Mutex;
use web_sys::console;
use utils_common::compression as utils;
use utils_common::models::RecordMetadata;

// 导出模块
pub mod models;
pub mod builder;
pub mod filter;
pub mod sort;
pub mod group;
pub mod paginate;
pub mod view_state;
pub mod url_state;

use models::{Facets, FilterIndex, FilterParams, FilterResult, TimelineResult};
use url_state::{BrowserUrlStore, UrlState, UrlStateStore};
use view_state::{ViewConfig, ViewState};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

// 全局索引存储
static INDEX: OnceCell<Mutex<Option<RecordIndex>>> = OnceCell::new();

// 最近一次查询的备忘：备忘键 -> 结果
// 记录集不大，完整重算并不贵，这里只挡掉无关重渲染引起的重复查询。
// 备忘键除参数 JSON 外还包含当天日期：时间窗口筛选依赖"今天"，
// 跨天之后相同参数必须重新计算，不能返回昨天的分区
static LAST_QUERY: OnceCell<Mutex<Option<(String, FilterResult)>>> = OnceCell::new();

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    "1.0.0".to_string()
}

/// 记录索引（运行时形式）- 存储所有记录和各维度索引
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    /// 所有记录的元数据列表
    pub records: Vec<RecordMetadata>,
    /// 标签索引: 标签名 -> 记录位置列表
    pub tag_index: HashMap<String, Vec<usize>>,
    /// 年份索引
    pub year_index: HashMap<i32, Vec<usize>>,
    /// 分类索引
    pub category_index: HashMap<String, Vec<usize>>,
    /// 国家索引
    pub country_index: HashMap<String, Vec<usize>>,
    /// 领域索引
    pub domain_index: HashMap<String, Vec<usize>>,
}

impl RecordIndex {
    /// 从压缩的二进制数据恢复索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, String> {
        let filter_index = utils::from_compressed_with_max_version::<FilterIndex>(data, 1)
            .map_err(|e| format!("解析索引失败: {}", e))?;
        Ok(Self::from_filter_index(filter_index))
    }

    // 将FilterIndex转换为运行时索引
    fn from_filter_index(filter_index: FilterIndex) -> Self {
        fn to_vec_index<K: std::hash::Hash + Eq>(
            index: HashMap<K, std::collections::HashSet<usize>>,
        ) -> HashMap<K, Vec<usize>> {
            index
                .into_iter()
                .map(|(key, ids)| (key, ids.into_iter().collect::<Vec<_>>()))
                .collect()
        }

        RecordIndex {
            records: filter_index.records,
            tag_index: to_vec_index(filter_index.tag_index),
            year_index: to_vec_index(filter_index.year_index),
            category_index: to_vec_index(filter_index.category_index),
            country_index: to_vec_index(filter_index.country_index),
            domain_index: to_vec_index(filter_index.domain_index),
        }
    }
}

/// 内容过滤器 - 组合筛选、排序、分组、分页各阶段
pub struct ContentFilter;

impl ContentFilter {
    /// 加载索引数据到全局存储
    pub fn load_index(data: &[u8]) -> Result<(), String> {
        let record_index = RecordIndex::from_compressed(data)?;

        let cell = INDEX.get_or_init(|| Mutex::new(None));
        let mut guard = cell.lock().map_err(|_| "获取索引锁失败")?;
        *guard = Some(record_index);

        // 新索引使旧的查询备忘失效
        if let Some(memo) = LAST_QUERY.get() {
            if let Ok(mut memo_guard) = memo.lock() {
                *memo_guard = None;
            }
        }

        Ok(())
    }

    /// 在全局索引上执行一个只读操作
    pub fn with_index<T>(f: impl FnOnce(&RecordIndex) -> T) -> Result<T, String> {
        let index_mutex = INDEX.get().ok_or("索引未初始化")?;
        let index_guard = index_mutex.lock().map_err(|_| "获取索引锁失败")?;
        let index = index_guard.as_ref().ok_or("索引为空")?;
        Ok(f(index))
    }

    /// 汇总所有可选筛选值
    pub fn facets(index: &RecordIndex) -> Facets {
        let mut tags: Vec<String> = index.tag_index.keys().cloned().collect();
        tags.sort();
        let mut years: Vec<i32> = index.year_index.keys().copied().collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        let mut categories: Vec<String> = index.category_index.keys().cloned().collect();
        categories.sort();
        let mut countries: Vec<String> = index.country_index.keys().cloned().collect();
        countries.sort();
        let mut domains: Vec<String> = index.domain_index.keys().cloned().collect();
        domains.sort();

        Facets {
            tags,
            years,
            categories,
            countries,
            domains,
        }
    }

    /// 筛选记录：筛选 -> 排序 -> 分页
    pub fn filter_records(
        index: &RecordIndex,
        params: &FilterParams,
        now: DateTime<Utc>,
    ) -> FilterResult {
        let candidate_ids = filter::apply_filters(index, params, now);

        // 按源顺序取出记录元数据
        let mut filtered: Vec<RecordMetadata> = candidate_ids
            .into_iter()
            .filter_map(|id| index.records.get(id).cloned())
            .collect();

        // 排序
        sort::apply_sorting(&mut filtered, params.sort.as_deref());

        // 分页
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(12);
        let window = paginate::paginate(filtered.len(), page, limit);
        let records = paginate::page_slice(&filtered, &window).to_vec();

        FilterResult {
            records,
            total: window.total,
            page: window.page,
            limit: window.limit,
            total_pages: window.total_pages,
        }
    }

    /// 带备忘的筛选：解析参数 JSON 并在全局索引上执行筛选
    ///
    /// 备忘键为"当天日期 + 参数 JSON"。同一天内参数不变时直接命中缓存；
    /// 跨过日历日界限后键值变化，upcoming/past 分区会重新计算。
    pub fn filter_records_cached(
        params_json: &str,
        now: DateTime<Utc>,
    ) -> Result<FilterResult, String> {
        let memo = LAST_QUERY.get_or_init(|| Mutex::new(None));
        let memo_key = format!("{}|{}", now.date_naive(), params_json);

        if let Ok(guard) = memo.lock() {
            if let Some((cached_key, cached_result)) = guard.as_ref() {
                if cached_key == &memo_key {
                    return Ok(cached_result.clone());
                }
            }
        }

        let params: FilterParams =
            serde_json::from_str(params_json).map_err(|e| format!("解析参数失败: {}", e))?;

        let result = Self::with_index(|index| Self::filter_records(index, &params, now))?;

        if let Ok(mut guard) = memo.lock() {
            *guard = Some((memo_key, result.clone()));
        }

        Ok(result)
    }

    /// 时间线视图：筛选 -> 排序 -> 按时间切分并按年份分组（不分页）
    ///
    /// 未指定排序时，未来部分按日期升序（最近的在前）、
    /// 过去部分按日期降序，这是时间线的自然阅读顺序。
    pub fn timeline_records(
        index: &RecordIndex,
        params: &FilterParams,
        now: DateTime<Utc>,
    ) -> TimelineResult {
        let candidate_ids = filter::apply_filters(index, params, now);
        let mut filtered: Vec<RecordMetadata> = candidate_ids
            .into_iter()
            .filter_map(|id| index.records.get(id).cloned())
            .collect();

        if params.sort.is_some() {
            sort::apply_sorting(&mut filtered, params.sort.as_deref());
            return group::timeline(&filtered, now);
        }

        let total = filtered.len();
        let (mut upcoming, mut past) = group::split_by_time(&filtered, now);
        sort::apply_sorting(&mut upcoming, Some("date_asc"));
        sort::apply_sorting(&mut past, Some("date_desc"));
        TimelineResult {
            upcoming: group::group_by_year(&upcoming, group::YearOrder::Ascending),
            past: group::group_by_year(&past, group::YearOrder::Descending),
            total,
        }
    }
}

/// 内容过滤器JS接口 - 提供给JavaScript使用的筛选API
#[wasm_bindgen]
pub struct ContentFilterJS;

#[wasm_bindgen]
impl ContentFilterJS {
    /// 初始化过滤器并加载索引
    #[wasm_bindgen]
    pub fn init(index_data: &[u8]) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        ContentFilter::load_index(index_data).map_err(|e| {
            console::log_1(&JsValue::from_str(&format!("初始化过滤器失败: {}", e)));
            JsValue::from_str(&e)
        })
    }

    /// 获取所有可选筛选值
    #[wasm_bindgen]
    pub fn get_facets() -> Result<JsValue, JsValue> {
        let facets = ContentFilter::with_index(ContentFilter::facets)
            .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&facets)
            .map_err(|e| JsValue::from_str(&format!("序列化筛选值失败: {}", e)))
    }

    /// 筛选记录（带最近一次查询的备忘，同一天内参数不变时命中缓存）
    #[wasm_bindgen]
    pub fn filter_records(params_json: &str) -> Result<JsValue, JsValue> {
        let result = ContentFilter::filter_records_cached(params_json, Utc::now())
            .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
    }

    /// 时间线视图
    #[wasm_bindgen]
    pub fn timeline(params_json: &str) -> Result<JsValue, JsValue> {
        let params: FilterParams = serde_json::from_str(params_json)
            .map_err(|e| JsValue::from_str(&format!("解析参数失败: {}", e)))?;

        let result = ContentFilter::with_index(|index| {
            ContentFilter::timeline_records(index, &params, Utc::now())
        })
        .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
    }
}

/// 集合视图 - 单个UI组件实例持有的视图状态及其操作
///
/// 每个组件实例独立拥有一份状态，互不共享；
/// 状态只存在于内存，除地址栏外不落任何存储。
#[wasm_bindgen]
pub struct CollectionView {
    state: ViewState,
    config: ViewConfig,
}

#[wasm_bindgen]
impl CollectionView {
    /// 创建视图实例（配置为 JSON，空字符串使用默认配置）
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<CollectionView, JsValue> {
        let config: ViewConfig = if config_json.trim().is_empty() {
            ViewConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("解析视图配置失败: {}", e)))?
        };

        Ok(CollectionView {
            state: ViewState::new(),
            config,
        })
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.state.set_search_query(query);
    }

    pub fn set_kind(&mut self, kind: &str) {
        self.state.set_kind(kind);
    }

    pub fn set_category(&mut self, category: &str) {
        self.state.set_category(category);
    }

    pub fn set_domain(&mut self, domain: &str) {
        self.state.set_domain(domain);
    }

    pub fn set_country(&mut self, country: &str) {
        self.state.set_country(country);
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.state.set_year(year);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.state.set_tags(tags);
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.state.toggle_tag(tag);
    }

    pub fn set_has_video(&mut self, has_video: bool) {
        self.state.set_has_video(has_video);
    }

    pub fn set_time(&mut self, time: &str) {
        self.state.set_time(time);
    }

    pub fn set_sort(&mut self, sort: &str) {
        self.state.set_sort(sort);
    }

    pub fn set_lens(&mut self, lens: &str) {
        self.state.set_lens(lens);
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    pub fn toggle_expand(&mut self, id: &str) {
        self.state.toggle_expand(id);
    }

    /// 当前页码
    pub fn page(&self) -> usize {
        self.state.page
    }

    /// 当前展开的记录 id
    pub fn expanded_id(&self) -> Option<String> {
        self.state.expanded_id.clone()
    }

    /// 当前透镜
    pub fn lens(&self) -> String {
        self.state.lens.clone()
    }

    /// 搜索防抖毫秒数（由宿主在事件侧执行）
    pub fn debounce_ms(&self) -> u64 {
        self.config.debounce_ms
    }

    /// 当前视图状态（供宿主渲染或调试）
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state)
            .map_err(|e| JsValue::from_str(&format!("序列化视图状态失败: {}", e)))
    }

    /// 计算当前分页视图：筛选 -> 排序 -> 分页
    pub fn query(&self) -> Result<JsValue, JsValue> {
        let params = self.state.to_filter_params(self.config.page_size);
        let result =
            ContentFilter::with_index(|index| ContentFilter::filter_records(index, &params, Utc::now()))
                .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
    }

    /// 计算时间线视图（未来在前，过去在后，各自按年份分组）
    pub fn timeline(&self) -> Result<JsValue, JsValue> {
        let params = self.state.to_filter_params(self.config.page_size);
        let result = ContentFilter::with_index(|index| {
            ContentFilter::timeline_records(index, &params, Utc::now())
        })
        .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
    }

    /// 计算按领域分组的视图（不分页，桶顺序由配置的优先级决定）
    pub fn grouped(&self) -> Result<JsValue, JsValue> {
        let params = self.state.to_filter_params(self.config.page_size);
        let priority = self.config.domain_priority.clone();

        let groups = ContentFilter::with_index(|index| {
            let candidate_ids = filter::apply_filters(index, &params, Utc::now());
            let mut filtered: Vec<RecordMetadata> = candidate_ids
                .into_iter()
                .filter_map(|id| index.records.get(id).cloned())
                .collect();
            sort::apply_sorting(&mut filtered, params.sort.as_deref());
            group::group_by_domain(&filtered, &priority)
        })
        .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&groups)
            .map_err(|e| JsValue::from_str(&format!("序列化分组结果失败: {}", e)))
    }

    /// 当前状态对应的查询串（带 '?'，可能为空）
    pub fn url_query(&self) -> String {
        self.state.url_state().query_string()
    }

    /// 当前状态对应的 hash 片段（带 '#'，可能为空）
    pub fn url_hash(&self) -> String {
        self.state.url_state().hash_fragment()
    }

    /// 从给定的查询串与 hash 片段回放状态（hashchange 时由宿主调用）
    pub fn apply_url(&mut self, query: &str, hash: &str) {
        let url = UrlState::parse(query, hash);
        self.state.apply_url_state(&url);
    }

    /// 把当前状态写入地址栏（replaceState，不压历史记录）
    pub fn sync_url(&self) -> Result<(), JsValue> {
        BrowserUrlStore
            .replace(&self.state.url_state())
            .map_err(|e| JsValue::from_str(&e))
    }

    /// 从地址栏播种状态（组件挂载时调用）
    pub fn load_url(&mut self) -> Result<(), JsValue> {
        let url = BrowserUrlStore.read().map_err(|e| JsValue::from_str(&e))?;
        self.state.apply_url_state(&url);
        Ok(())
    }
}
