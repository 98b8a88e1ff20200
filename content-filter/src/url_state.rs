use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// 同步到地址栏的那部分视图状态
///
/// 只有领域、透镜和展开记录三项会进入 URL：
/// `?domain=product&lens=outcomes` 加上 `#metric=<slug>`。
///
/// 序列化不做百分号编码：这三项的取值都是 slug
/// （字母、数字、`-`、`_`），不含 `&`、`=`、`#` 等保留字符。
/// 含保留字符的值无法无损往返，不在支持范围内。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    /// 领域选择
    pub domain: Option<String>,
    /// 透镜（展示视角）选择
    pub lens: Option<String>,
    /// 展开的记录 id，序列化到 hash 片段
    pub expanded: Option<String>,
}

impl UrlState {
    /// 从查询串和 hash 片段解析（两者都可带或不带前导符号）
    /// 未知参数一律忽略，缺失的部分保持 None，永不报错
    pub fn parse(query: &str, hash: &str) -> Self {
        let mut state = UrlState::default();

        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if value.is_empty() {
                    continue;
                }
                match key {
                    "domain" => state.domain = Some(value.to_string()),
                    "lens" => state.lens = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let hash = hash.strip_prefix('#').unwrap_or(hash);
        if let Some(slug) = hash.strip_prefix("metric=") {
            if !slug.is_empty() {
                state.expanded = Some(slug.to_string());
            }
        }

        state
    }

    /// 序列化为查询串（带前导 '?'；无内容时为空字符串）
    pub fn query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(domain) = &self.domain {
            parts.push(format!("domain={}", domain));
        }
        if let Some(lens) = &self.lens {
            parts.push(format!("lens={}", lens));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }

    /// 序列化为 hash 片段（带前导 '#'；无展开记录时为空字符串）
    pub fn hash_fragment(&self) -> String {
        match &self.expanded {
            Some(slug) => format!("#metric={}", slug),
            None => String::new(),
        }
    }
}

/// 地址栏读写接口 - 把浏览器全局状态收敛成一个可注入的依赖
///
/// `replace` 必须以替换方式写入（不产生历史记录条目），
/// 这样前进/后退不会在每次筛选之间跳动。
pub trait UrlStateStore {
    /// 读取当前地址栏中的视图状态
    fn read(&self) -> Result<UrlState, String>;
    /// 用给定状态替换地址栏，不压入历史记录
    fn replace(&self, state: &UrlState) -> Result<(), String>;
}

/// 基于浏览器 History/Location 的地址栏读写实现
pub struct BrowserUrlStore;

impl UrlStateStore for BrowserUrlStore {
    fn read(&self) -> Result<UrlState, String> {
        let window = web_sys::window().ok_or("无法获取 window 对象")?;
        let location = window.location();
        let search = location.search().map_err(|_| "无法读取查询串")?;
        let hash = location.hash().map_err(|_| "无法读取 hash 片段")?;
        Ok(UrlState::parse(&search, &hash))
    }

    fn replace(&self, state: &UrlState) -> Result<(), String> {
        let window = web_sys::window().ok_or("无法获取 window 对象")?;
        let location = window.location();
        let pathname = location.pathname().map_err(|_| "无法读取路径")?;
        let history = window.history().map_err(|_| "无法获取 history 对象")?;

        let url = format!("{}{}{}", pathname, state.query_string(), state.hash_fragment());
        // 使用 replaceState 而不是 pushState，避免污染历史记录
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(&url))
            .map_err(|_| "替换地址栏状态失败".to_string())
    }
}
