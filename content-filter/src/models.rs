use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utils_common::models::RecordMetadata;

/// 筛选索引（存储形式） - 记录列表加上各维度的倒排索引
#[derive(Serialize, Deserialize, Debug)]
pub struct FilterIndex {
    /// 所有记录的元数据列表
    pub records: Vec<RecordMetadata>,
    /// 标签到记录位置集合的映射
    pub tag_index: HashMap<String, HashSet<usize>>,
    /// 年份到记录位置集合的映射
    pub year_index: HashMap<i32, HashSet<usize>>,
    /// 分类到记录位置集合的映射
    pub category_index: HashMap<String, HashSet<usize>>,
    /// 国家到记录位置集合的映射
    pub country_index: HashMap<String, HashSet<usize>>,
    /// 领域到记录位置集合的映射
    pub domain_index: HashMap<String, HashSet<usize>>,
}

/// 筛选参数 - 客户端传递的筛选条件，各维度之间按 AND 组合
#[derive(Deserialize, Debug, Default, Clone)]
pub struct FilterParams {
    /// 文本搜索（可选），大小写不敏感的子串匹配
    pub query: Option<String>,
    /// 记录类型筛选（可选），"all" 或空字符串表示不筛选
    pub kind: Option<String>,
    /// 分类筛选（可选）
    pub category: Option<String>,
    /// 领域筛选（可选）
    pub domain: Option<String>,
    /// 国家筛选（可选）
    pub country: Option<String>,
    /// 年份筛选（可选）
    pub year: Option<i32>,
    /// 标签筛选条件（可选），标签之间按 OR 组合
    pub tags: Option<Vec<String>>,
    /// 只保留有视频的记录（可选）
    pub has_video: Option<bool>,
    /// 时间窗口: "all"、"upcoming"、"past"（可选）
    pub time: Option<String>,
    /// 日期筛选: "all" 或 "startDate,endDate" 格式的日期范围
    pub date: Option<String>,
    /// 排序方式: "date_desc", "date_asc", "title_asc", "title_desc", "popularity"（可选）
    pub sort: Option<String>,
    /// 分页 - 当前页码（可选，默认为1）
    pub page: Option<usize>,
    /// 分页 - 每页条数（可选，默认为12）
    pub limit: Option<usize>,
}

/// 筛选结果 - 返回给客户端的分页结果
#[derive(Serialize, Debug, Clone)]
pub struct FilterResult {
    /// 筛选后当前页的记录列表
    pub records: Vec<RecordMetadata>,
    /// 筛选结果总数
    pub total: usize,
    /// 当前页码
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    /// 总页数
    pub total_pages: usize,
}

/// 可选筛选值汇总 - 供客户端渲染筛选控件
#[derive(Serialize, Debug, Default)]
pub struct Facets {
    /// 全部标签（按字典序）
    pub tags: Vec<String>,
    /// 全部年份（降序）
    pub years: Vec<i32>,
    /// 全部分类（按字典序）
    pub categories: Vec<String>,
    /// 全部国家（按字典序）
    pub countries: Vec<String>,
    /// 全部领域（按字典序）
    pub domains: Vec<String>,
}

/// 按年份分组的一个桶
#[derive(Serialize, Debug, Clone)]
pub struct YearGroup {
    /// 年份（四位数字字符串，无日期的记录归入 "undated"）
    pub year: String,
    /// 该年份下的记录，保持传入顺序
    pub records: Vec<RecordMetadata>,
}

/// 按领域分组的一个桶
#[derive(Serialize, Debug, Clone)]
pub struct DomainGroup {
    /// 领域名
    pub domain: String,
    /// 该领域下的记录，保持传入顺序
    pub records: Vec<RecordMetadata>,
}

/// 时间线结果 - 将筛选结果分为未来与过去两部分，各自按年份分组
#[derive(Serialize, Debug)]
pub struct TimelineResult {
    /// 未来部分（年份升序，最近的在前）
    pub upcoming: Vec<YearGroup>,
    /// 过去部分（年份降序）
    pub past: Vec<YearGroup>,
    /// 筛选结果总数
    pub total: usize,
}
