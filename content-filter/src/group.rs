use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;

use utils_common::models::RecordMetadata;

use crate::models::{DomainGroup, TimelineResult, YearGroup};

/// 无日期记录所在的年份桶
pub const UNDATED_KEY: &str = "undated";

/// 年份桶的迭代顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearOrder {
    /// 升序（未来视图：最近的年份在前）
    Ascending,
    /// 降序（过去/全部视图：最新的年份在前）
    Descending,
}

/// 按年份分组 - 只对已排序的序列做划分，桶内保持传入顺序
/// 无日期的记录归入末尾的 "undated" 桶
pub fn group_by_year(records: &[RecordMetadata], order: YearOrder) -> Vec<YearGroup> {
    let mut buckets: HashMap<i32, Vec<RecordMetadata>> = HashMap::new();
    let mut undated: Vec<RecordMetadata> = Vec::new();

    for record in records {
        match record.date {
            Some(date) => buckets.entry(date.year()).or_default().push(record.clone()),
            None => undated.push(record.clone()),
        }
    }

    let mut years: Vec<i32> = buckets.keys().copied().collect();
    match order {
        YearOrder::Ascending => years.sort_unstable(),
        YearOrder::Descending => {
            years.sort_unstable();
            years.reverse();
        }
    }

    let mut groups: Vec<YearGroup> = years
        .into_iter()
        .map(|year| YearGroup {
            year: year.to_string(),
            records: buckets.remove(&year).unwrap_or_default(),
        })
        .collect();

    if !undated.is_empty() {
        groups.push(YearGroup {
            year: UNDATED_KEY.to_string(),
            records: undated,
        });
    }

    groups
}

/// 按领域分组 - 桶顺序遵循调用方给定的优先级列表，
/// 未列出的领域按首次出现顺序追加在后
pub fn group_by_domain(records: &[RecordMetadata], priority: &[String]) -> Vec<DomainGroup> {
    let mut buckets: HashMap<String, Vec<RecordMetadata>> = HashMap::new();
    let mut seen_order: Vec<String> = Vec::new();

    for record in records {
        if !buckets.contains_key(&record.domain) {
            seen_order.push(record.domain.clone());
        }
        buckets
            .entry(record.domain.clone())
            .or_default()
            .push(record.clone());
    }

    let mut groups: Vec<DomainGroup> = Vec::new();

    for domain in priority {
        if let Some(records) = buckets.remove(domain) {
            groups.push(DomainGroup {
                domain: domain.clone(),
                records,
            });
        }
    }

    for domain in seen_order {
        if let Some(records) = buckets.remove(&domain) {
            groups.push(DomainGroup { domain, records });
        }
    }

    groups
}

/// 按时间切分 - 以天粒度把记录分为未来与过去两部分
/// 无日期的记录归入过去部分（它们不属于未来），两部分内部都保持传入顺序
pub fn split_by_time(
    records: &[RecordMetadata],
    now: DateTime<Utc>,
) -> (Vec<RecordMetadata>, Vec<RecordMetadata>) {
    let today = now.date_naive();
    let mut upcoming = Vec::new();
    let mut past = Vec::new();

    for record in records {
        match record.date {
            Some(date) if date.date_naive() >= today => upcoming.push(record.clone()),
            _ => past.push(record.clone()),
        }
    }

    (upcoming, past)
}

/// 时间线视图 - 未来部分在前（年份升序），过去部分在后（年份降序）
pub fn timeline(records: &[RecordMetadata], now: DateTime<Utc>) -> TimelineResult {
    let total = records.len();
    let (upcoming, past) = split_by_time(records, now);
    TimelineResult {
        upcoming: group_by_year(&upcoming, YearOrder::Ascending),
        past: group_by_year(&past, YearOrder::Descending),
        total,
    }
}
