use chrono::{DateTime, Datelike, Utc};
use std::collections::HashSet;

use utils_common::models::RecordMetadata;

use crate::models::FilterParams;
use crate::RecordIndex;

/// 解析维度筛选值，"all" 或空字符串表示该维度不激活
fn active_value(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() && v != "all" => Some(v),
        _ => None,
    }
}

/// 文本搜索匹配 - 在标题、摘要、城市、国家和标签上做大小写不敏感的子串匹配
/// 字段之间按 OR 组合，缺失字段（空字符串）自然不参与匹配
pub fn matches_query(record: &RecordMetadata, query_lower: &str) -> bool {
    if record.title.to_lowercase().contains(query_lower)
        || record.summary.to_lowercase().contains(query_lower)
        || record.city.to_lowercase().contains(query_lower)
        || record.country.to_lowercase().contains(query_lower)
    {
        return true;
    }
    record
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(query_lower))
}

/// 应用筛选条件，返回候选记录位置列表
///
/// 返回值始终按源顺序（位置升序）排列：结果的最终顺序只由排序阶段决定，
/// 筛选阶段不能引入自己的顺序。各维度之间按 AND 组合。
pub fn apply_filters(index: &RecordIndex, params: &FilterParams, now: DateTime<Utc>) -> Vec<usize> {
    // 初始化候选记录位置集合，默认包含所有记录
    let mut candidate_ids: HashSet<usize> = (0..index.records.len()).collect();

    // 标签筛选（标签之间 OR 组合）
    if let Some(tags) = &params.tags {
        if !tags.is_empty() {
            let tag_candidates = filter_by_tags(index, tags);
            candidate_ids.retain(|id| tag_candidates.contains(id));
        }
    }

    // 记录类型筛选
    if let Some(kind) = active_value(&params.kind) {
        candidate_ids.retain(|&id| index.records[id].kind == kind);
    }

    // 分类筛选
    if let Some(category) = active_value(&params.category) {
        candidate_ids.retain(|&id| index.records[id].category == category);
    }

    // 领域筛选
    if let Some(domain) = active_value(&params.domain) {
        candidate_ids.retain(|&id| index.records[id].domain == domain);
    }

    // 国家筛选
    if let Some(country) = active_value(&params.country) {
        candidate_ids.retain(|&id| index.records[id].country == country);
    }

    // 年份筛选（无日期的记录不匹配任何年份）
    if let Some(year) = params.year {
        candidate_ids.retain(|&id| {
            index.records[id]
                .date
                .map(|d| d.year() == year)
                .unwrap_or(false)
        });
    }

    // 视频筛选（只在要求"仅有视频"时激活）
    if params.has_video == Some(true) {
        candidate_ids.retain(|&id| index.records[id].has_video);
    }

    // 时间窗口筛选（按天粒度与"现在"比较，无日期的记录不属于未来也不属于过去）
    if let Some(time) = active_value(&params.time) {
        let today = now.date_naive();
        match time {
            "upcoming" => {
                candidate_ids.retain(|&id| {
                    index.records[id]
                        .date
                        .map(|d| d.date_naive() >= today)
                        .unwrap_or(false)
                });
            }
            "past" => {
                candidate_ids.retain(|&id| {
                    index.records[id]
                        .date
                        .map(|d| d.date_naive() < today)
                        .unwrap_or(false)
                });
            }
            _ => {}
        }
    }

    // 日期范围筛选
    if let Some(date_param) = &params.date {
        if date_param != "all" {
            apply_date_range(index, &mut candidate_ids, date_param);
        }
    }

    // 文本搜索
    if let Some(query) = &params.query {
        let query_lower = query.trim().to_lowercase();
        if !query_lower.is_empty() {
            candidate_ids.retain(|&id| matches_query(&index.records[id], &query_lower));
        }
    }

    // 恢复源顺序
    let mut result: Vec<usize> = candidate_ids.into_iter().collect();
    result.sort_unstable();
    result
}

// 按标签筛选，返回匹配任一标签的记录位置集合
fn filter_by_tags(index: &RecordIndex, tags: &[String]) -> HashSet<usize> {
    let mut result = HashSet::new();

    for tag in tags {
        if let Some(record_ids) = index.tag_index.get(tag) {
            for &id in record_ids {
                result.insert(id);
            }
        }
    }

    result
}

// 应用日期范围筛选（格式: "startDate,endDate"，任一端可为空）
fn apply_date_range(index: &RecordIndex, candidate_ids: &mut HashSet<usize>, date_param: &str) {
    let date_parts: Vec<&str> = date_param.split(',').collect();
    let start_date_str = date_parts.first().copied().unwrap_or("");
    let end_date_str = date_parts.get(1).copied().unwrap_or("");

    let start = if start_date_str.is_empty() {
        None
    } else {
        chrono::DateTime::parse_from_rfc3339(&format!("{}T00:00:00Z", start_date_str))
            .ok()
            .map(|d| d.with_timezone(&Utc))
    };
    let end = if end_date_str.is_empty() {
        None
    } else {
        chrono::DateTime::parse_from_rfc3339(&format!("{}T23:59:59Z", end_date_str))
            .ok()
            .map(|d| d.with_timezone(&Utc))
    };

    // 无法解析的日期范围不做任何筛选
    if start.is_none() && end.is_none() {
        return;
    }

    candidate_ids.retain(|&id| {
        let date = match index.records[id].date {
            Some(d) => d,
            None => return false,
        };
        if let Some(s) = start {
            if date < s {
                return false;
            }
        }
        if let Some(e) = end {
            if date > e {
                return false;
            }
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_index, record, record_with_date};

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn no_active_filters_returns_everything_in_source_order() {
        let index = build_index(vec![
            record("c", "Gamma"),
            record("a", "Alpha"),
            record("b", "Beta"),
        ]);
        let result = apply_filters(&index, &FilterParams::default(), now());
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let index = build_index(vec![
            record("1", "Advanced React Patterns"),
            record("2", "Go Concurrency"),
            record("3", "React Native Basics"),
        ]);
        let params = FilterParams {
            query: Some("react".to_string()),
            ..Default::default()
        };
        // 未排序时保持原有相对顺序
        assert_eq!(apply_filters(&index, &params, now()), vec![0, 2]);
    }

    #[test]
    fn query_matches_tags_and_location() {
        let mut by_tag = record("1", "Untitled");
        by_tag.tags = vec!["Testing".to_string()];
        let mut by_city = record("2", "Untitled");
        by_city.city = "Zurich".to_string();
        let index = build_index(vec![by_tag, by_city, record("3", "Untitled")]);

        let params = FilterParams {
            query: Some("testing".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0]);

        let params = FilterParams {
            query: Some("zur".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![1]);
    }

    #[test]
    fn all_sentinel_deactivates_dimension() {
        let mut a = record("1", "A");
        a.category = "workshop".to_string();
        let mut b = record("2", "B");
        b.category = "keynote".to_string();
        let index = build_index(vec![a, b]);

        let params = FilterParams {
            category: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()).len(), 2);

        let params = FilterParams {
            category: Some("workshop".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0]);
    }

    #[test]
    fn missing_category_never_matches() {
        // 缺失字段对等值筛选视为不匹配，而不是报错
        let index = build_index(vec![record("1", "A")]);
        let params = FilterParams {
            category: Some("workshop".to_string()),
            ..Default::default()
        };
        assert!(apply_filters(&index, &params, now()).is_empty());
    }

    #[test]
    fn tags_combine_with_or_and_with_other_dimensions_by_and() {
        let mut a = record("1", "A");
        a.tags = vec!["react".to_string()];
        a.country = "Switzerland".to_string();
        let mut b = record("2", "B");
        b.tags = vec!["rust".to_string()];
        b.country = "Germany".to_string();
        let mut c = record("3", "C");
        c.tags = vec!["go".to_string()];
        c.country = "Switzerland".to_string();
        let index = build_index(vec![a, b, c]);

        let params = FilterParams {
            tags: Some(vec!["react".to_string(), "rust".to_string()]),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0, 1]);

        let params = FilterParams {
            tags: Some(vec!["react".to_string(), "rust".to_string()]),
            country: Some("Switzerland".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0]);
    }

    #[test]
    fn has_video_flag_keeps_only_truthy_records() {
        let mut a = record("1", "A");
        a.has_video = true;
        let index = build_index(vec![a, record("2", "B")]);

        let params = FilterParams {
            has_video: Some(true),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0]);

        // has_video=false 表示维度不激活
        let params = FilterParams {
            has_video: Some(false),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()).len(), 2);
    }

    #[test]
    fn upcoming_window_is_day_granular() {
        let index = build_index(vec![
            record_with_date("past", "2023-05-10T09:00:00Z"),
            record_with_date("today-early", "2024-06-01T00:30:00Z"),
            record_with_date("future", "2025-01-20T18:00:00Z"),
            record("undated", "No date"),
        ]);

        let params = FilterParams {
            time: Some("upcoming".to_string()),
            ..Default::default()
        };
        // 当天的记录也算未来，即使时刻早于"现在"；无日期的记录不匹配
        assert_eq!(apply_filters(&index, &params, now()), vec![1, 2]);

        let params = FilterParams {
            time: Some("past".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0]);
    }

    #[test]
    fn year_filter_uses_record_year() {
        let index = build_index(vec![
            record_with_date("a", "2023-05-10T09:00:00Z"),
            record_with_date("b", "2024-02-01T09:00:00Z"),
            record("c", "No date"),
        ]);
        let params = FilterParams {
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![1]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let index = build_index(vec![
            record_with_date("a", "2024-01-15T09:00:00Z"),
            record_with_date("b", "2024-03-15T09:00:00Z"),
            record_with_date("c", "2024-05-15T09:00:00Z"),
        ]);
        let params = FilterParams {
            date: Some("2024-03-15,2024-05-15".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![1, 2]);

        let params = FilterParams {
            date: Some(",2024-03-15".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&index, &params, now()), vec![0, 1]);
    }

    #[test]
    fn result_is_always_subset_satisfying_every_predicate() {
        let mut a = record_with_date("a", "2024-08-01T09:00:00Z");
        a.tags = vec!["react".to_string()];
        a.kind = "talk".to_string();
        let mut b = record_with_date("b", "2024-09-01T09:00:00Z");
        b.tags = vec!["react".to_string()];
        b.kind = "event".to_string();
        let index = build_index(vec![a, b]);

        let params = FilterParams {
            tags: Some(vec!["react".to_string()]),
            kind: Some("talk".to_string()),
            time: Some("upcoming".to_string()),
            ..Default::default()
        };
        let result = apply_filters(&index, &params, now());
        assert_eq!(result, vec![0]);
        for &id in &result {
            let r = &index.records[id];
            assert_eq!(r.kind, "talk");
            assert!(r.tags.contains(&"react".to_string()));
        }
    }

    #[test]
    fn empty_index_yields_empty_result() {
        let index = build_index(vec![]);
        assert!(apply_filters(&index, &FilterParams::default(), now()).is_empty());
    }
}
