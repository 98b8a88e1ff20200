use chrono::{DateTime, Utc};
use utils_common::models::RecordMetadata;

/// 排序键：缺失日期按 Unix 纪元参与比较
/// 注意：这会让无日期的记录在 date_asc 下排最前、date_desc 下排最后，
/// 调用方需要知晓这一行为
fn date_key(record: &RecordMetadata) -> DateTime<Utc> {
    record.date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// 标题比较键：小写折叠后比较，原始字符串作为次键保证确定性
fn title_key(record: &RecordMetadata) -> (String, &str) {
    (record.title.to_lowercase(), record.title.as_str())
}

/// 应用排序 - 全部使用稳定排序，相等键保持传入的相对顺序
/// （分组阶段依赖上游顺序稳定）
pub fn apply_sorting(records: &mut [RecordMetadata], sort: Option<&str>) {
    match sort {
        Some("date_asc") => {
            records.sort_by(|a, b| date_key(a).cmp(&date_key(b)));
        }
        Some("title_asc") => {
            records.sort_by(|a, b| title_key(a).cmp(&title_key(b)));
        }
        Some("title_desc") => {
            records.sort_by(|a, b| title_key(b).cmp(&title_key(a)));
        }
        Some("popularity") => {
            // 热度降序，平手保持传入顺序
            records.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        }
        _ => {
            // 默认按日期降序（最新在前）
            records.sort_by(|a, b| date_key(b).cmp(&date_key(a)));
        }
    }
}
