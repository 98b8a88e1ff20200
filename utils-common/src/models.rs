use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 内容记录元数据 - 站点内容的一条记录（演讲、活动、评价、指标）
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RecordMetadata {
    /// 记录唯一标识符（slug），同时作为 URL 可寻址句柄
    pub id: String,
    /// 记录类型：event（活动）、talk（演讲）、testimonial（评价）、metric（指标）
    #[serde(default = "default_kind")]
    pub kind: String,
    /// 标题
    pub title: String,
    /// 摘要
    #[serde(default)]
    pub summary: String,
    /// 日期（活动日期或发布日期），允许缺失
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// 主题标签列表
    #[serde(default)]
    pub tags: Vec<String>,
    /// 分类（conference、workshop、keynote 等），空字符串表示缺失
    #[serde(default)]
    pub category: String,
    /// 领域（community、product、leadership、speaking）
    #[serde(default)]
    pub domain: String,
    /// 城市
    #[serde(default)]
    pub city: String,
    /// 国家
    #[serde(default)]
    pub country: String,
    /// 热度计数（观看量或参与人数），用于热度排序
    #[serde(default)]
    pub popularity: u32,
    /// 是否有视频
    #[serde(default)]
    pub has_video: bool,
    /// 记录 URL 路径
    #[serde(default)]
    pub url: String,
}

/// 默认记录类型为event
fn default_kind() -> String {
    "event".to_string()
}
