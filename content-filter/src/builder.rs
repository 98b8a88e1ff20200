use chrono::Datelike;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;

use utils_common::compression::to_compressed;
use utils_common::models::RecordMetadata;

use crate::models::FilterIndex;

/// 筛选索引构建器
pub struct FilterBuilder {
    records: Vec<RecordMetadata>,
}

impl FilterBuilder {
    /// 创建新的筛选索引构建器
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// 获取构建器中的记录数量
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// 添加记录到索引构建器
    pub fn add_record(&mut self, record: RecordMetadata) {
        self.records.push(record);
    }

    /// 构建筛选索引
    pub fn build_filter_index(&self) -> Result<FilterIndex, String> {
        if self.records.is_empty() {
            return Err("无法构建索引: 没有记录数据".to_string());
        }

        println!("开始构建筛选索引，记录数量: {}", self.records.len());

        // 创建各维度的倒排索引
        let mut tag_index: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut year_index: HashMap<i32, HashSet<usize>> = HashMap::new();
        let mut category_index: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut country_index: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut domain_index: HashMap<String, HashSet<usize>> = HashMap::new();

        // 填充索引（空字符串表示字段缺失，不进入索引）
        for (i, record) in self.records.iter().enumerate() {
            for tag in &record.tags {
                tag_index.entry(tag.clone()).or_default().insert(i);
            }

            if let Some(date) = record.date {
                year_index.entry(date.year()).or_default().insert(i);
            }

            if !record.category.is_empty() {
                category_index
                    .entry(record.category.clone())
                    .or_default()
                    .insert(i);
            }

            if !record.country.is_empty() {
                country_index
                    .entry(record.country.clone())
                    .or_default()
                    .insert(i);
            }

            if !record.domain.is_empty() {
                domain_index
                    .entry(record.domain.clone())
                    .or_default()
                    .insert(i);
            }
        }

        println!(
            "索引构建完成，标签数量: {}, 年份数量: {}, 分类数量: {}, 领域数量: {}",
            tag_index.len(),
            year_index.len(),
            category_index.len(),
            domain_index.len()
        );

        Ok(FilterIndex {
            records: self.records.clone(),
            tag_index,
            year_index,
            category_index,
            country_index,
            domain_index,
        })
    }

    /// 保存筛选索引到文件
    pub fn save_filter_index(&self, path: &str) -> Result<(), String> {
        println!("开始保存筛选索引到文件: {}", path);

        let filter_index = self.build_filter_index()?;

        let mut filter_file =
            File::create(path).map_err(|e| format!("无法创建筛选索引文件: {}", e))?;

        // 当前索引格式版本为1.0
        let version = [1, 0];

        let compressed_data = to_compressed(&filter_index, version)
            .map_err(|e| format!("压缩筛选索引失败: {}", e))?;

        filter_file
            .write_all(&compressed_data)
            .map_err(|e| format!("无法写入筛选索引文件: {}", e))?;

        println!(
            "筛选索引已成功写入文件: {}，大小: {} 字节",
            path,
            compressed_data.len()
        );

        Ok(())
    }
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
