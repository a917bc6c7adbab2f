//! 请求/响应的数据定义
//!
//! FormState 按后端约定以 snake_case JSON 发送；GenerateResponse 的 citations
//! 字段可缺省（缺省按空序列处理）。表单只被 UI 的字段编辑事件修改，网络层不碰它。

use serde::{Deserialize, Serialize};

/// 用户在表单里选的生成参数（POST /generate-posts 的请求体）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormState {
    pub topic: String,
    pub tone: String,
    pub audience: String,
    /// short / medium / long
    pub length: String,
    pub include_hashtags: bool,
    pub include_cta: bool,
    /// 每次生成的帖子数，3..=5
    pub post_count: u8,
    pub language: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            topic: String::new(),
            tone: "professional".to_string(),
            audience: "general".to_string(),
            length: "medium".to_string(),
            include_hashtags: true,
            include_cta: true,
            post_count: 3,
            language: "english".to_string(),
        }
    }
}

impl FormState {
    /// 话题是否为空白（空白话题禁止发起请求）
    pub fn topic_is_blank(&self) -> bool {
        self.topic.trim().is_empty()
    }
}

/// 下拉选项：{value, label}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// 单条生成的帖子
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default)]
    pub tone_used: String,
    #[serde(default)]
    pub estimated_engagement: String,
}

/// 来源引用（标题、摘要、链接）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// 一次成功生成的指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub generation_time: f64,
    pub tokens_used: u64,
    pub cost_estimate: f64,
    pub search_results_used: bool,
}

/// GET /tones 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct TonesResponse {
    #[serde(default)]
    pub tones: Vec<OptionItem>,
}

/// GET /audiences 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct AudiencesResponse {
    #[serde(default)]
    pub audiences: Vec<OptionItem>,
}

/// POST /generate-posts 的响应体（指标字段平铺在顶层）
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub posts: Vec<Post>,
    /// 后端未做检索时可整体缺省
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub generation_time: f64,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost_estimate: f64,
    #[serde(default)]
    pub search_results_used: bool,
}

impl GenerateResponse {
    /// 拆出指标部分（响应顶层平铺，UI 按一个整体展示）
    pub fn metrics(&self) -> Metrics {
        Metrics {
            generation_time: self.generation_time,
            tokens_used: self.tokens_used,
            cost_estimate: self.cost_estimate,
            search_results_used: self.search_results_used,
        }
    }
}
