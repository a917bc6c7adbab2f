//! 状态定义：请求阶段与 UiState 投影
//!
//! UI 只读 UiState 快照渲染；完整状态由控制器持有并整体发布，
//! 不存在跨多个独立变量的局部更新。

use crate::api::types::{Citation, Metrics, OptionItem, Post};

/// 一次生成请求的生命周期阶段
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestPhase {
    /// 初始态，或上一次请求已结束
    Idle,
    /// 请求已发出尚未完成（UI 显示加载指示并禁用提交）
    InFlight,
    /// 最近一次请求成功，posts/metrics 已填充
    Succeeded,
    /// 最近一次请求失败，结果区为空
    Failed,
}

impl RequestPhase {
    /// 是否处于加载中（UI 锁定提交按钮的依据）
    pub fn is_loading(&self) -> bool {
        *self == RequestPhase::InFlight
    }
}

/// UI 看到的「投影」状态，每次变更整体替换
#[derive(Clone, Debug)]
pub struct UiState {
    pub phase: RequestPhase,
    /// tone 选项（启动加载一次，会话内不再变）
    pub tones: Vec<OptionItem>,
    /// audience 选项
    pub audiences: Vec<OptionItem>,
    pub posts: Vec<Post>,
    pub metrics: Option<Metrics>,
    pub citations: Vec<Citation>,
    /// 引用面板开关；每次新的生成开始时复位为隐藏
    pub show_citations: bool,
    /// 当前显示"已复制"指示的帖子下标（同一时刻最多一个）
    pub copied_index: Option<usize>,
    /// 校验错误或请求失败的用户可见提示
    pub error_message: Option<String>,
    /// 选项加载是否已完成（完成前 UI 用内置默认渲染）
    pub options_loaded: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: RequestPhase::Idle,
            tones: crate::api::options::default_tones(),
            audiences: crate::api::options::default_audiences(),
            posts: Vec::new(),
            metrics: None,
            citations: Vec::new(),
            show_citations: false,
            copied_index: None,
            error_message: None,
            options_loaded: false,
        }
    }
}
