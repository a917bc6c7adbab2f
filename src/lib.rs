//! Postify - PostifyAI 终端客户端
//!
//! 生成与检索都在远端后端完成，本仓库只做请求/响应生命周期与视图状态同步。
//!
//! 模块划分：
//! - **api**: 后端类型、PostApi 抽象与 HTTP/Mock 实现、选项加载
//! - **clipboard**: 帖子文本拼装与系统剪贴板
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、状态投影、生成控制器
//! - **ui**: Ratatui TUI 界面

pub mod api;
pub mod clipboard;
pub mod config;
pub mod core;
pub mod ui;
