//! API 错误类型
//!
//! 与控制器配合：三类失败（HTTP 状态、传输、解码）统一映射为 Failed 阶段的
//! 通用错误提示，具体原因只进日志。

use thiserror::Error;

/// 一次后端调用可能出现的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 非 2xx HTTP 状态
    #[error("HTTP status {0}")]
    Status(u16),

    /// 连接失败、超时等传输层错误
    #[error("Network error: {0}")]
    Network(String),

    /// 响应体不是预期的 JSON 结构
    #[error("Decode error: {0}")]
    Decode(String),
}
