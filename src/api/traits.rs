//! API 客户端抽象
//!
//! 所有后端（HTTP / Mock）实现 PostApi：两个选项列表的读取与一次性的生成调用。
//! 返回 Result 而非抛异常，调用方按 ApiError 分支处理。

use async_trait::async_trait;

use crate::api::types::{FormState, GenerateResponse, OptionItem};
use crate::core::ApiError;

/// 后端客户端 trait：选项读取 + 生成
#[async_trait]
pub trait PostApi: Send + Sync {
    /// GET /tones
    async fn fetch_tones(&self) -> Result<Vec<OptionItem>, ApiError>;

    /// GET /audiences
    async fn fetch_audiences(&self) -> Result<Vec<OptionItem>, ApiError>;

    /// POST /generate-posts，单次调用，不重试
    async fn generate(&self, form: &FormState) -> Result<GenerateResponse, ApiError>;
}
