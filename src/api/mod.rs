//! 后端 API 层：类型、客户端抽象与实现
//!
//! 所有生成/检索工作都在远端后端完成，本层只负责请求与响应的编解码：
//! - **types**: 请求载荷（FormState）与响应（帖子、引用、指标）
//! - **traits**: PostApi 抽象（HTTP / Mock 共用接口）
//! - **http**: reqwest 实现，调 /tones、/audiences、/generate-posts
//! - **mock**: 脚本化 Mock 后端（控制器测试用，无需网络）
//! - **options**: 启动时加载 tone/audience 选项，失败回退内置默认

pub mod http;
pub mod mock;
pub mod options;
pub mod traits;
pub mod types;

pub use http::HttpApi;
pub use mock::MockApi;
pub use options::{default_audiences, default_tones, load_options};
pub use traits::PostApi;
pub use types::{Citation, FormState, GenerateResponse, Metrics, OptionItem, Post};
