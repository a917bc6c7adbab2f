//! 核心层：错误、状态投影、生成控制器

pub mod controller;
pub mod error;
pub mod state;

pub use controller::{create_api_from_config, create_client, Command, Controller};
pub use error::ApiError;
pub use state::{RequestPhase, UiState};
