//! 选项加载：启动时拉取 tone/audience 列表，失败静默回退内置默认
//!
//! 两个请求并发且互不阻塞（join!），各自只更新自己的列表；空列表、解析失败、
//! 网络失败一律保留默认值，不作为用户可见错误，也不重试。每个会话只执行一次。

use std::sync::Arc;

use crate::api::traits::PostApi;
use crate::api::types::OptionItem;

/// 内置 tone 默认列表（后端不可达时的兜底，6 项）
pub fn default_tones() -> Vec<OptionItem> {
    vec![
        OptionItem::new("professional", "Professional"),
        OptionItem::new("casual", "Casual"),
        OptionItem::new("inspirational", "Inspirational"),
        OptionItem::new("educational", "Educational"),
        OptionItem::new("humorous", "Humorous"),
        OptionItem::new("thought-provoking", "Thought-provoking"),
    ]
}

/// 内置 audience 默认列表（8 项）
pub fn default_audiences() -> Vec<OptionItem> {
    vec![
        OptionItem::new("general", "General Professional"),
        OptionItem::new("entrepreneurs", "Entrepreneurs"),
        OptionItem::new("tech", "Tech Professionals"),
        OptionItem::new("marketing", "Marketing Professionals"),
        OptionItem::new("sales", "Sales Professionals"),
        OptionItem::new("leadership", "Leadership & Management"),
        OptionItem::new("startups", "Startup Community"),
        OptionItem::new("finance", "Finance Professionals"),
    ]
}

/// 并发拉取两个选项列表，返回 (tones, audiences)
///
/// 任一请求失败或返回空列表时，对应类别保留内置默认；另一类别不受影响。
pub async fn load_options(api: Arc<dyn PostApi>) -> (Vec<OptionItem>, Vec<OptionItem>) {
    let (tones_res, audiences_res) = tokio::join!(api.fetch_tones(), api.fetch_audiences());

    let tones = match tones_res {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            tracing::debug!("Backend returned empty tone list, keeping defaults");
            default_tones()
        }
        Err(e) => {
            tracing::debug!("Tone options load failed ({}), keeping defaults", e);
            default_tones()
        }
    };

    let audiences = match audiences_res {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            tracing::debug!("Backend returned empty audience list, keeping defaults");
            default_audiences()
        }
        Err(e) => {
            tracing::debug!("Audience options load failed ({}), keeping defaults", e);
            default_audiences()
        }
    };

    (tones, audiences)
}
