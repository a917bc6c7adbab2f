//! 剪贴板：帖子文本拼装与复制
//!
//! 拼装顺序固定：正文 → 标签（单空格连接）→ CTA，段落之间空一行；
//! 缺省的部分连同分隔一起省略。写剪贴板失败只记日志，由调用方决定指示是否出现。

use crate::api::types::Post;

/// 把一个帖子拼成单个文本块（与后端/平台无关的纯函数）
pub fn format_post_text(post: &Post) -> String {
    let mut text = post.content.clone();
    if !post.hashtags.is_empty() {
        text.push_str("\n\n");
        text.push_str(&post.hashtags.join(" "));
    }
    if let Some(cta) = post.cta.as_deref() {
        if !cta.is_empty() {
            text.push_str("\n\n");
            text.push_str(cta);
        }
    }
    text
}

/// 写入系统剪贴板
pub fn copy_text(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())
}
