//! 界面渲染
//!
//! 左侧表单（话题、tone/audience/长度选择、开关、帖子数、语言、提交按钮），
//! 右侧结果区（指标行、帖子列表、复制指示），引用非空且开关打开时在下方显示引用面板。
//! 渲染只读 UiState 快照与本地表单，不产生任何副作用。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::types::{FormState, OptionItem};
use crate::core::{RequestPhase, UiState};

/// 长度档位（固定三档，不从后端取）
pub const LENGTHS: &[(&str, &str)] = &[
    ("short", "Short"),
    ("medium", "Medium"),
    ("long", "Long"),
];

/// 表单焦点：Tab 顺序即枚举顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Topic,
    Tone,
    Audience,
    Length,
    Hashtags,
    Cta,
    PostCount,
    Language,
    Send,
    /// 结果区：↑↓ 选帖子，Enter/c 复制，s 开关引用面板
    Results,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Topic => Focus::Tone,
            Focus::Tone => Focus::Audience,
            Focus::Audience => Focus::Length,
            Focus::Length => Focus::Hashtags,
            Focus::Hashtags => Focus::Cta,
            Focus::Cta => Focus::PostCount,
            Focus::PostCount => Focus::Language,
            Focus::Language => Focus::Send,
            Focus::Send => Focus::Results,
            Focus::Results => Focus::Topic,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Topic => Focus::Results,
            Focus::Tone => Focus::Topic,
            Focus::Audience => Focus::Tone,
            Focus::Length => Focus::Audience,
            Focus::Hashtags => Focus::Length,
            Focus::Cta => Focus::Hashtags,
            Focus::PostCount => Focus::Cta,
            Focus::Language => Focus::PostCount,
            Focus::Send => Focus::Language,
            Focus::Results => Focus::Send,
        }
    }

    /// 是否为自由文本输入（字符键直接进缓冲）
    pub fn is_text(self) -> bool {
        matches!(self, Focus::Topic | Focus::Language)
    }
}

/// 本地输入状态：焦点与各选择器下标（表单值在提交时从这里拼出）
#[derive(Debug, Clone)]
pub struct InputState {
    pub focus: Focus,
    pub tone_index: usize,
    pub audience_index: usize,
    pub length_index: usize,
    /// 结果区当前选中的帖子
    pub selected_post: usize,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            focus: Focus::Topic,
            tone_index: 0,
            audience_index: 0,
            // medium
            length_index: 1,
            selected_post: 0,
        }
    }
}

/// 引用按钮是否可用：引用序列非空才提供入口
pub fn citations_available(state: &UiState) -> bool {
    !state.citations.is_empty()
}

/// 引用面板是否展示：入口可用且开关打开；空引用时开关打开也不展示
pub fn citations_offered(state: &UiState) -> bool {
    citations_available(state) && state.show_citations
}

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn option_label(list: &[OptionItem], index: usize) -> &str {
    list.get(index).map(|o| o.label.as_str()).unwrap_or("-")
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn checkbox(v: bool) -> &'static str {
    if v {
        "[x]"
    } else {
        "[ ]"
    }
}

/// 绘制一帧：左表单右结果；引用面板按 show_citations 与引用非空门控
pub fn draw(f: &mut Frame, state: &UiState, form: &FormState, input: &InputState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)])
        .split(f.area());

    draw_form(f, chunks[0], state, form, input);
    draw_results(f, chunks[1], state, input);
}

fn draw_form(f: &mut Frame, area: Rect, state: &UiState, form: &FormState, input: &InputState) {
    let phase_str = match state.phase {
        RequestPhase::Idle => "就绪",
        RequestPhase::InFlight => "生成中…",
        RequestPhase::Succeeded => "完成",
        RequestPhase::Failed => "失败",
    };

    let block = Block::default()
        .title(format!(" Postify │ {} ", phase_str))
        .title_bottom(Line::from(Span::styled(
            " Tab 切换 │ Enter 生成 │ Ctrl+Q 退出 ",
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let focus = input.focus;
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("话题 *", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            if form.topic.is_empty() && focus != Focus::Topic {
                "<输入帖子主题>".to_string()
            } else if focus == Focus::Topic {
                format!("{}▏", form.topic)
            } else {
                form.topic.clone()
            },
            field_style(focus == Focus::Topic),
        )),
        Line::from(Span::raw("")),
        Line::from(vec![
            Span::styled("Tone      ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("◂ {} ▸", option_label(&state.tones, input.tone_index)),
                field_style(focus == Focus::Tone),
            ),
        ]),
        Line::from(vec![
            Span::styled("Audience  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("◂ {} ▸", option_label(&state.audiences, input.audience_index)),
                field_style(focus == Focus::Audience),
            ),
        ]),
        Line::from(vec![
            Span::styled("Length    ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("◂ {} ▸", LENGTHS[input.length_index.min(LENGTHS.len() - 1)].1),
                field_style(focus == Focus::Length),
            ),
        ]),
        Line::from(Span::raw("")),
        Line::from(Span::styled(
            format!("{} Hashtags", checkbox(form.include_hashtags)),
            field_style(focus == Focus::Hashtags),
        )),
        Line::from(Span::styled(
            format!("{} Call-to-action", checkbox(form.include_cta)),
            field_style(focus == Focus::Cta),
        )),
        Line::from(vec![
            Span::styled("Posts     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("◂ {} ▸ (3-5)", form.post_count),
                field_style(focus == Focus::PostCount),
            ),
        ]),
        Line::from(vec![
            Span::styled("Language  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                if focus == Focus::Language {
                    format!("{}▏", form.language)
                } else {
                    form.language.clone()
                },
                field_style(focus == Focus::Language),
            ),
        ]),
        Line::from(Span::raw("")),
    ];

    // 提交按钮：生成中禁用（并发防线的 UI 侧）
    let send_label = if state.phase.is_loading() {
        "  [ 生成中… ]  "
    } else {
        "  [ 生成帖子 ]  "
    };
    let send_style = if state.phase.is_loading() {
        Style::default().fg(Color::DarkGray)
    } else if focus == Focus::Send {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };
    lines.push(Line::from(Span::styled(send_label, send_style)));

    if let Some(err) = &state.error_message {
        lines.push(Line::from(Span::raw("")));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_results(f: &mut Frame, area: Rect, state: &UiState, input: &InputState) {
    // 引用面板只在引用非空且打开时占用下半区
    let (posts_area, citations_area) = if citations_offered(state) {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (halves[0], Some(halves[1]))
    } else {
        (area, None)
    };

    let title = match &state.metrics {
        Some(m) => format!(
            " 结果 │ {:.1}s │ {} tokens │ ${:.4} │ 检索{} ",
            m.generation_time,
            m.tokens_used,
            m.cost_estimate,
            if m.search_results_used { "✓" } else { "✗" },
        ),
        None => " 结果 ".to_string(),
    };

    let focused = input.focus == Focus::Results;
    let mut hint = String::from(" ↑↓ 选择 │ Enter/c 复制");
    if citations_available(state) {
        hint.push_str(" │ s 引用");
    }
    hint.push(' ');

    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::Blue }));

    let content_width = posts_area.width.saturating_sub(2).max(40) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if state.phase.is_loading() {
        lines.push(Line::from(Span::styled(
            "正在生成，请稍候…",
            Style::default().fg(Color::Yellow),
        )));
    } else if state.posts.is_empty() {
        lines.push(Line::from(Span::styled(
            "填写左侧表单并按 Enter 生成帖子",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, post) in state.posts.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(Span::raw("")));
        }
        let selected = focused && input.selected_post == idx;
        let header_color = if selected { Color::Yellow } else { Color::Green };
        let copied = state.copied_index == Some(idx);

        let mut header = vec![Span::styled(
            format!("帖子 {} ", idx + 1),
            Style::default().fg(header_color).add_modifier(Modifier::BOLD),
        )];
        header.push(Span::styled(
            format!("│ {} • {} engagement ", post.tone_used, post.estimated_engagement),
            Style::default().fg(Color::DarkGray),
        ));
        if copied {
            header.push(Span::styled("✓ 已复制", Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(header));

        for line in wrap_text(&post.content, content_width) {
            lines.push(Line::from(Span::raw(line)));
        }
        if !post.hashtags.is_empty() {
            lines.push(Line::from(Span::styled(
                post.hashtags.join(" "),
                Style::default().fg(Color::Cyan),
            )));
        }
        if let Some(cta) = post.cta.as_deref() {
            lines.push(Line::from(Span::styled(
                cta.to_string(),
                Style::default().fg(Color::Magenta),
            )));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, posts_area);

    if let Some(citations_area) = citations_area {
        draw_citations(f, citations_area, state);
    }
}

fn draw_citations(f: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .title(format!(" 引用来源 ({}) ", state.citations.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let width = area.width.saturating_sub(2).max(40) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for (idx, c) in state.citations.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(Span::raw("")));
        }
        lines.push(Line::from(Span::styled(
            format!("{}. {}", idx + 1, c.title),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        for line in wrap_text(&c.snippet, width) {
            lines.push(Line::from(Span::raw(line)));
        }
        lines.push(Line::from(Span::styled(
            c.link.clone(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycle_is_closed() {
        let mut focus = Focus::Topic;
        for _ in 0..10 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Topic);
        for _ in 0..10 {
            focus = focus.prev();
        }
        assert_eq!(focus, Focus::Topic);
    }

    #[test]
    fn test_text_fields() {
        assert!(Focus::Topic.is_text());
        assert!(Focus::Language.is_text());
        assert!(!Focus::Tone.is_text());
        assert!(!Focus::Results.is_text());
    }

    #[test]
    fn test_empty_citations_never_offer_panel() {
        let mut state = UiState::default();
        // 开关打开但引用为空：既无入口也无面板
        state.show_citations = true;
        assert!(!citations_available(&state));
        assert!(!citations_offered(&state));

        state.citations.push(crate::api::types::Citation {
            title: "Source".to_string(),
            snippet: "snippet".to_string(),
            link: "https://example.com".to_string(),
        });
        assert!(citations_available(&state));
        assert!(citations_offered(&state));

        // 入口保留，面板随开关关闭
        state.show_citations = false;
        assert!(citations_available(&state));
        assert!(!citations_offered(&state));
    }

    #[test]
    fn test_wrap_text_utf8() {
        let lines = wrap_text("你好世界你好", 2);
        assert_eq!(lines, vec!["你好", "世界", "你好"]);
    }
}
