//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件：表单字段只由字段编辑事件修改，
//! Enter 提交时把选择器下标换算成表单值并发 Command::Generate；每帧用 draw
//! 渲染 UiState 快照与本地表单。生成中提交按钮禁用，重复 Enter 不再发命令。

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;

use crate::api::types::FormState;
use crate::core::UiState;
use crate::ui::render::{draw, Focus, InputState, LENGTHS};

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<UiState>,
    cmd_tx: tokio::sync::mpsc::UnboundedSender<crate::core::Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = super::event::EventHandler::new(cmd_tx);
    let mut form = FormState::default();
    let mut input_state = InputState::default();

    loop {
        let state = state_rx.borrow().clone();

        if let Ok(Some(ev)) = event_handler.poll() {
            match ev {
                super::event::AppEvent::Command(cmd) => {
                    if matches!(cmd, crate::core::Command::Quit) {
                        event_handler.send_quit();
                        break;
                    }
                }
                super::event::AppEvent::Key(key) => {
                    handle_key(key.code, &state, &mut form, &mut input_state, &event_handler);
                }
            }
        }

        terminal.draw(|f| draw(f, &state, &form, &input_state))?;

        tokio::task::yield_now().await;
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

/// 单个按键：按焦点分派到文本编辑、选择器步进、开关或结果区操作
fn handle_key(
    code: KeyCode,
    state: &UiState,
    form: &mut FormState,
    input: &mut InputState,
    events: &super::event::EventHandler,
) {
    match code {
        KeyCode::Tab => input.focus = input.focus.next(),
        KeyCode::BackTab => input.focus = input.focus.prev(),
        KeyCode::Enter => match input.focus {
            Focus::Results => {
                if !state.posts.is_empty() {
                    events.send_copy(input.selected_post.min(state.posts.len() - 1));
                }
            }
            _ => {
                // 生成中按钮禁用，不重复发命令
                if !state.phase.is_loading() {
                    sync_form_selections(state, form, input);
                    events.send_generate(form.clone());
                }
            }
        },
        KeyCode::Backspace => match input.focus {
            Focus::Topic => {
                form.topic.pop();
            }
            Focus::Language => {
                form.language.pop();
            }
            _ => {}
        },
        KeyCode::Up | KeyCode::Left => step_selection(state, form, input, false),
        KeyCode::Down | KeyCode::Right => step_selection(state, form, input, true),
        KeyCode::Char(' ') if input.focus == Focus::Hashtags => {
            form.include_hashtags = !form.include_hashtags;
        }
        KeyCode::Char(' ') if input.focus == Focus::Cta => {
            form.include_cta = !form.include_cta;
        }
        KeyCode::Char('c') if input.focus == Focus::Results => {
            if !state.posts.is_empty() {
                events.send_copy(input.selected_post.min(state.posts.len() - 1));
            }
        }
        KeyCode::Char('s') if input.focus == Focus::Results => {
            events.send_toggle_citations();
        }
        KeyCode::Char(c) if input.focus.is_text() => {
            if input.focus == Focus::Topic {
                form.topic.push(c);
            } else {
                form.language.push(c);
            }
        }
        _ => {}
    }
}

/// ↑↓/←→：选择器步进、帖子数增减、结果区选帖
fn step_selection(state: &UiState, form: &mut FormState, input: &mut InputState, forward: bool) {
    let step = |index: usize, len: usize| -> usize {
        if len == 0 {
            return 0;
        }
        if forward {
            (index + 1).min(len - 1)
        } else {
            index.saturating_sub(1)
        }
    };

    match input.focus {
        Focus::Tone => input.tone_index = step(input.tone_index, state.tones.len()),
        Focus::Audience => input.audience_index = step(input.audience_index, state.audiences.len()),
        Focus::Length => input.length_index = step(input.length_index, LENGTHS.len()),
        Focus::PostCount => {
            form.post_count = if forward {
                (form.post_count + 1).min(5)
            } else {
                (form.post_count - 1).max(3)
            };
        }
        Focus::Results => input.selected_post = step(input.selected_post, state.posts.len()),
        _ => {}
    }
}

/// 提交前把选择器下标换算成表单值（value 而非 label）
fn sync_form_selections(state: &UiState, form: &mut FormState, input: &InputState) {
    if let Some(tone) = state.tones.get(input.tone_index) {
        form.tone = tone.value.clone();
    }
    if let Some(audience) = state.audiences.get(input.audience_index) {
        form.audience = audience.value.clone();
    }
    form.length = LENGTHS[input.length_index.min(LENGTHS.len() - 1)].0.to_string();
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn harness() -> (
        UiState,
        FormState,
        InputState,
        super::super::event::EventHandler,
        mpsc::UnboundedReceiver<crate::core::Command>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            UiState::default(),
            FormState::default(),
            InputState::default(),
            super::super::event::EventHandler::new(cmd_tx),
            cmd_rx,
        )
    }

    #[test]
    fn test_enter_submits_selected_values() {
        let (state, mut form, mut input, events, mut cmd_rx) = harness();
        form.topic = "AI in marketing".to_string();
        input.focus = Focus::Tone;
        // tone 选到第 2 项（casual），audience 保持默认
        handle_key(KeyCode::Down, &state, &mut form, &mut input, &events);
        handle_key(KeyCode::Enter, &state, &mut form, &mut input, &events);

        match cmd_rx.try_recv().unwrap() {
            crate::core::Command::Generate(sent) => {
                assert_eq!(sent.tone, "casual");
                assert_eq!(sent.audience, "general");
                assert_eq!(sent.length, "medium");
                assert_eq!(sent.post_count, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_enter_disabled_while_loading() {
        let (mut state, mut form, mut input, events, mut cmd_rx) = harness();
        state.phase = crate::core::RequestPhase::InFlight;
        form.topic = "rust".to_string();
        handle_key(KeyCode::Enter, &state, &mut form, &mut input, &events);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn test_post_count_clamped_to_range() {
        let (state, mut form, mut input, events, _cmd_rx) = harness();
        input.focus = Focus::PostCount;
        for _ in 0..10 {
            handle_key(KeyCode::Up, &state, &mut form, &mut input, &events);
        }
        assert_eq!(form.post_count, 3);
        for _ in 0..10 {
            handle_key(KeyCode::Down, &state, &mut form, &mut input, &events);
        }
        assert_eq!(form.post_count, 5);
    }

    #[test]
    fn test_copy_key_targets_selected_post() {
        let (mut state, mut form, mut input, events, mut cmd_rx) = harness();
        state.posts = crate::api::MockApi::simple_response(3).posts;
        input.focus = Focus::Results;
        handle_key(KeyCode::Down, &state, &mut form, &mut input, &events);
        handle_key(KeyCode::Char('c'), &state, &mut form, &mut input, &events);

        match cmd_rx.try_recv().unwrap() {
            crate::core::Command::CopyPost(i) => assert_eq!(i, 1),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_space_toggles_flags() {
        let (state, mut form, mut input, events, _cmd_rx) = harness();
        input.focus = Focus::Hashtags;
        handle_key(KeyCode::Char(' '), &state, &mut form, &mut input, &events);
        assert!(!form.include_hashtags);
        input.focus = Focus::Cta;
        handle_key(KeyCode::Char(' '), &state, &mut form, &mut input, &events);
        assert!(!form.include_cta);
    }
}
