//! 事件处理
//!
//! 轮询 crossterm 键盘事件，将 Ctrl+Q/Esc 转为 Command::Quit，
//! 其余按键交给 run_app 编辑表单或操作结果区。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::api::types::FormState;
use crate::core::Command;

/// 应用事件：来自快捷键的 Command 或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    Key(KeyEvent),
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                AppEvent::Command(Command::Quit)
            }
            KeyCode::Esc => AppEvent::Command(Command::Quit),
            _ => AppEvent::Key(key),
        }
    }

    /// 提交表单，触发一次生成
    pub fn send_generate(&self, form: FormState) {
        let _ = self.cmd_tx.send(Command::Generate(form));
    }

    /// 复制第 index 个帖子
    pub fn send_copy(&self, index: usize) {
        let _ = self.cmd_tx.send(Command::CopyPost(index));
    }

    /// 切换引用面板
    pub fn send_toggle_citations(&self) {
        let _ = self.cmd_tx.send(Command::ToggleCitations);
    }

    pub fn send_quit(&self) {
        let _ = self.cmd_tx.send(Command::Quit);
    }
}
