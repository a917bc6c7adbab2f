//! 生成控制器：主控循环
//!
//! 负责：建立 cmd/state 双通道，启动时跑一次选项加载，然后在后台任务中
//! 消费用户命令（Generate/CopyPost/ToggleCitations/Quit）并整体发布 UiState。
//! 同一时刻只应有一个生成在途；即便 UI 的禁用被绕过，序号戳保证后发请求赢，
//! 交错响应不会污染状态。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

use crate::api::{load_options, HttpApi, PostApi};
use crate::api::types::FormState;
use crate::clipboard;
use crate::config::AppConfig;
use crate::core::{ApiError, RequestPhase, UiState};

/// 空白话题的校验提示
const MSG_TOPIC_REQUIRED: &str = "Please enter a topic";
/// 请求失败的通用提示（具体原因只进日志）
const MSG_GENERATE_FAILED: &str = "Failed to generate posts. Please try again.";
/// "已复制"指示的显示时长（毫秒）
const COPIED_INDICATOR_MS: u64 = 2000;

/// 从 UI 发往控制器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交表单，触发一次生成
    Generate(FormState),
    /// 复制第 i 个帖子到剪贴板
    CopyPost(usize),
    /// 显示/隐藏引用面板
    ToggleCitations,
    /// 退出应用
    Quit,
}

/// 控制器：持有完整状态并投影到 watch 通道；字段全部可廉价克隆，便于给落地任务分发句柄
#[derive(Clone)]
pub struct Controller {
    api: Arc<dyn PostApi>,
    state: Arc<Mutex<UiState>>,
    state_tx: Arc<watch::Sender<UiState>>,
    /// 生成请求序号；响应只在序号仍是最新时落地
    gen_seq: Arc<AtomicU64>,
    /// 复制指示序号；过期定时器只清除自己那一次的指示
    copy_seq: Arc<AtomicU64>,
}

impl Controller {
    pub fn new(api: Arc<dyn PostApi>, state_tx: watch::Sender<UiState>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(UiState::default())),
            state_tx: Arc::new(state_tx),
            gen_seq: Arc::new(AtomicU64::new(0)),
            copy_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 启动时的一次性选项加载；失败静默回退，不产生用户可见错误
    pub async fn load_options_once(&self) {
        let (tones, audiences) = load_options(self.api.clone()).await;
        let mut state = self.state.lock().await;
        state.tones = tones;
        state.audiences = audiences;
        state.options_loaded = true;
        let _ = self.state_tx.send(state.clone());
    }

    /// 处理一次生成：校验 → 清场并标记在途 → 发请求 → 按结果落地
    ///
    /// InFlight 快照先于请求发布，渲染层不可能把旧结果和新加载态同时展示。
    pub async fn generate(&self, form: FormState) {
        if form.topic_is_blank() {
            let mut state = self.state.lock().await;
            state.error_message = Some(MSG_TOPIC_REQUIRED.to_string());
            let _ = self.state_tx.send(state.clone());
            return;
        }

        let seq = self.gen_seq.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.lock().await;
            state.phase = RequestPhase::InFlight;
            state.posts.clear();
            state.metrics = None;
            state.citations.clear();
            state.show_citations = false;
            state.copied_index = None;
            state.error_message = None;
            let _ = self.state_tx.send(state.clone());
        }

        let ctrl = self.clone();
        tokio::spawn(async move {
            let result = ctrl.api.generate(&form).await;
            ctrl.settle_generate(seq, result).await;
        });
    }

    /// 响应落地：序号已过期的响应直接丢弃（后发请求赢）
    async fn settle_generate(
        &self,
        seq: u64,
        result: Result<crate::api::GenerateResponse, ApiError>,
    ) {
        if self.gen_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("Dropping stale generate response (seq {})", seq);
            return;
        }

        let mut state = self.state.lock().await;
        // 锁内复查，避免与新请求的清场交错
        if self.gen_seq.load(Ordering::SeqCst) != seq {
            return;
        }

        match result {
            Ok(resp) => {
                state.phase = RequestPhase::Succeeded;
                state.metrics = Some(resp.metrics());
                state.posts = resp.posts;
                state.citations = resp.citations;
                state.error_message = None;
            }
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                state.phase = RequestPhase::Failed;
                state.posts.clear();
                state.metrics = None;
                state.citations.clear();
                state.error_message = Some(MSG_GENERATE_FAILED.to_string());
            }
        }
        let _ = self.state_tx.send(state.clone());
    }

    /// 复制第 index 个帖子；剪贴板失败只记日志，指示不出现
    pub async fn copy_post(&self, index: usize) {
        let text = {
            let state = self.state.lock().await;
            match state.posts.get(index) {
                Some(post) => clipboard::format_post_text(post),
                None => return,
            }
        };

        match clipboard::copy_text(&text) {
            Ok(()) => self.mark_copied(index).await,
            Err(e) => tracing::warn!("Clipboard write failed: {}", e),
        }
    }

    /// 设置"已复制"指示并安排过期；新复制会顶掉旧指示
    pub async fn mark_copied(&self, index: usize) {
        let seq = self.copy_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.copied_index = Some(index);
            let _ = self.state_tx.send(state.clone());
        }

        let ctrl = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(COPIED_INDICATOR_MS)).await;
            if ctrl.copy_seq.load(Ordering::SeqCst) != seq {
                return; // 已有更新的复制指示
            }
            let mut state = ctrl.state.lock().await;
            if state.copied_index == Some(index) {
                state.copied_index = None;
                let _ = ctrl.state_tx.send(state.clone());
            }
        });
    }

    /// 引用面板开关；引用为空时面板本就不渲染，开关无副作用
    pub async fn toggle_citations(&self) {
        let mut state = self.state.lock().await;
        state.show_citations = !state.show_citations;
        let _ = self.state_tx.send(state.clone());
    }
}

/// 根据配置创建 HTTP 后端客户端
pub fn create_api_from_config(cfg: &AppConfig) -> Arc<dyn PostApi> {
    tracing::info!("Using backend at {}", cfg.api.base_url);
    Arc::new(HttpApi::new(&cfg.api.base_url, cfg.api.timeout_secs))
}

/// 创建客户端运行时：返回命令发送端与状态接收端；后台任务消费命令并更新 state
pub fn create_client(
    api: Arc<dyn PostApi>,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());

    let controller = Controller::new(api, state_tx);

    tokio::spawn(async move {
        // 每个会话只加载一次选项；失败静默回退内置默认
        controller.load_options_once().await;

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Generate(form) => controller.generate(form).await,
                Command::CopyPost(index) => controller.copy_post(index).await,
                Command::ToggleCitations => controller.toggle_citations().await,
                Command::Quit => break,
            }
        }
    });

    (cmd_tx, state_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Citation;
    use crate::api::MockApi;

    fn form_with_topic(topic: &str) -> FormState {
        FormState {
            topic: topic.to_string(),
            ..FormState::default()
        }
    }

    fn new_controller(api: MockApi) -> (Controller, Arc<MockApi>, watch::Receiver<UiState>) {
        let api = Arc::new(api);
        let (state_tx, state_rx) = watch::channel(UiState::default());
        let ctrl = Controller::new(api.clone(), state_tx);
        (ctrl, api, state_rx)
    }

    /// 等到请求结束（phase 离开 InFlight）
    async fn wait_settled(rx: &mut watch::Receiver<UiState>) -> UiState {
        loop {
            let state = rx.borrow().clone();
            if state.phase != RequestPhase::InFlight {
                return state;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_blank_topic_blocks_dispatch() {
        let (ctrl, api, rx) = new_controller(MockApi::new());
        ctrl.generate(form_with_topic("   ")).await;

        let state = rx.borrow().clone();
        assert_eq!(state.phase, RequestPhase::Idle);
        assert_eq!(state.error_message.as_deref(), Some("Please enter a topic"));
        assert_eq!(api.generate_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_generate_installs_result() {
        let (ctrl, api, mut rx) =
            new_controller(MockApi::new().with_generate(MockApi::simple_response(3)));
        ctrl.generate(form_with_topic("AI in marketing")).await;

        let state = wait_settled(&mut rx).await;
        assert_eq!(state.phase, RequestPhase::Succeeded);
        assert_eq!(state.posts.len(), 3);
        assert!(state.metrics.is_some());
        assert!(state.error_message.is_none());
        assert_eq!(api.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_generate_leaves_results_empty() {
        let (ctrl, _api, mut rx) =
            new_controller(MockApi::new().with_generate_error(ApiError::Status(500)));
        ctrl.generate(form_with_topic("rust")).await;

        let state = wait_settled(&mut rx).await;
        assert_eq!(state.phase, RequestPhase::Failed);
        assert!(state.posts.is_empty());
        assert!(state.metrics.is_none());
        assert!(state.citations.is_empty());
        assert!(!state.phase.is_loading());
        assert!(state.error_message.is_some());
    }

    #[tokio::test]
    async fn test_inflight_snapshot_clears_previous_result() {
        let (ctrl, _api, mut rx) = new_controller(
            MockApi::new()
                .with_generate(MockApi::response_with_citations(
                    2,
                    vec![Citation {
                        title: "Source".to_string(),
                        snippet: "snippet".to_string(),
                        link: "https://example.com".to_string(),
                    }],
                ))
                .with_delayed_generate(50, MockApi::simple_response(1)),
        );

        // 第一轮：成功并打开引用面板
        ctrl.generate(form_with_topic("first")).await;
        let state = wait_settled(&mut rx).await;
        assert_eq!(state.posts.len(), 2);
        ctrl.toggle_citations().await;
        assert!(rx.borrow().show_citations);

        // 第二轮：InFlight 快照必须已清掉旧结果并复位引用面板
        ctrl.generate(form_with_topic("second")).await;
        let inflight = rx.borrow().clone();
        assert_eq!(inflight.phase, RequestPhase::InFlight);
        assert!(inflight.posts.is_empty());
        assert!(inflight.metrics.is_none());
        assert!(inflight.citations.is_empty());
        assert!(!inflight.show_citations);

        let settled = wait_settled(&mut rx).await;
        assert_eq!(settled.posts.len(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_generates_last_response_wins() {
        // 第一个请求慢（100ms 返回 3 帖），第二个快（立即返回 1 帖）；
        // 脚本按话题命中，与任务调度顺序无关
        let (ctrl, api, mut rx) = new_controller(
            MockApi::new()
                .with_delayed_generate_for("slow", 100, MockApi::simple_response(3))
                .with_generate_for("fast", MockApi::simple_response(1)),
        );

        ctrl.generate(form_with_topic("slow")).await;
        ctrl.generate(form_with_topic("fast")).await;

        let state = wait_settled(&mut rx).await;
        assert_eq!(state.posts.len(), 1);

        // 等慢响应回来，确认它被丢弃
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        let state = rx.borrow().clone();
        assert_eq!(state.phase, RequestPhase::Succeeded);
        assert_eq!(state.posts.len(), 1);
        assert_eq!(api.generate_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_indicator_expires() {
        let (ctrl, _api, mut rx) =
            new_controller(MockApi::new().with_generate(MockApi::simple_response(2)));
        ctrl.generate(form_with_topic("topic")).await;
        wait_settled(&mut rx).await;

        ctrl.mark_copied(1).await;
        assert_eq!(rx.borrow().copied_index, Some(1));

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert_eq!(rx.borrow().copied_index, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_copy_replaces_indicator() {
        let (ctrl, _api, mut rx) =
            new_controller(MockApi::new().with_generate(MockApi::simple_response(2)));
        ctrl.generate(form_with_topic("topic")).await;
        wait_settled(&mut rx).await;

        ctrl.mark_copied(0).await;
        tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
        ctrl.mark_copied(1).await;
        assert_eq!(rx.borrow().copied_index, Some(1));

        // 旧定时器到期不得清掉新指示
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert_eq!(rx.borrow().copied_index, Some(1));

        tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
        assert_eq!(rx.borrow().copied_index, None);
    }
}
