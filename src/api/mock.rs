//! Mock 后端（用于测试，无需网络）
//!
//! 选项列表与生成响应均可脚本化；generate 优先按话题取脚本，否则按入队顺序
//! 消费，并记录调用次数。脚本可带延迟，便于测试"后发请求赢"的并发语义，
//! 按话题取脚本与任务调度顺序无关。

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::traits::PostApi;
use crate::api::types::{Citation, FormState, GenerateResponse, OptionItem, Post};
use crate::core::ApiError;

/// 一条脚本化的 generate 结果：可选延迟 + 结果
type ScriptedGenerate = (Duration, Result<GenerateResponse, ApiError>);

/// Mock 客户端：返回预设的选项与生成结果
pub struct MockApi {
    tones: Result<Vec<OptionItem>, ApiError>,
    audiences: Result<Vec<OptionItem>, ApiError>,
    generates: Mutex<VecDeque<ScriptedGenerate>>,
    /// 按话题命中的脚本，优先于 FIFO 队列
    keyed_generates: Mutex<HashMap<String, ScriptedGenerate>>,
    generate_calls: AtomicUsize,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            tones: Ok(crate::api::options::default_tones()),
            audiences: Ok(crate::api::options::default_audiences()),
            generates: Mutex::new(VecDeque::new()),
            keyed_generates: Mutex::new(HashMap::new()),
            generate_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_tones(mut self, tones: Vec<OptionItem>) -> Self {
        self.tones = Ok(tones);
        self
    }

    pub fn with_tones_error(mut self, err: ApiError) -> Self {
        self.tones = Err(err);
        self
    }

    pub fn with_audiences(mut self, audiences: Vec<OptionItem>) -> Self {
        self.audiences = Ok(audiences);
        self
    }

    pub fn with_audiences_error(mut self, err: ApiError) -> Self {
        self.audiences = Err(err);
        self
    }

    /// 追加一条立即返回的 generate 脚本
    pub fn with_generate(self, resp: GenerateResponse) -> Self {
        self.push_generate(Duration::ZERO, Ok(resp));
        self
    }

    pub fn with_generate_error(self, err: ApiError) -> Self {
        self.push_generate(Duration::ZERO, Err(err));
        self
    }

    /// 追加一条延迟返回的 generate 脚本（测试请求交错）
    pub fn with_delayed_generate(self, delay_ms: u64, resp: GenerateResponse) -> Self {
        self.push_generate(Duration::from_millis(delay_ms), Ok(resp));
        self
    }

    /// 按话题命中的 generate 脚本（与调用顺序无关）
    pub fn with_generate_for(self, topic: &str, resp: GenerateResponse) -> Self {
        self.keyed_generates
            .lock()
            .unwrap()
            .insert(topic.to_string(), (Duration::ZERO, Ok(resp)));
        self
    }

    /// 按话题命中且延迟返回的 generate 脚本
    pub fn with_delayed_generate_for(
        self,
        topic: &str,
        delay_ms: u64,
        resp: GenerateResponse,
    ) -> Self {
        self.keyed_generates
            .lock()
            .unwrap()
            .insert(topic.to_string(), (Duration::from_millis(delay_ms), Ok(resp)));
        self
    }

    fn push_generate(&self, delay: Duration, result: Result<GenerateResponse, ApiError>) {
        self.generates.lock().unwrap().push_back((delay, result));
    }

    /// generate 被调用的次数（验证"空白话题不发请求"）
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// 构造一条最小可用的响应（n 个帖子，无引用）
    pub fn simple_response(n: usize) -> GenerateResponse {
        GenerateResponse {
            posts: (0..n)
                .map(|i| Post {
                    content: format!("Post {}", i + 1),
                    hashtags: vec!["#postify".to_string()],
                    cta: Some("Follow for more".to_string()),
                    tone_used: "professional".to_string(),
                    estimated_engagement: "high".to_string(),
                })
                .collect(),
            citations: vec![],
            generation_time: 1.0,
            tokens_used: 100,
            cost_estimate: 0.01,
            search_results_used: false,
        }
    }

    /// 带引用的响应变体
    pub fn response_with_citations(n: usize, citations: Vec<Citation>) -> GenerateResponse {
        let mut resp = Self::simple_response(n);
        resp.citations = citations;
        resp.search_results_used = true;
        resp
    }
}

#[async_trait]
impl PostApi for MockApi {
    async fn fetch_tones(&self) -> Result<Vec<OptionItem>, ApiError> {
        self.tones.clone()
    }

    async fn fetch_audiences(&self) -> Result<Vec<OptionItem>, ApiError> {
        self.audiences.clone()
    }

    async fn generate(&self, form: &FormState) -> Result<GenerateResponse, ApiError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .keyed_generates
            .lock()
            .unwrap()
            .remove(form.topic.as_str())
            .or_else(|| self.generates.lock().unwrap().pop_front());
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(Self::simple_response(1)),
        }
    }
}
