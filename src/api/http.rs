//! HTTP 后端客户端（reqwest 实现）
//!
//! 持有复用的 reqwest Client 与 base_url；非 2xx 状态映射为 ApiError::Status，
//! 连接/超时映射为 Network，响应体解析失败映射为 Decode。不做重试与取消。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::api::traits::PostApi;
use crate::api::types::{
    AudiencesResponse, FormState, GenerateResponse, OptionItem, TonesResponse,
};
use crate::core::ApiError;

const USER_AGENT: &str = concat!("postify/", env!("CARGO_PKG_VERSION"));

/// HTTP 客户端：base_url 来自配置（本地开发与部署环境不同）
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PostApi for HttpApi {
    async fn fetch_tones(&self) -> Result<Vec<OptionItem>, ApiError> {
        let resp = self
            .client
            .get(self.url("/tones"))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }

        let body: TonesResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.tones)
    }

    async fn fetch_audiences(&self) -> Result<Vec<OptionItem>, ApiError> {
        let resp = self
            .client
            .get(self.url("/audiences"))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }

        let body: AudiencesResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.audiences)
    }

    async fn generate(&self, form: &FormState) -> Result<GenerateResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/generate-posts"))
            .json(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }

        resp.json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_tones_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tones"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({
                    "tones": [
                        {"value": "professional", "label": "Professional"},
                        {"value": "casual", "label": "Casual"}
                    ]
                })
                .to_string(),
                "application/json",
            ))
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), 5);
        let tones = api.fetch_tones().await.expect("fetch tones");
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[0].value, "professional");
    }

    #[tokio::test]
    async fn test_fetch_tones_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tones"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), 5);
        let result = api.fetch_tones().await;
        assert!(matches!(result, Err(ApiError::Status(500))));
    }

    #[tokio::test]
    async fn test_generate_sends_full_form_payload() {
        let mut form = FormState::default();
        form.topic = "AI in marketing".to_string();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-posts"))
            .and(body_json(&form))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({
                    "posts": [
                        {"content": "Post one", "hashtags": ["#AI"], "cta": "Follow me",
                         "tone_used": "professional", "estimated_engagement": "high"}
                    ],
                    "citations": [],
                    "generation_time": 2.3,
                    "tokens_used": 512,
                    "cost_estimate": 0.02,
                    "search_results_used": true
                })
                .to_string(),
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), 5);
        let resp = api.generate(&form).await.expect("generate");
        assert_eq!(resp.posts.len(), 1);
        assert!(resp.citations.is_empty());
        assert_eq!(resp.metrics().tokens_used, 512);
    }

    #[tokio::test]
    async fn test_generate_http_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-posts"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let mut form = FormState::default();
        form.topic = "rust".to_string();
        let api = HttpApi::new(&server.uri(), 5);
        assert!(matches!(api.generate(&form).await, Err(ApiError::Status(422))));
    }

    #[tokio::test]
    async fn test_generate_bad_json_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-posts"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let mut form = FormState::default();
        form.topic = "rust".to_string();
        let api = HttpApi::new(&server.uri(), 5);
        assert!(matches!(api.generate(&form).await, Err(ApiError::Decode(_))));
    }
}
