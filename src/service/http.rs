use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ResearchService;
use super::schema::{
    ChatReply, ChatRequest, ErrorBody, ImagesReply, QueryImagesRequest, RecommendationsReply,
    RecommendationsRequest, SummariesReply, SummariesRequest,
};
use crate::config::ServiceConfig;
use crate::error::{ResearchError, ResearchResult};
use crate::types::{Article, ChatMessage, SystemStatus};

/// 基于HTTP JSON接口的研究服务实现
#[derive(Clone)]
pub struct HttpResearchService {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpResearchService {
    /// 创建新的服务客户端，超时时间由配置决定
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn get_json<T>(&self, url: &str) -> ResearchResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> ResearchResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    /// 非2xx按状态码归类；2xx但结构不符时视为服务端错误
    async fn decode<T>(response: reqwest::Response) -> ResearchResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("research service responded {}: {}", status, body);
            return Err(ResearchError::from_status(
                status.as_u16(),
                ErrorBody::detail_from(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| ResearchError::malformed(e.to_string()))
    }
}

#[async_trait]
impl ResearchService for HttpResearchService {
    async fn get_status(&self) -> ResearchResult<SystemStatus> {
        self.get_json(&self.config.endpoint("research/status")).await
    }

    async fn get_recommendations(
        &self,
        query: &str,
        top_k: usize,
    ) -> ResearchResult<RecommendationsReply> {
        let request = RecommendationsRequest {
            research_query: query,
            top_k,
        };
        self.post_json(&self.config.endpoint("research/recommendations"), &request)
            .await
    }

    async fn get_summaries(
        &self,
        selected_articles: &[Article],
        query: &str,
    ) -> ResearchResult<SummariesReply> {
        let request = SummariesRequest {
            selected_articles,
            research_query: query,
        };
        self.post_json(&self.config.endpoint("research/summaries"), &request)
            .await
    }

    async fn chat_with_articles(
        &self,
        question: &str,
        selected_articles: &[Article],
        query: &str,
        history: &[ChatMessage],
    ) -> ResearchResult<ChatReply> {
        let request = ChatRequest {
            user_question: question,
            selected_articles,
            research_query: query,
            chat_history: history,
        };
        self.post_json(&self.config.endpoint("research/chat"), &request)
            .await
    }

    async fn get_query_images(
        &self,
        query: &str,
        article_urls: &[String],
    ) -> ResearchResult<ImagesReply> {
        let Some(url) = self.config.data_endpoint("stats/query-images") else {
            debug!("data service not configured, skipping query images");
            return Ok(ImagesReply { images: vec![] });
        };
        let request = QueryImagesRequest {
            research_query: query,
            article_urls,
        };
        self.post_json(&url, &request).await
    }
}
