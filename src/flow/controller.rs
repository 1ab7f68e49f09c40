use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::RwLock;

use super::generation::{RequestGenerations, RequestKind};
use super::state::FlowState;
use super::{QUERY_REQUIRED, QUESTION_REQUIRED, ResearchCategory, SELECTION_REQUIRED};
use crate::error::{ResearchError, ResearchResult};
use crate::service::ResearchService;
use crate::types::{Article, ChatMessage, FlowStep, SystemStatus};

/// 配图请求最多携带的文章链接数
const MAX_IMAGE_SOURCE_URLS: usize = 5;

/// 网络请求完成后的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 响应已写入状态
    Applied,
    /// 同类请求已有更新的一次，或流程已重置，响应被丢弃
    Discarded,
}

struct Inner {
    state: FlowState,
    generations: RequestGenerations,
}

/// 研究流程控制器，持有向导状态并协调研究服务
#[derive(Clone)]
pub struct ResearchFlowController {
    service: Arc<dyn ResearchService>,
    inner: Arc<RwLock<Inner>>,
}

impl ResearchFlowController {
    pub fn new(service: Arc<dyn ResearchService>) -> Self {
        Self {
            service,
            inner: Arc::new(RwLock::new(Inner {
                state: FlowState::default(),
                generations: RequestGenerations::default(),
            })),
        }
    }

    /// 当前状态的只读快照
    pub async fn snapshot(&self) -> FlowState {
        self.inner.read().await.state.clone()
    }

    pub async fn current_step(&self) -> FlowStep {
        self.inner.read().await.state.current_step
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.state.loading
    }

    /// 获取系统状态，失败只记录日志
    pub async fn load_status(&self) -> Option<SystemStatus> {
        match self.service.get_status().await {
            Ok(status) => {
                info!(
                    "research service {} with {} articles available",
                    status.status, status.articles_available
                );
                self.inner.write().await.state.system_status = Some(status.clone());
                Some(status)
            }
            Err(e) => {
                warn!("failed to load system status: {}", e);
                None
            }
        }
    }

    pub async fn set_query(&self, text: &str) {
        self.inner.write().await.state.research_query = text.trim().to_string();
    }

    /// 使用预设研究方向发起推荐
    pub async fn apply_category(
        &self,
        category: ResearchCategory,
        top_k: usize,
    ) -> ResearchResult<RequestOutcome> {
        self.set_query(category.query()).await;
        self.get_recommendations(category.query(), top_k).await
    }

    pub async fn get_recommendations(
        &self,
        query: &str,
        top_k: usize,
    ) -> ResearchResult<RequestOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.reject(QUERY_REQUIRED).await);
        }

        let generation = self.begin(RequestKind::Recommendations).await;
        debug!("requesting {} recommendations for {:?}", top_k, query);
        let result = self.service.get_recommendations(query, top_k).await;

        self.finish(RequestKind::Recommendations, generation, result, |state, reply| {
            info!("received {} recommendations", reply.recommendations.len());
            state.replace_recommendations(query, reply.recommendations);
            RequestOutcome::Applied
        })
        .await
    }

    /// 选中文章；ID不存在或已选中时不做任何事
    pub async fn select_article(&self, id: &str) -> bool {
        self.inner.write().await.state.set_selected(id, true)
    }

    /// 取消选中；ID不存在或未选中时不做任何事
    pub async fn deselect_article(&self, id: &str) -> bool {
        self.inner.write().await.state.set_selected(id, false)
    }

    pub async fn clear_selections(&self) {
        self.inner.write().await.state.clear_selections();
    }

    /// 研究问题和文章选择的校验都在设置加载状态和发起请求之前完成
    pub async fn get_summaries(
        &self,
        selected_articles: &[Article],
        query: &str,
    ) -> ResearchResult<RequestOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.reject(QUERY_REQUIRED).await);
        }
        if selected_articles.is_empty() {
            return Err(self.reject(SELECTION_REQUIRED).await);
        }

        let generation = self.begin(RequestKind::Summaries).await;
        debug!("requesting summaries for {} articles", selected_articles.len());
        let result = self.service.get_summaries(selected_articles, query).await;

        self.finish(RequestKind::Summaries, generation, result, |state, reply| {
            let bundle = reply.into_bundle();
            info!(
                "received {} summaries and {} suggested questions",
                bundle.article_summaries.len(),
                bundle.suggested_questions.len()
            );
            state.summaries = Some(bundle);
            state.current_step = FlowStep::Summaries;
            RequestOutcome::Applied
        })
        .await
    }

    /// 以当前的选择和研究问题请求摘要
    pub async fn request_summaries(&self) -> ResearchResult<RequestOutcome> {
        let (selected, query) = {
            let inner = self.inner.read().await;
            (
                inner.state.selected_articles(),
                inner.state.research_query.clone(),
            )
        };
        self.get_summaries(&selected, &query).await
    }

    /// 服务端返回的对话记录是完整的；这里只追加本地尚未记录的部分。
    /// 用户发出的消息不在这里写入，乐观展示由对话视图负责。
    /// 回复到达时研究问题已经变化的，属于旧话题，直接丢弃
    pub async fn send_chat_message(
        &self,
        question: &str,
        selected_articles: &[Article],
        query: &str,
        prior_history: &[ChatMessage],
    ) -> ResearchResult<RequestOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(self.reject(QUESTION_REQUIRED).await);
        }

        let (generation, topic) = {
            let mut inner = self.inner.write().await;
            let topic = inner.state.research_query.clone();
            (Self::start(&mut inner, RequestKind::Chat), topic)
        };
        debug!("sending chat question with {} prior messages", prior_history.len());
        let result = self
            .service
            .chat_with_articles(question, selected_articles, query, prior_history)
            .await;

        self.finish(RequestKind::Chat, generation, result, |state, reply| {
            if state.research_query != topic {
                debug!("discarding chat reply for previous topic {:?}", topic);
                return RequestOutcome::Discarded;
            }
            let appended = state.append_confirmed_history(reply.chat_history);
            if appended == 0 {
                warn!("chat reply did not extend the confirmed history");
            }
            state.follow_up_questions = reply.follow_up_questions;
            state.current_step = FlowStep::Chat;
            RequestOutcome::Applied
        })
        .await
    }

    /// 以当前的选择、研究问题和对话记录发送问题
    pub async fn ask(&self, question: &str) -> ResearchResult<RequestOutcome> {
        let (selected, query, history) = {
            let inner = self.inner.read().await;
            (
                inner.state.selected_articles(),
                inner.state.research_query.clone(),
                inner.state.chat_history.clone(),
            )
        };
        self.send_chat_message(question, &selected, &query, &history)
            .await
    }

    /// 拉取查询配图，失败不影响流程，也不改变加载状态和错误信息
    pub async fn fetch_query_images(&self) -> usize {
        let (query, urls, generation) = {
            let mut inner = self.inner.write().await;
            let urls: Vec<String> = inner
                .state
                .recommendations
                .iter()
                .map(|a| a.url.clone())
                .filter(|url| !url.is_empty())
                .take(MAX_IMAGE_SOURCE_URLS)
                .collect();
            let query = inner.state.research_query.clone();
            (query, urls, inner.generations.begin(RequestKind::Images))
        };
        if query.is_empty() {
            return 0;
        }

        match self.service.get_query_images(&query, &urls).await {
            Ok(reply) => {
                let mut inner = self.inner.write().await;
                if !inner.generations.is_current(RequestKind::Images, generation) {
                    debug!("discarding stale query images");
                    return 0;
                }
                let count = reply.images.len();
                inner.state.query_images = reply.images;
                count
            }
            Err(e) => {
                warn!("failed to load query images: {}", e);
                0
            }
        }
    }

    /// 直接跳转，不做任何前置检查
    pub async fn next_step(&self, step: FlowStep) {
        let mut inner = self.inner.write().await;
        debug!("step {} -> {}", inner.state.current_step, step);
        inner.state.current_step = step;
    }

    pub async fn go_back(&self) {
        self.next_step(FlowStep::Recommendations).await;
    }

    /// 只隐藏加载状态，在途请求的响应到达后仍会写入状态
    pub async fn cancel_loading(&self) {
        self.inner.write().await.state.loading = false;
    }

    /// 回到初始状态，保留系统状态；在途请求的响应将被丢弃
    pub async fn reset_flow(&self) {
        let mut inner = self.inner.write().await;
        inner.generations.invalidate_all();
        inner.state.reset();
        info!("research flow reset");
    }

    async fn reject(&self, message: &str) -> ResearchError {
        self.inner.write().await.state.error = Some(message.to_string());
        ResearchError::validation(message)
    }

    async fn begin(&self, kind: RequestKind) -> u64 {
        Self::start(&mut *self.inner.write().await, kind)
    }

    fn start(inner: &mut Inner, kind: RequestKind) -> u64 {
        inner.state.error = None;
        inner.state.loading = true;
        inner.generations.begin(kind)
    }

    async fn finish<T, F>(
        &self,
        kind: RequestKind,
        generation: u64,
        result: ResearchResult<T>,
        apply: F,
    ) -> ResearchResult<RequestOutcome>
    where
        F: FnOnce(&mut FlowState, T) -> RequestOutcome,
    {
        let mut inner = self.inner.write().await;
        if !inner.generations.is_current(kind, generation) {
            debug!("discarding stale {:?} response #{}", kind, generation);
            return Ok(RequestOutcome::Discarded);
        }

        inner.state.loading = false;
        match result {
            Ok(reply) => {
                inner.state.error = None;
                Ok(apply(&mut inner.state, reply))
            }
            Err(e) => {
                warn!("{:?} request failed: {}", kind, e);
                inner.state.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
