use crate::types::{
    Article, ChatMessage, FlowStep, FollowUpQuestion, QueryImage, SuggestedQuestion,
    SummaryBundle, SystemStatus,
};

/// 已选文章的ID集合，按选择顺序保存
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    /// 加入集合，已存在时返回false
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// 移出集合，不存在时返回false
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// 向导的完整状态，只能通过控制器修改
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    pub current_step: FlowStep,
    pub research_query: String,
    pub recommendations: Vec<Article>,
    pub selection: SelectionSet,
    pub summaries: Option<SummaryBundle>,
    /// 服务端确认过的对话记录，只追加
    pub chat_history: Vec<ChatMessage>,
    pub follow_up_questions: Vec<FollowUpQuestion>,
    pub query_images: Vec<QueryImage>,
    /// 启动时获取的系统状态，重置流程时保留
    pub system_status: Option<SystemStatus>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FlowState {
    /// 已选文章，按选择顺序
    pub fn selected_articles(&self) -> Vec<Article> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.recommendations.iter().find(|a| &a.id == id))
            .cloned()
            .collect()
    }

    pub fn suggested_questions(&self) -> &[SuggestedQuestion] {
        self.summaries
            .as_ref()
            .map(|bundle| bundle.suggested_questions.as_slice())
            .unwrap_or(&[])
    }

    /// 每篇文章的selected标记与选择集合是否一致
    pub fn selection_consistent(&self) -> bool {
        let flagged = self.recommendations.iter().filter(|a| a.selected).count();
        flagged == self.selection.len()
            && self
                .recommendations
                .iter()
                .all(|a| a.selected == self.selection.contains(&a.id))
    }

    pub(crate) fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        let Some(article) = self.recommendations.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if article.selected == selected {
            return false;
        }
        article.selected = selected;
        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(id);
        }
        true
    }

    pub(crate) fn clear_selections(&mut self) {
        for article in &mut self.recommendations {
            article.selected = false;
        }
        self.selection.clear();
    }

    /// 用新的推荐结果替换旧结果，同时清空选择和摘要
    pub(crate) fn replace_recommendations(&mut self, query: &str, mut articles: Vec<Article>) {
        for article in &mut articles {
            article.selected = false;
        }
        self.research_query = query.to_string();
        self.recommendations = articles;
        self.selection.clear();
        self.summaries = None;
        self.query_images.clear();
        self.current_step = FlowStep::Recommendations;
    }

    /// 追加服务端返回的对话记录中超出本地长度的部分
    pub(crate) fn append_confirmed_history(&mut self, confirmed: Vec<ChatMessage>) -> usize {
        let known = self.chat_history.len();
        if confirmed.len() < known {
            return 0;
        }
        let appended = confirmed.len() - known;
        self.chat_history.extend(confirmed.into_iter().skip(known));
        appended
    }

    /// 回到初始状态，只保留系统状态
    pub(crate) fn reset(&mut self) {
        let system_status = self.system_status.take();
        *self = FlowState {
            system_status,
            ..FlowState::default()
        };
    }
}
