use super::reconcile::{DisplayMessage, PendingMessage, reconcile};
use crate::types::ChatMessage;

/// 一次发送的凭据：乐观插入的消息，以及发送时所处的话题代号
#[derive(Debug, Clone, PartialEq)]
pub struct SendTicket {
    pub message: ChatMessage,
    pub epoch: u64,
}

/// 对话视图的本地状态。
///
/// 控制器持有服务端确认过的历史；这里额外记录用户刚发出、尚未确认的消息，
/// 并在观察到确认历史增长时以服务端结果为准
#[derive(Debug, Default)]
pub struct ChatTranscript {
    /// 当前话题下已确认的消息
    confirmed: Vec<ChatMessage>,
    pending: Vec<PendingMessage>,
    /// 上次观察到的控制器历史长度
    observed_len: usize,
    /// 当前话题开始时控制器历史的长度，之前的消息属于旧话题
    topic_offset: usize,
    observed_topic: Option<String>,
    /// 话题切换或流程重置时递增
    epoch: u64,
    /// 正在等待回复的消息ID
    in_flight: Option<String>,
    error: Option<String>,
    consumed_initial: Option<String>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 观察控制器的话题和确认历史，返回展示内容是否变化
    pub fn observe(&mut self, topic: &str, confirmed: &[ChatMessage]) -> bool {
        let mut changed = false;

        match self.observed_topic.as_deref() {
            None => self.observed_topic = Some(topic.to_string()),
            Some(previous) if previous != topic => {
                // 新话题开启新对话
                self.clear();
                self.observed_topic = Some(topic.to_string());
                self.topic_offset = confirmed.len();
                self.observed_len = confirmed.len();
                return true;
            }
            Some(_) => {}
        }

        if confirmed.len() < self.observed_len {
            // 控制器被重置
            self.clear();
            self.topic_offset = 0;
            changed = true;
        }

        if confirmed.len() > self.observed_len || changed {
            let offset = self.topic_offset.min(confirmed.len());
            self.confirmed = confirmed[offset..].to_vec();
            if confirmed.len() > self.observed_len {
                self.pending.clear();
                self.in_flight = None;
            }
            changed = true;
        }
        self.observed_len = confirmed.len();

        changed
    }

    /// 乐观插入一条用户消息；正在等待回复或内容为空时拒绝
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        let text = text.trim();
        if text.is_empty() || self.in_flight.is_some() {
            return None;
        }
        let message = ChatMessage::local_user(text);
        self.pending.push(PendingMessage {
            message: message.clone(),
            confirmed_len_at_send: self.confirmed.len(),
            failed: false,
        });
        self.in_flight = Some(message.id.clone());
        self.error = None;
        Some(SendTicket {
            message,
            epoch: self.epoch,
        })
    }

    /// 凭据是否仍属于当前话题
    pub fn is_current(&self, ticket: &SendTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// 请求已被控制器接受；若回复没有带来新的确认消息，撤下乐观消息
    pub fn complete_send(&mut self, ticket: &SendTicket) {
        self.pending.retain(|item| item.message.id != ticket.message.id);
        self.release(ticket);
    }

    /// 发送失败：标记该条乐观消息并恢复输入；旧话题的失败不再提示
    pub fn fail_send(&mut self, ticket: &SendTicket, error: impl Into<String>) {
        if !self.is_current(ticket) {
            return;
        }
        if let Some(item) = self
            .pending
            .iter_mut()
            .find(|item| item.message.id == ticket.message.id)
        {
            item.failed = true;
        }
        self.release(ticket);
        self.error = Some(error.into());
    }

    /// 在途请求被丢弃（例如流程已重置），撤回该条乐观消息
    pub fn abandon_send(&mut self, ticket: &SendTicket) {
        self.pending.retain(|item| item.message.id != ticket.message.id);
        self.release(ticket);
    }

    /// 外部传入的初始问题，每个取值只会被取出一次；等待回复时不取出
    pub fn take_initial_question(&mut self, initial: Option<&str>) -> Option<String> {
        let question = initial.map(str::trim).filter(|q| !q.is_empty())?;
        if self.is_waiting() || self.consumed_initial.as_deref() == Some(question) {
            return None;
        }
        self.consumed_initial = Some(question.to_string());
        Some(question.to_string())
    }

    pub fn displayed(&self) -> Vec<DisplayMessage> {
        reconcile(&self.confirmed, &self.pending)
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 只有等待的正是这条消息时才恢复输入
    fn release(&mut self, ticket: &SendTicket) {
        if self.in_flight.as_deref() == Some(ticket.message.id.as_str()) {
            self.in_flight = None;
        }
    }

    fn clear(&mut self) {
        self.confirmed.clear();
        self.pending.clear();
        self.in_flight = None;
        self.error = None;
        self.epoch += 1;
    }
}
