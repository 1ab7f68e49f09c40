use log::debug;
use tokio::sync::Mutex;

use super::reconcile::DisplayMessage;
use super::transcript::ChatTranscript;
use crate::error::ResearchResult;
use crate::flow::{RequestOutcome, ResearchFlowController};

/// 一次发送的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// 服务端已确认
    Sent,
    /// 内容为空或上一条消息尚在等待回复，未发出请求
    Ignored,
    /// 请求发出后流程被重置，响应被丢弃
    Discarded,
}

/// 对话视图：在控制器之上维护乐观消息，同一时间只允许一个问题在途
pub struct ChatSession {
    controller: ResearchFlowController,
    transcript: Mutex<ChatTranscript>,
}

impl ChatSession {
    pub fn new(controller: ResearchFlowController) -> Self {
        Self {
            controller,
            transcript: Mutex::new(ChatTranscript::new()),
        }
    }

    /// 与控制器状态同步，返回展示内容是否变化
    pub async fn sync(&self) -> bool {
        let state = self.controller.snapshot().await;
        self.transcript
            .lock()
            .await
            .observe(&state.research_query, &state.chat_history)
    }

    pub async fn send(&self, question: &str) -> ResearchResult<SendOutcome> {
        self.sync().await;

        let Some(ticket) = self.transcript.lock().await.begin_send(question) else {
            debug!("chat send ignored: empty question or a reply is still pending");
            return Ok(SendOutcome::Ignored);
        };

        match self.controller.ask(&ticket.message.content).await {
            Ok(RequestOutcome::Applied) => {
                self.sync().await;
                let mut transcript = self.transcript.lock().await;
                transcript.complete_send(&ticket);
                if transcript.is_current(&ticket) {
                    Ok(SendOutcome::Sent)
                } else {
                    debug!("chat reply arrived after the topic changed");
                    Ok(SendOutcome::Discarded)
                }
            }
            Ok(RequestOutcome::Discarded) => {
                self.transcript.lock().await.abandon_send(&ticket);
                self.sync().await;
                Ok(SendOutcome::Discarded)
            }
            Err(e) => {
                self.transcript
                    .lock()
                    .await
                    .fail_send(&ticket, e.user_message());
                Err(e)
            }
        }
    }

    /// 处理外部传入的初始问题（例如点击了推荐追问），返回是否已取用
    pub async fn dispatch_initial_question(&self, initial: Option<&str>) -> ResearchResult<bool> {
        let taken = self.transcript.lock().await.take_initial_question(initial);
        match taken {
            Some(question) => {
                self.send(&question).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn displayed(&self) -> Vec<DisplayMessage> {
        self.transcript.lock().await.displayed()
    }

    pub async fn is_waiting(&self) -> bool {
        self.transcript.lock().await.is_waiting()
    }

    pub async fn error(&self) -> Option<String> {
        self.transcript.lock().await.error().map(str::to_string)
    }
}
