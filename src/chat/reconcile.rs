use crate::types::{ChatMessage, ChatRole};

/// 消息的送达状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Confirmed,
    Pending,
    Failed,
}

/// 视图中展示的一条消息
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMessage {
    pub message: ChatMessage,
    pub delivery: Delivery,
}

/// 本地插入、等待服务端确认的用户消息
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub message: ChatMessage,
    /// 发送时已确认历史的长度
    pub confirmed_len_at_send: usize,
    pub failed: bool,
}

/// 合并已确认历史与本地待确认消息。
///
/// 已确认的消息总在前面，顺序不变；若某条待确认消息在其发送之后的已确认部分中
/// 已经出现内容相同的用户消息，则视为已被确认，不再重复展示
pub fn reconcile(confirmed: &[ChatMessage], pending: &[PendingMessage]) -> Vec<DisplayMessage> {
    let mut displayed: Vec<DisplayMessage> = confirmed
        .iter()
        .cloned()
        .map(|message| DisplayMessage {
            message,
            delivery: Delivery::Confirmed,
        })
        .collect();

    for item in pending {
        let start = item.confirmed_len_at_send.min(confirmed.len());
        let echoed = confirmed[start..].iter().any(|message| {
            message.role == ChatRole::User && message.content == item.message.content
        });
        if echoed {
            continue;
        }
        displayed.push(DisplayMessage {
            message: item.message.clone(),
            delivery: if item.failed {
                Delivery::Failed
            } else {
                Delivery::Pending
            },
        });
    }

    displayed
}
