//! 对话视图的本地记录：合并服务端确认的历史与尚未确认的乐观消息

mod reconcile;
mod session;
mod transcript;

pub use reconcile::{Delivery, DisplayMessage, PendingMessage, reconcile};
pub use session::{ChatSession, SendOutcome};
pub use transcript::{ChatTranscript, SendTicket};
