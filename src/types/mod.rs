//! 研究流程中流转的数据记录，字段与研究服务的JSON结构一一对应

pub mod article;
pub mod chat;
pub mod status;
pub mod step;
pub mod summary;

pub use article::Article;
pub use chat::{ChatMessage, ChatRole, FollowUpQuestion};
pub use status::{QueryImage, SystemStatus};
pub use step::FlowStep;
pub use summary::{ArticleSummary, ResearchInsights, SuggestedQuestion, SummaryBundle};
