pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod service;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{ResearchError, ResearchResult};
pub use flow::ResearchFlowController;
pub use workflow::launch;
