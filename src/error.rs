//! 研究流程的错误分类，以及面向用户的提示文案

/// 服务端错误的细分类别，只用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    BadRequest,
    NotFound,
    ServerError,
    Unavailable,
    /// 2xx响应但内容不符合约定的结构
    MalformedResponse,
    Other,
}

impl ServiceErrorKind {
    /// 按HTTP状态码归类
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ServiceErrorKind::BadRequest,
            404 => ServiceErrorKind::NotFound,
            503 => ServiceErrorKind::Unavailable,
            500..=599 => ServiceErrorKind::ServerError,
            _ => ServiceErrorKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResearchError {
    /// 输入校验失败，发生在任何网络请求之前
    #[error("{0}")]
    Validation(String),

    #[error("network error: {message}")]
    Network { message: String, timed_out: bool },

    #[error("research service error ({kind:?}, status {status:?}): {detail}")]
    Service {
        kind: ServiceErrorKind,
        status: Option<u16>,
        detail: String,
    },
}

pub type ResearchResult<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        ResearchError::Validation(message.into())
    }

    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        ResearchError::Service {
            kind: ServiceErrorKind::from_status(status),
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        ResearchError::Service {
            kind: ServiceErrorKind::MalformedResponse,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ResearchError::Validation(_))
    }

    /// 面向用户的提示文案，同一类错误总是得到相同的模板
    pub fn user_message(&self) -> String {
        match self {
            ResearchError::Validation(message) => message.clone(),
            ResearchError::Network { timed_out: true, .. } => {
                "The research service took too long to respond. Please try again.".to_string()
            }
            ResearchError::Network { .. } => {
                "Unable to reach the research service. Check your connection and try again."
                    .to_string()
            }
            ResearchError::Service { kind, status, detail } => match kind {
                ServiceErrorKind::BadRequest => format!("Invalid request: {}", detail),
                ServiceErrorKind::NotFound => "The requested resource was not found.".to_string(),
                ServiceErrorKind::ServerError => {
                    "The research service encountered an internal error. Please try again later."
                        .to_string()
                }
                ServiceErrorKind::Unavailable => {
                    "The research service is temporarily unavailable. Please try again later."
                        .to_string()
                }
                ServiceErrorKind::MalformedResponse => {
                    "The research service returned an unexpected response.".to_string()
                }
                ServiceErrorKind::Other => match status {
                    Some(code) => format!(
                        "Unexpected response from the research service (status {}).",
                        code
                    ),
                    None => "Unexpected response from the research service.".to_string(),
                },
            },
        }
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ResearchError::malformed(err.to_string());
        }
        if let Some(status) = err.status() {
            return ResearchError::from_status(status.as_u16(), err.to_string());
        }
        ResearchError::Network {
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}
