/// 发起网络请求的操作类别，每类各自维护一个递增的请求代号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Recommendations,
    Summaries,
    Chat,
    Images,
}

/// 每类请求最近一次发出的代号；只有最新代号的响应会被应用
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestGenerations {
    recommendations: u64,
    summaries: u64,
    chat: u64,
    images: u64,
}

impl RequestGenerations {
    fn slot(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Recommendations => &mut self.recommendations,
            RequestKind::Summaries => &mut self.summaries,
            RequestKind::Chat => &mut self.chat,
            RequestKind::Images => &mut self.images,
        }
    }

    /// 为新请求分配代号
    pub fn begin(&mut self, kind: RequestKind) -> u64 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }

    pub fn is_current(&self, kind: RequestKind, generation: u64) -> bool {
        let latest = match kind {
            RequestKind::Recommendations => self.recommendations,
            RequestKind::Summaries => self.summaries,
            RequestKind::Chat => self.chat,
            RequestKind::Images => self.images,
        };
        latest == generation
    }

    /// 使所有在途请求失效
    pub fn invalidate_all(&mut self) {
        for kind in [
            RequestKind::Recommendations,
            RequestKind::Summaries,
            RequestKind::Chat,
            RequestKind::Images,
        ] {
            *self.slot(kind) += 1;
        }
    }
}
