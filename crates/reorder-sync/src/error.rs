//! 同步錯誤類型

use std::time::Duration;

/// 外部資料來源的錯誤
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("請求被限流（建議等待 {retry_after:?}）")]
    RateLimited { retry_after: Option<Duration> },

    #[error("傳輸失敗: {0}")]
    Transport(String),

    #[error("回應格式無效: {0}")]
    InvalidResponse(String),

    #[error("重試 {attempts} 次後仍失敗: {last}")]
    Exhausted { attempts: u32, last: Box<SyncError> },
}

impl SyncError {
    /// 限流與傳輸錯誤可以重試；格式錯誤重試也不會成功
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::RateLimited { .. } | SyncError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(SyncError::RateLimited { retry_after: None }.is_retryable());
        assert!(SyncError::Transport("timeout".to_string()).is_retryable());
        assert!(!SyncError::InvalidResponse("missing SaleList".to_string()).is_retryable());
    }

    #[test]
    fn test_exhausted_message_includes_cause() {
        let err = SyncError::Exhausted {
            attempts: 3,
            last: Box::new(SyncError::Transport("connection reset".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains('3'));
        assert!(message.contains("connection reset"));
    }
}
