//! Error types for EventLite
//!
//! 레지스트리 조작(on/once/off)은 실패하지 않는다. 에러는 두 곳에서만 나온다:
//! 리스너 실행 실패와 설정 로드 실패.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// EventLite 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 디스패치 관련
    // ========================================================================
    /// 리스너가 `Err`를 반환함. 같은 emit의 나머지 리스너는 호출되지 않는다.
    #[error("Listener failed on '{event}': {source}")]
    Listener {
        event: String,
        #[source]
        source: anyhow::Error,
    },

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 리스너 실패 에러 생성 헬퍼
    pub fn listener(event: impl Into<String>, source: anyhow::Error) -> Self {
        Error::Listener {
            event: event.into(),
            source,
        }
    }

    /// 실패한 디스패치의 이벤트 이름
    pub fn event(&self) -> Option<&str> {
        match self {
            Error::Listener { event, .. } => Some(event),
            _ => None,
        }
    }

    /// 리스너 실행 중 발생한 에러인지 확인
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, Error::Listener { .. })
    }
}
