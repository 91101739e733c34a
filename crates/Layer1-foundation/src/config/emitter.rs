//! Emitter Config - 리스너 레지스트리 설정
//!
//! 호스트마다 하나의 `EmitterConfig`를 가진다. 설정은 동작 결과를 바꾸지 않고
//! 진단(경고/트레이스 로그)만 조절한다.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 이벤트 이름 하나당 기본 최대 리스너 수 (초과 시 경고만 출력)
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// 리스너 레지스트리 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmitterConfig {
    /// 이벤트 이름 하나에 등록 가능한 리스너 수의 경고 임계값 (0 = 무제한)
    ///
    /// 등록 자체는 막지 않는다. 리스너 누수를 찾기 위한 `warn!` 로그만 남긴다.
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,

    /// 디스패치마다 리스너 호출을 `trace!`로 기록
    #[serde(default)]
    pub trace_dispatch: bool,
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
            trace_dispatch: false,
        }
    }
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 경고 임계값 없이 사용
    pub fn unlimited() -> Self {
        Self {
            max_listeners: 0,
            ..Self::default()
        }
    }

    /// 최대 리스너 수 설정
    pub fn with_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    /// 디스패치 트레이스 설정
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// `count`개 리스너가 임계값을 넘는지 확인
    pub fn exceeds_max_listeners(&self, count: usize) -> bool {
        self.max_listeners > 0 && count > self.max_listeners
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// JSON 문자열에서 로드
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// JSON 파일에서 로드
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// JSON 파일에서 로드 (파일이 없으면 None)
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    /// JSON 파일에서 로드 (실패 시 기본값)
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load_from(path).unwrap_or_default()
    }
}
