//! Config - 이미터 설정 관리
//!
//! - `emitter.rs` - EmitterConfig (리스너 경고 임계값, 디스패치 트레이스)

mod emitter;

pub use emitter::{EmitterConfig, DEFAULT_MAX_LISTENERS};
