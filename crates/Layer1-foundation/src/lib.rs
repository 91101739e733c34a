//! # eventlite-foundation
//!
//! Light-weight event emitter for any host type:
//! - Event: on / once / off / emit 믹스인 (`Emitter` trait, `impl_emitter!`)
//! - Config: 리스너 경고 임계값, 디스패치 트레이스 (EmitterConfig)
//! - Error: 리스너 실패, 설정 로드 실패
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Host type                                               │
//! │  ├── on / once ──▶ ListenerSlot (lazy registry)          │
//! │  ├── off ────────▶ entry / event / all                   │
//! │  └── emit ───────▶ snapshot ─▶ listeners (등록 순)        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{EmitterConfig, DEFAULT_MAX_LISTENERS};

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    // Mixin
    Emitter,
    EventLite,
    // Listener
    EntryId,
    Listener,
    ListenerFn,
    ListenerSlot,
};
