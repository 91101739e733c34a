//! Event System - 경량 이벤트 이미터
//!
//! 임의의 호스트 타입에 `on` / `once` / `off` / `emit`을 붙이는 믹스인입니다.
//! 전달은 동기식이며, `emit`은 모든 리스너가 끝난 뒤에 반환됩니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (impl Emitter)                                         │
//! │  └── ListenerSlot                                            │
//! │        └── Option<ListenerRegistry>   (비면 None)            │
//! │              ├── "foo" → One(entry)                          │
//! │              └── "bar" → Many([entry, entry, ...])           │
//! │                                                              │
//! │  emit("bar") ─▶ snapshot ─▶ entry 1 ─▶ entry 2 ─▶ ...        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use eventlite_foundation::event::{Emitter, EventLite, Listener};
//!
//! let emitter: EventLite<String> = EventLite::new();
//!
//! // 1. 리스너 등록
//! let greet = Listener::new(|_host, name: &String| {
//!     println!("hello {name}");
//!     Ok(())
//! });
//! emitter.on("greet", greet.clone());
//!
//! // 2. 일회성 리스너
//! emitter.once("greet", Listener::new(|_host, _| Ok(())));
//!
//! // 3. 이벤트 발행
//! assert!(emitter.emit("greet", &"world".to_string())?);
//!
//! // 4. 제거
//! emitter.off("greet", &greet);   // 리스너 한 건
//! emitter.off_event("greet");     // 이벤트 이름 전체
//! emitter.off_all();              // 전부
//! ```

pub mod emitter;
pub mod listener;
pub mod registry;
mod set;

// Re-exports
pub use emitter::{Emitter, EventLite};
pub use listener::{Listener, ListenerFn};
pub use registry::ListenerSlot;
pub use set::EntryId;
