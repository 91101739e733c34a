//! Emitter - on/once/off/emit 믹스인
//!
//! 호스트 타입이 `ListenerSlot` 필드를 가지고 `Emitter`를 구현하면 네 가지
//! 메서드를 모두 얻는다. 제네릭이 아닌 호스트는 `impl_emitter!`로 한 줄에
//! 붙일 수 있다.

use super::listener::Listener;
use super::registry::ListenerSlot;
use crate::config::EmitterConfig;
use crate::Result;

// ============================================================================
// Emitter Trait
// ============================================================================

/// 이벤트 기능 믹스인
///
/// 리스너는 `(&호스트, &인자)`로 호출된다. 구현자는 `listener_slot`만 제공하면 된다.
pub trait Emitter: Sized {
    /// `emit`에 넘기는 인자 타입
    type Args;

    /// 호스트가 소유한 리스너 슬롯
    fn listener_slot(&self) -> &ListenerSlot<Self, Self::Args>;

    /// 리스너 등록 (기존 리스너 뒤에 추가)
    fn on(&self, event: &str, listener: Listener<Self, Self::Args>) -> &Self {
        self.listener_slot().add(event, listener, false);
        self
    }

    /// 일회성 리스너 등록
    ///
    /// 첫 `emit`에서 리스너를 호출하기 직전에 스스로 제거된다.
    /// 호출 전이라면 같은 핸들로 `off`해서 취소할 수 있다.
    fn once(&self, event: &str, listener: Listener<Self, Self::Args>) -> &Self {
        self.listener_slot().add(event, listener, true);
        self
    }

    /// 리스너 한 건 제거
    ///
    /// 같은 리스너가 여러 번 등록되어 있으면 가장 먼저 등록된 것 하나만 제거한다.
    fn off(&self, event: &str, listener: &Listener<Self, Self::Args>) -> &Self {
        self.listener_slot().remove(event, listener);
        self
    }

    /// 이벤트 이름의 리스너 전부 제거
    ///
    /// 빈 문자열도 평범한 이벤트 이름이다. 전체 제거는 `off_all`.
    fn off_event(&self, event: &str) -> &Self {
        self.listener_slot().remove_event(event);
        self
    }

    /// 모든 리스너 제거
    fn off_all(&self) -> &Self {
        self.listener_slot().clear();
        self
    }

    /// 이벤트 발행
    ///
    /// 리스너가 하나라도 호출되면 `Ok(true)`. 리스너가 없으면 아무 것도 만들지 않고
    /// `Ok(false)`.
    fn emit(&self, event: &str, args: &Self::Args) -> Result<bool> {
        self.listener_slot().dispatch(self, event, args)
    }

    /// 리스너가 하나라도 등록되어 있는지 확인
    fn has_listeners(&self) -> bool {
        self.listener_slot().is_allocated()
    }

    /// 이벤트 이름에 등록된 리스너 수
    fn listener_count(&self, event: &str) -> usize {
        self.listener_slot().listener_count(event)
    }

    /// 등록된 이벤트 이름 (정렬됨)
    fn event_names(&self) -> Vec<String> {
        self.listener_slot().event_names()
    }
}

/// 호스트 타입에 `Emitter` 구현을 붙인다
///
/// ```ignore
/// struct Player {
///     name: String,
///     events: ListenerSlot<Player, u32>,
/// }
///
/// impl_emitter!(Player, u32, events);
///
/// player.on("score", Listener::new(|p: &Player, n: &u32| { ... }));
/// ```
#[macro_export]
macro_rules! impl_emitter {
    ($host:ty, $args:ty, $field:ident) => {
        impl $crate::event::Emitter for $host {
            type Args = $args;

            fn listener_slot(&self) -> &$crate::event::ListenerSlot<Self, $args> {
                &self.$field
            }
        }
    };
}

// ============================================================================
// EventLite
// ============================================================================

/// 단독으로 쓰는 이미터
///
/// 별도 호스트 타입 없이 이벤트만 필요할 때 사용한다.
pub struct EventLite<A> {
    slot: ListenerSlot<EventLite<A>, A>,
}

impl<A> EventLite<A> {
    /// 기본 설정으로 생성
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// 커스텀 설정으로 생성
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            slot: ListenerSlot::with_config(config),
        }
    }

    /// 리스너에게 도달한 emit 횟수
    pub fn emit_count(&self) -> u64 {
        self.slot.emit_count()
    }
}

impl<A> Emitter for EventLite<A> {
    type Args = A;

    fn listener_slot(&self) -> &ListenerSlot<Self, A> {
        &self.slot
    }
}

impl<A> Default for EventLite<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for EventLite<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLite").field("slot", &self.slot).finish()
    }
}

// ============================================================================
// 테스트
// ============================================================================
