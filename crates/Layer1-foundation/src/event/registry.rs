//! Listener Registry - 이벤트 이름별 리스너 저장소
//!
//! `ListenerRegistry`는 `이벤트 이름 -> 비어 있지 않은 ListenerSet` 맵이다.
//! `ListenerSlot`은 호스트가 필드로 들고 있는 자리로, 첫 등록 시 레지스트리를
//! 만들고 마지막 리스너가 빠지면 다시 비운다(`None`).

use super::listener::Listener;
use super::set::{Entry, EntryId, ListenerSet, Removal};
use crate::config::EmitterConfig;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

// ============================================================================
// ListenerRegistry
// ============================================================================

/// 이벤트 이름 -> 리스너 목록
///
/// 키가 있으면 목록은 항상 비어 있지 않다.
pub(crate) struct ListenerRegistry<H, A> {
    sets: HashMap<String, ListenerSet<H, A>>,
}

impl<H, A> ListenerRegistry<H, A> {
    fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// 등록된 이벤트 이름이 없는지 확인
    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// 이벤트 이름에 등록된 리스너 수
    pub fn listener_count(&self, event: &str) -> usize {
        self.sets.get(event).map_or(0, ListenerSet::len)
    }

    /// 등록된 이벤트 이름 (정렬됨)
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sets.keys().cloned().collect();
        names.sort();
        names
    }

    /// 리스너를 끝에 추가하고 추가 후 개수를 반환
    fn push(&mut self, event: &str, entry: Entry<H, A>) -> usize {
        match self.sets.get_mut(event) {
            Some(set) => {
                set.push(entry);
                set.len()
            }
            None => {
                self.sets.insert(event.to_string(), ListenerSet::new(entry));
                1
            }
        }
    }

    /// 조건에 맞는 첫 엔트리 제거. 목록이 비면 키도 지운다.
    fn remove_first<P>(&mut self, event: &str, matches: P) -> Option<Entry<H, A>>
    where
        P: FnMut(&Entry<H, A>) -> bool,
    {
        let set = self.sets.get_mut(event)?;
        match set.remove_first(matches) {
            Removal::Missing => None,
            Removal::Removed(entry) => Some(entry),
            Removal::Emptied(entry) => {
                self.sets.remove(event);
                Some(entry)
            }
        }
    }

    /// 이벤트 이름의 리스너 전부 제거
    fn remove_event(&mut self, event: &str) -> Option<ListenerSet<H, A>> {
        self.sets.remove(event)
    }

    fn snapshot(&self, event: &str) -> Option<Vec<Entry<H, A>>> {
        self.sets.get(event).map(ListenerSet::snapshot)
    }
}

impl<H, A> fmt::Debug for ListenerRegistry<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sets.iter()).finish()
    }
}

// ============================================================================
// ListenerSlot
// ============================================================================

/// 호스트가 소유하는 리스너 레지스트리 자리
///
/// 모든 메서드는 `&self`를 받는다. 내부 `Mutex`는 리스너 호출 중에는 잡혀 있지
/// 않으므로, 리스너가 같은 호스트에 `on`/`off`/`emit`을 다시 호출해도 된다.
pub struct ListenerSlot<H, A> {
    config: EmitterConfig,
    registry: Mutex<Option<ListenerRegistry<H, A>>>,
    /// 레지스트리를 다시 만들어도 ID가 겹치지 않도록 슬롯에 둔다
    next_id: AtomicU64,
    emit_count: AtomicU64,
}

impl<H, A> ListenerSlot<H, A> {
    /// 기본 설정으로 생성
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// 커스텀 설정으로 생성
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(None),
            next_id: AtomicU64::new(0),
            emit_count: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 리스너 등록 (`once`가 true면 첫 디스패치에서 스스로 제거)
    pub fn add(&self, event: &str, listener: Listener<H, A>, once: bool) -> EntryId {
        let id = EntryId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        let count = {
            let mut guard = self.registry.lock();
            let registry = guard.get_or_insert_with(ListenerRegistry::new);
            registry.push(
                event,
                Entry {
                    id,
                    listener,
                    once,
                },
            )
        };

        debug!(event = %event, entry_id = %id, once, "Registering event listener");

        // 임계값을 처음 넘는 순간에만 경고
        if self.config.exceeds_max_listeners(count)
            && !self.config.exceeds_max_listeners(count - 1)
        {
            warn!(
                event = %event,
                count,
                max_listeners = self.config.max_listeners,
                "Possible listener leak: too many listeners for one event"
            );
        }

        id
    }

    // ========================================================================
    // 제거
    // ========================================================================

    /// 리스너의 첫 등록 한 건 제거 (`once` 등록 포함)
    pub fn remove(&self, event: &str, listener: &Listener<H, A>) -> bool {
        self.remove_where(event, |entry| entry.listener == *listener)
    }

    /// 특정 등록 한 건 제거
    pub fn remove_entry(&self, event: &str, id: EntryId) -> bool {
        self.remove_where(event, |entry| entry.id == id)
    }

    /// 이벤트 이름의 리스너 전부 제거, 제거된 수 반환
    pub fn remove_event(&self, event: &str) -> usize {
        // 제거된 리스너는 락을 푼 뒤에 drop
        let removed_set = {
            let mut guard = self.registry.lock();
            let Some(registry) = guard.as_mut() else {
                return 0;
            };
            let removed_set = registry.remove_event(event);
            Self::release_if_empty(&mut guard);
            removed_set
        };

        let removed = removed_set.as_ref().map_or(0, ListenerSet::len);
        if removed > 0 {
            debug!(event = %event, removed, "Removed all listeners for event");
        }
        removed
    }

    /// 레지스트리 전체 제거
    pub fn clear(&self) {
        // 리스너 drop은 락 밖에서
        let cleared = self.registry.lock().take();
        if cleared.is_some() {
            debug!("Cleared listener registry");
        }
    }

    fn remove_where<P>(&self, event: &str, matches: P) -> bool
    where
        P: FnMut(&Entry<H, A>) -> bool,
    {
        let mut guard = self.registry.lock();
        let Some(registry) = guard.as_mut() else {
            return false;
        };

        let removed = registry.remove_first(event, matches);
        if let Some(ref entry) = removed {
            debug!(event = %event, entry_id = %entry.id, once = entry.once, "Removed event listener");
        }
        Self::release_if_empty(&mut guard);
        drop(guard);
        removed.is_some()
    }

    /// 마지막 이벤트 이름이 빠졌으면 레지스트리를 버린다
    fn release_if_empty(registry: &mut Option<ListenerRegistry<H, A>>) {
        if registry.as_ref().is_some_and(ListenerRegistry::is_empty) {
            *registry = None;
            debug!("Released empty listener registry");
        }
    }

    // ========================================================================
    // 디스패치
    // ========================================================================

    /// 이벤트 디스패치
    ///
    /// 시작 시점의 리스너 목록 스냅샷을 등록 순으로 호출한다. 호출 중에 추가되거나
    /// 제거된 리스너는 이번 디스패치에 영향을 주지 않는다. `once` 엔트리는 호출
    /// 직전에 레지스트리에서 빠진다.
    ///
    /// 리스너가 `Err`를 반환하면 나머지 리스너는 호출하지 않고 `Error::Listener`를
    /// 반환한다.
    pub fn dispatch(&self, host: &H, event: &str, args: &A) -> Result<bool> {
        let Some(entries) = self.snapshot(event) else {
            return Ok(false);
        };

        self.emit_count.fetch_add(1, Ordering::Relaxed);

        for entry in &entries {
            if entry.once && !self.remove_entry(event, entry.id) {
                // 같은 디스패치 안에서 이미 제거됨. 스냅샷 기준이므로 그래도 호출한다.
                trace!(event = %event, entry_id = %entry.id, "One-shot listener already removed");
            }

            if self.config.trace_dispatch {
                trace!(
                    event = %event,
                    entry_id = %entry.id,
                    listener = ?entry.listener,
                    "Delivering event to listener"
                );
            }

            entry
                .listener
                .call(host, args)
                .map_err(|source| Error::listener(event, source))?;
        }

        Ok(!entries.is_empty())
    }

    fn snapshot(&self, event: &str) -> Option<Vec<Entry<H, A>>> {
        self.registry.lock().as_ref()?.snapshot(event)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 레지스트리가 만들어져 있는지 확인 (리스너가 하나라도 있으면 true)
    pub fn is_allocated(&self) -> bool {
        self.registry.lock().is_some()
    }

    /// 이벤트 이름에 등록된 리스너 수
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .lock()
            .as_ref()
            .map_or(0, |registry| registry.listener_count(event))
    }

    /// 등록된 이벤트 이름 (정렬됨)
    pub fn event_names(&self) -> Vec<String> {
        self.registry
            .lock()
            .as_ref()
            .map(ListenerRegistry::event_names)
            .unwrap_or_default()
    }

    /// 리스너에게 도달한 emit 횟수
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }
}

impl<H, A> Default for ListenerSlot<H, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, A> fmt::Debug for ListenerSlot<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("config", &self.config)
            .field("registry", &*self.registry.lock())
            .field("emit_count", &self.emit_count())
            .finish()
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Weak};
    use std::time::Duration;

    /// 호스트 없이 슬롯만 검증 (호스트 타입은 `()`)
    type Slot = ListenerSlot<(), Vec<u32>>;

    /// 로그 출력을 메모리에 모은다
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .filter(|line| line.contains(needle))
                .count()
        }
    }

    /// 현재 스레드에만 TRACE 레벨 subscriber를 걸고 `f` 실행
    fn capture_logs(f: impl FnOnce()) -> LogBuffer {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        buffer
    }

    /// drop될 때 슬롯을 다시 조회한다
    struct QueryOnDrop {
        slot: Weak<Slot>,
        seen: Arc<Mutex<Option<usize>>>,
    }

    impl Drop for QueryOnDrop {
        fn drop(&mut self) {
            if let Some(slot) = self.slot.upgrade() {
                *self.seen.lock() = Some(slot.listener_count("foo"));
            }
        }
    }

    fn query_on_drop(slot: &Arc<Slot>, seen: &Arc<Mutex<Option<usize>>>) -> Listener<(), Vec<u32>> {
        let on_drop = QueryOnDrop {
            slot: Arc::downgrade(slot),
            seen: seen.clone(),
        };
        Listener::new(move |_, _| {
            let _keep = &on_drop;
            Ok(())
        })
    }

    /// 교착되면 실패하도록 별도 스레드에서 실행
    fn run_with_timeout(f: impl FnOnce() + Send + 'static) {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            f();
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(5))
            .expect("slot deadlocked while dropping a removed listener");
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener<(), Vec<u32>> {
        let log = log.clone();
        Listener::new(move |_, args: &Vec<u32>| {
            log.lock().push(format!("{tag}{args:?}"));
            Ok(())
        })
    }

    #[test]
    fn test_lazy_allocation() {
        let slot = Slot::new();
        assert!(!slot.is_allocated());

        // 리스너 없는 dispatch는 레지스트리를 만들지 않는다
        assert!(!slot.dispatch(&(), "foo", &vec![]).unwrap());
        assert!(!slot.is_allocated());

        slot.add("foo", Listener::noop(), false);
        assert!(slot.is_allocated());
        assert_eq!(slot.listener_count("foo"), 1);
    }

    #[test]
    fn test_remove_releases_registry() {
        let slot = Slot::new();
        let listener = Listener::noop();

        slot.add("foo", listener.clone(), false);
        slot.add("bar", listener.clone(), false);

        assert!(slot.remove("foo", &listener));
        assert_eq!(slot.event_names(), vec!["bar".to_string()]);
        assert!(slot.is_allocated());

        assert!(slot.remove("bar", &listener));
        assert!(!slot.is_allocated());

        // 없는 것 제거는 no-op
        assert!(!slot.remove("bar", &listener));
        assert_eq!(slot.remove_event("bar"), 0);
    }

    #[test]
    fn test_removed_listener_dropped_outside_lock() {
        run_with_timeout(|| {
            let slot = Arc::new(Slot::new());

            // remove_event
            let seen = Arc::new(Mutex::new(None));
            slot.add("foo", query_on_drop(&slot, &seen), false);
            assert_eq!(slot.remove_event("foo"), 1);
            assert_eq!(*seen.lock(), Some(0));

            // remove_entry
            let seen = Arc::new(Mutex::new(None));
            let id = slot.add("foo", query_on_drop(&slot, &seen), false);
            assert!(slot.remove_entry("foo", id));
            assert_eq!(*seen.lock(), Some(0));

            // clear
            let seen = Arc::new(Mutex::new(None));
            slot.add("foo", query_on_drop(&slot, &seen), false);
            slot.clear();
            assert_eq!(*seen.lock(), Some(0));
            assert!(!slot.is_allocated());
        });
    }

    #[test]
    fn test_leak_warning_logged_once_at_threshold() {
        let logs = capture_logs(|| {
            let slot = Slot::with_config(EmitterConfig::default().with_max_listeners(10));
            for _ in 0..12 {
                slot.add("foo", Listener::noop(), false);
            }
            assert_eq!(slot.listener_count("foo"), 12);
        });
        assert_eq!(logs.count("Possible listener leak"), 1);
        assert_eq!(logs.count("WARN"), 1);

        let logs = capture_logs(|| {
            let slot = Slot::with_config(EmitterConfig::unlimited());
            for _ in 0..12 {
                slot.add("foo", Listener::noop(), false);
            }
        });
        assert_eq!(logs.count("Possible listener leak"), 0);
    }

    #[test]
    fn test_trace_dispatch_logs_each_listener() {
        let logs = capture_logs(|| {
            let slot = Slot::with_config(EmitterConfig::default().with_trace_dispatch(true));
            slot.add("foo", Listener::noop(), false);
            slot.add("foo", Listener::noop(), false);
            slot.dispatch(&(), "foo", &vec![]).unwrap();
        });
        assert_eq!(logs.count("Delivering event to listener"), 2);

        let logs = capture_logs(|| {
            let slot = Slot::new();
            slot.add("foo", Listener::noop(), false);
            slot.dispatch(&(), "foo", &vec![]).unwrap();
        });
        assert_eq!(logs.count("Delivering event to listener"), 0);
    }

    #[test]
    fn test_once_removed_earlier_in_dispatch_still_runs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot = Arc::new(Slot::new());

        let logs = capture_logs(|| {
            let slot_clone = slot.clone();
            slot.add(
                "foo",
                Listener::new(move |_, _| {
                    slot_clone.clear();
                    Ok(())
                }),
                false,
            );
            slot.add("foo", recorder(&log, "once"), true);

            assert!(slot.dispatch(&(), "foo", &vec![]).unwrap());
        });

        assert_eq!(*log.lock(), vec!["once[]"]);
        assert!(!slot.is_allocated());
        assert_eq!(logs.count("One-shot listener already removed"), 1);
    }

    #[test]
    fn test_dispatch_order_and_args() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot = Slot::new();

        slot.add("foo", recorder(&log, "a"), false);
        slot.add("foo", recorder(&log, "b"), false);
        slot.add("foo", recorder(&log, "c"), false);

        assert!(slot.dispatch(&(), "foo", &vec![1, 2]).unwrap());
        assert_eq!(*log.lock(), vec!["a[1, 2]", "b[1, 2]", "c[1, 2]"]);
        assert_eq!(slot.emit_count(), 1);
    }

    #[test]
    fn test_once_entry_removed_before_call() {
        let slot = Arc::new(Slot::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let slot_clone = slot.clone();
        let seen_clone = seen.clone();
        slot.add(
            "foo",
            Listener::new(move |_, _| {
                seen_clone.lock().push(slot_clone.listener_count("foo"));
                Ok(())
            }),
            true,
        );

        assert!(slot.dispatch(&(), "foo", &vec![]).unwrap());
        assert!(!slot.dispatch(&(), "foo", &vec![]).unwrap());
        assert_eq!(*seen.lock(), vec![0]);
        assert!(!slot.is_allocated());
    }

    #[test]
    fn test_entry_ids_survive_registry_release() {
        let slot = Slot::new();

        let first = slot.add("foo", Listener::noop(), true);
        slot.clear();
        let second = slot.add("foo", Listener::noop(), false);

        assert_ne!(first, second);
        assert!(!slot.remove_entry("foo", first));
        assert_eq!(slot.listener_count("foo"), 1);
    }

    #[test]
    fn test_listener_error_stops_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot = Slot::new();

        slot.add("foo", recorder(&log, "a"), false);
        slot.add("foo", Listener::new(|_, _| anyhow::bail!("boom")), false);
        slot.add("foo", recorder(&log, "c"), false);

        let err = slot.dispatch(&(), "foo", &vec![]).unwrap_err();
        assert_eq!(err.event(), Some("foo"));
        assert_eq!(*log.lock(), vec!["a[]"]);
        assert_eq!(slot.listener_count("foo"), 3);
    }

    #[test]
    fn test_failing_once_is_still_removed() {
        let slot = Slot::new();
        slot.add("foo", Listener::new(|_, _| anyhow::bail!("boom")), true);

        assert!(slot.dispatch(&(), "foo", &vec![]).is_err());
        assert!(!slot.is_allocated());
    }
}
