//! Listener - 콜백 핸들
//!
//! 리스너의 동일성은 `Arc` 포인터 동일성이다. 같은 핸들의 clone끼리는 같고,
//! 서로 다른 클로저로 만든 핸들은 내용이 같아도 다르다.

use std::fmt;
use std::sync::Arc;

/// 리스너 함수 타입: `(호스트, 인자) -> anyhow::Result<()>`
pub type ListenerFn<H, A> = dyn Fn(&H, &A) -> anyhow::Result<()> + Send + Sync;

/// 이벤트 리스너 핸들
///
/// `on`/`once`에 넘긴 핸들의 clone을 보관해 두면 나중에 `off`로 제거할 수 있다.
///
/// ```ignore
/// let log = Listener::new(|_host: &EventLite<String>, msg: &String| {
///     println!("{msg}");
///     Ok(())
/// });
///
/// emitter.on("log", log.clone());
/// emitter.off("log", &log);
/// ```
pub struct Listener<H, A> {
    func: Arc<ListenerFn<H, A>>,
}

impl<H, A> Listener<H, A> {
    /// 클로저로 새 리스너 생성
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&H, &A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// 리스너 호출
    pub fn call(&self, host: &H, args: &A) -> anyhow::Result<()> {
        (self.func)(host, args)
    }

    /// 같은 핸들(또는 그 clone)인지 확인
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<H: 'static, A: 'static> Listener<H, A> {
    /// 아무 것도 하지 않는 리스너
    ///
    /// 본문 없이 이벤트 이름만 등록해 두는 용도.
    pub fn noop() -> Self {
        Self::new(|_, _| Ok(()))
    }
}

impl<H, A> Clone for Listener<H, A> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

impl<H, A> PartialEq for Listener<H, A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<H, A> Eq for Listener<H, A> {}

impl<H, A> fmt::Debug for Listener<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.func) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_identity() {
        let a: Listener<(), u32> = Listener::new(|_, _| Ok(()));
        let b: Listener<(), u32> = Listener::new(|_, _| Ok(()));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(Listener::<(), u32>::noop(), Listener::noop());
    }

    #[test]
    fn test_call_forwards_args() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let listener: Listener<(), usize> = Listener::new(move |_, n| {
            seen_clone.fetch_add(*n, Ordering::SeqCst);
            Ok(())
        });

        listener.call(&(), &3).unwrap();
        listener.clone().call(&(), &4).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_call_returns_error() {
        let listener: Listener<(), ()> = Listener::new(|_, _| anyhow::bail!("nope"));
        let err = listener.call(&(), &()).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
