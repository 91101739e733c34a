//! ListenerSet - 이벤트 이름 하나에 대한 리스너 목록
//!
//! 리스너가 하나뿐이면 `One`으로, 둘 이상이면 `Many`로 저장한다.
//! 표현 방식과 관계없이 순서(등록 순)와 제거 결과는 같다.

use super::listener::Listener;
use std::fmt;

/// 레지스트리 안에서 등록 한 건을 식별하는 ID
///
/// 같은 리스너를 여러 번 등록해도 등록마다 ID가 다르다.
/// `once` 엔트리는 이 ID로 정확히 자기 자신만 제거한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// 등록된 리스너 한 건
pub(crate) struct Entry<H, A> {
    pub(crate) id: EntryId,
    pub(crate) listener: Listener<H, A>,
    pub(crate) once: bool,
}

impl<H, A> Clone for Entry<H, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: self.listener.clone(),
            once: self.once,
        }
    }
}

impl<H, A> fmt::Debug for Entry<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("listener", &self.listener)
            .field("once", &self.once)
            .finish()
    }
}

/// 제거 결과
pub(crate) enum Removal<H, A> {
    /// 일치하는 엔트리 없음
    Missing,
    /// 제거됨, 남은 엔트리 있음
    Removed(Entry<H, A>),
    /// 마지막 엔트리였음. 호출자가 키를 지워야 한다.
    Emptied(Entry<H, A>),
}

/// 비어 있지 않은 리스너 목록
pub(crate) enum ListenerSet<H, A> {
    One(Entry<H, A>),
    Many(Vec<Entry<H, A>>),
}

impl<H, A> ListenerSet<H, A> {
    pub(crate) fn new(entry: Entry<H, A>) -> Self {
        Self::One(entry)
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(entries) => entries.len(),
        }
    }

    pub(crate) fn entries(&self) -> &[Entry<H, A>] {
        match self {
            Self::One(entry) => std::slice::from_ref(entry),
            Self::Many(entries) => entries,
        }
    }

    /// 끝에 추가 (`One`이면 `Many`로 승격)
    pub(crate) fn push(&mut self, entry: Entry<H, A>) {
        match self {
            Self::Many(entries) => entries.push(entry),
            Self::One(_) => {
                let Self::One(first) = std::mem::replace(self, Self::Many(Vec::new())) else {
                    unreachable!("matched One above");
                };
                *self = Self::Many(vec![first, entry]);
            }
        }
    }

    /// 디스패치용 스냅샷 (등록 순)
    pub(crate) fn snapshot(&self) -> Vec<Entry<H, A>> {
        self.entries().to_vec()
    }

    /// 조건에 맞는 첫 엔트리 하나를 제거
    ///
    /// `Many`에 하나만 남으면 `One`으로 되돌린다.
    pub(crate) fn remove_first<P>(&mut self, mut matches: P) -> Removal<H, A>
    where
        P: FnMut(&Entry<H, A>) -> bool,
    {
        match self {
            Self::One(entry) => {
                if matches(&*entry) {
                    Removal::Emptied(entry.clone())
                } else {
                    Removal::Missing
                }
            }
            Self::Many(entries) => {
                let Some(index) = entries.iter().position(|e| matches(e)) else {
                    return Removal::Missing;
                };
                let removed = entries.remove(index);
                match entries.len() {
                    0 => Removal::Emptied(removed),
                    1 => {
                        if let Some(last) = entries.pop() {
                            *self = Self::One(last);
                        }
                        Removal::Removed(removed)
                    }
                    _ => Removal::Removed(removed),
                }
            }
        }
    }
}

impl<H, A> fmt::Debug for ListenerSet<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(entry) => f.debug_tuple("One").field(entry).finish(),
            Self::Many(entries) => f.debug_tuple("Many").field(entries).finish(),
        }
    }
}
