use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use super::RuleId;
use super::error::RuntimeError;

/// A cached rule outcome: the result (`None` for FAIL) and the mark after the match.
#[derive(Clone)]
pub struct MemoEntry {
    pub value: Option<Rc<dyn Any>>,
    pub end: usize,
}

/// Typed view of a memo lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Memoized<T> {
    Miss,
    Hit { value: Option<T>, end: usize },
}

/// The packrat table, keyed by `(rule_id, token_index)`.
///
/// Lives for exactly one parse. Entries are never evicted.
#[derive(Default)]
pub struct MemoTable {
    entries: HashMap<(RuleId, usize), MemoEntry>,
    hits: usize,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `(rule, mark)` and downcast the cached value.
    ///
    /// A stored value of another type means two rules share an id; that is reported as an
    /// internal invariant violation rather than silently treated as a miss.
    pub fn lookup<T: Clone + 'static>(&mut self, rule: RuleId, mark: usize) -> Result<Memoized<T>, RuntimeError> {
        let Some(entry) = self.entries.get(&(rule, mark)) else {
            return Ok(Memoized::Miss);
        };
        self.hits += 1;
        let value = match &entry.value {
            None => None,
            Some(any) => match any.downcast_ref::<T>() {
                Some(v) => Some(v.clone()),
                None => {
                    return Err(RuntimeError::internal(format!(
                        "memo entry for rule {rule} at {mark} holds a value of another type"
                    )));
                }
            },
        };
        Ok(Memoized::Hit { value, end: entry.end })
    }

    pub fn store<T: Clone + 'static>(&mut self, rule: RuleId, mark: usize, value: Option<T>, end: usize) {
        let value = value.map(|v| Rc::new(v) as Rc<dyn Any>);
        self.entries.insert((rule, mark), MemoEntry { value, end });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful lookups since creation.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl std::fmt::Debug for MemoTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoTable")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ErrorKind;

    #[test]
    fn test_miss_then_hit() {
        let mut memo = MemoTable::new();
        assert_eq!(memo.lookup::<u32>(1000, 0).unwrap(), Memoized::Miss);
        memo.store(1000, 0, Some(7u32), 3);
        assert_eq!(
            memo.lookup::<u32>(1000, 0).unwrap(),
            Memoized::Hit { value: Some(7), end: 3 }
        );
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn test_failure_is_cached() {
        let mut memo = MemoTable::new();
        memo.store::<String>(1001, 4, None, 4);
        assert_eq!(
            memo.lookup::<String>(1001, 4).unwrap(),
            Memoized::Hit { value: None, end: 4 }
        );
    }

    #[test]
    fn test_type_confusion_is_internal_error() {
        let mut memo = MemoTable::new();
        memo.store(1000, 0, Some(1u8), 1);
        let err = memo.lookup::<String>(1000, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalInvariant);
    }
}
