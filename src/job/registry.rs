//! Bookkeeping of the queries alive on a job

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::query::QueryState;

/// What the job knows about one of its queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
    pub sql: String,
    pub state: QueryState,
    pub correlation_id: Option<String>,
}

/// Registry of the queries created through a job.
///
/// A query registers itself on creation and is forgotten when dropped. Query
/// behavior never depends on the registry, it only serves callers that want
/// to inspect or clean up what is still open on the job.
#[derive(Debug)]
pub struct QueryRegistry {
    enabled: bool,
    next_handle: AtomicU64,
    entries: DashMap<u64, QueryEntry>,
}

impl QueryRegistry {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_handle: AtomicU64::new(1),
            entries: DashMap::new(),
        }
    }

    /// Hand out a handle for a new query. Handles are unique even when
    /// tracking is disabled.
    pub(crate) fn register(&self, sql: &str) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.entries.insert(
                handle,
                QueryEntry {
                    sql: sql.to_string(),
                    state: QueryState::NotYetRun,
                    correlation_id: None,
                },
            );
        }
        handle
    }

    pub(crate) fn update(&self, handle: u64, state: QueryState, correlation_id: Option<&str>) {
        if let Some(mut entry) = self.entries.get_mut(&handle) {
            entry.state = state;
            entry.correlation_id = correlation_id.map(str::to_string);
        }
    }

    pub fn forget(&self, handle: u64) -> Option<QueryEntry> {
        self.entries.remove(&handle).map(|(_, entry)| entry)
    }

    pub fn get(&self, handle: u64) -> Option<QueryEntry> {
        self.entries.get(&handle).map(|entry| entry.value().clone())
    }

    /// Handles of the queries currently in `state`, sorted.
    pub fn handles_in_state(&self, state: QueryState) -> Vec<u64> {
        let mut handles = self
            .entries
            .iter()
            .filter(|entry| entry.value().state == state)
            .map(|entry| *entry.key())
            .collect::<Vec<_>>();
        handles.sort_unstable();
        handles
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_flow() {
        let registry = QueryRegistry::new(true);
        let h1 = registry.register("select 1 from sysibm.sysdummy1");
        let h2 = registry.register("select 2 from sysibm.sysdummy1");
        assert_ne!(h1, h2);
        assert_eq!(2, registry.len());

        registry.update(h1, QueryState::RunMoreDataAvail, Some("query1"));
        let entry = registry.get(h1).unwrap();
        assert_eq!(QueryState::RunMoreDataAvail, entry.state);
        assert_eq!(Some("query1".to_string()), entry.correlation_id);
        assert_eq!(vec![h1], registry.handles_in_state(QueryState::RunMoreDataAvail));
        assert_eq!(vec![h2], registry.handles_in_state(QueryState::NotYetRun));

        assert!(registry.forget(h2).is_some());
        assert!(registry.get(h2).is_none());
        assert_eq!(1, registry.len());
    }

    #[test]
    fn test_disabled() {
        let registry = QueryRegistry::new(false);
        let h1 = registry.register("values 1");
        let h2 = registry.register("values 2");
        assert_ne!(h1, h2);
        registry.update(h1, QueryState::RunDone, None);
        assert!(registry.is_empty());
        assert!(registry.get(h1).is_none());
    }
}
