use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::variable_scope::ScopeMap;

/// Point-in-time copy of the variable scope. Restoring one replaces variable
/// state only; the executor's position is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub snapshot_id: String,
    pub node_id: Option<String>,
    pub variables: ScopeMap,
    pub execution_path: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// In-memory snapshot table with optional oldest-first eviction.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<String, ExecutionSnapshot>,
    order: VecDeque<String>,
    max_snapshots: usize,
}

impl SnapshotStore {
    /// `max_snapshots == 0` keeps every snapshot.
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: HashMap::new(),
            order: VecDeque::new(),
            max_snapshots,
        }
    }

    /// Store a snapshot, returning the ids evicted to make room.
    pub fn insert(&mut self, snapshot: ExecutionSnapshot) -> Vec<String> {
        let id = snapshot.snapshot_id.clone();
        if self.snapshots.insert(id.clone(), snapshot).is_some() {
            self.order.retain(|existing| existing != &id);
        }
        self.order.push_back(id);

        let mut evicted = Vec::new();
        while self.max_snapshots > 0 && self.order.len() > self.max_snapshots {
            if let Some(oldest) = self.order.pop_front() {
                self.snapshots.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn get(&self, snapshot_id: &str) -> Option<&ExecutionSnapshot> {
        self.snapshots.get(snapshot_id)
    }

    pub fn contains(&self, snapshot_id: &str) -> bool {
        self.snapshots.contains_key(snapshot_id)
    }

    pub fn remove(&mut self, snapshot_id: &str) -> bool {
        if self.snapshots.remove(snapshot_id).is_none() {
            return false;
        }
        self.order.retain(|existing| existing != snapshot_id);
        true
    }

    /// Creation order, oldest first.
    pub fn list(&self) -> Vec<ExecutionSnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.snapshots.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
