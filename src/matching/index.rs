//! Lookup index and group identifier allocation.
//!
//! The index is the only mutable state of a run: one map per match type from
//! normalized value to the group that value was last recorded under. Entries
//! are added or overwritten, never removed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use super::normalize::MatchFieldType;

/// Identifier shared by every record of one group.
///
/// Assigned in first-seen order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(u64);

impl GroupId {
    /// Numeric value of the identifier.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of fresh group identifiers.
///
/// Single-threaded by construction: it is owned by the run state and only
/// reachable through `&mut`.
#[derive(Debug)]
pub struct GroupIdAllocator {
    start: u64,
    next: u64,
}

impl GroupIdAllocator {
    /// First identifier handed out.
    pub const FIRST: u64 = 1;

    /// Create an allocator starting at [`GroupIdAllocator::FIRST`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Self::FIRST,
            next: Self::FIRST,
        }
    }

    /// Hand out the next identifier.
    pub fn allocate(&mut self) -> GroupId {
        let id = GroupId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next - self.start
    }
}

impl Default for GroupIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized value → group identifier, one sub-map per match type.
#[derive(Debug, Default)]
pub struct LookupIndex {
    maps: HashMap<MatchFieldType, HashMap<String, GroupId>>,
}

impl LookupIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group recorded for `value` under `field_type`, if any.
    #[must_use]
    pub fn lookup(&self, field_type: &MatchFieldType, value: &str) -> Option<GroupId> {
        self.maps.get(field_type)?.get(value).copied()
    }

    /// Record `value` under `field_type` as belonging to `group`.
    ///
    /// Overwrites any earlier group for the same key.
    pub fn record(&mut self, field_type: &MatchFieldType, value: &str, group: GroupId) {
        if let Some(map) = self.maps.get_mut(field_type) {
            if let Some(existing) = map.get_mut(value) {
                *existing = group;
            } else {
                map.insert(value.to_owned(), group);
            }
            return;
        }
        self.maps
            .entry(field_type.clone())
            .or_default()
            .insert(value.to_owned(), group);
    }

    /// Total number of keys across all match types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct values recorded per match type, keyed by token.
    #[must_use]
    pub fn entries_per_type(&self) -> BTreeMap<String, usize> {
        self.maps
            .iter()
            .map(|(field_type, map)| (field_type.token().to_string(), map.len()))
            .collect()
    }
}
