//! Per-row matching against the lookup index.
//!
//! A row is normalized once per binding, then the bindings are probed in
//! column order. The first hit decides the group (first-match-wins). Every
//! present value of the row is then recorded under that group, so a later
//! row matching on any one of them lands in the same group.
//!
//! Chains are not closed transitively. When two bindings of one row hit
//! different groups, the first one wins and the other value is re-pointed
//! at the winner; records already emitted keep their identifiers.

use super::index::{GroupId, GroupIdAllocator, LookupIndex};
use super::locator::ColumnBinding;
use super::normalize::normalize;

/// Result of matching one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Group the row belongs to.
    pub group_id: GroupId,
    /// Whether the group existed before this row.
    pub is_duplicate: bool,
}

/// Stateless matcher over a fixed set of column bindings.
#[derive(Debug, Clone)]
pub struct RowMatcher {
    bindings: Vec<ColumnBinding>,
}

impl RowMatcher {
    /// Create a matcher for the given bindings (in header order).
    #[must_use]
    pub fn new(bindings: Vec<ColumnBinding>) -> Self {
        Self { bindings }
    }

    /// Normalize the bound cells of a row.
    ///
    /// Cells past the end of the row are treated as missing.
    #[must_use]
    pub fn normalize_row<S: AsRef<str>>(&self, row: &[S]) -> Vec<Option<String>> {
        self.bindings
            .iter()
            .map(|b| {
                let cell = row.get(b.position).map(|c| c.as_ref());
                normalize(cell, &b.field_type)
            })
            .collect()
    }

    /// First group hit by the normalized values, probing in column order.
    #[must_use]
    pub fn find_group(&self, normalized: &[Option<String>], index: &LookupIndex) -> Option<GroupId> {
        self.bindings
            .iter()
            .zip(normalized)
            .filter_map(|(b, value)| value.as_deref().map(|v| (b, v)))
            .find_map(|(b, value)| index.lookup(&b.field_type, value))
    }

    /// Record every present normalized value under `group_id`.
    pub fn record(&self, normalized: &[Option<String>], index: &mut LookupIndex, group_id: GroupId) {
        for (binding, value) in self.bindings.iter().zip(normalized) {
            if let Some(value) = value {
                index.record(&binding.field_type, value, group_id);
            }
        }
    }
}

/// Mutable state of one run: the lookup index and the identifier allocator.
///
/// Constructed fresh for every run and dropped with it.
#[derive(Debug)]
pub struct MatchEngine {
    matcher: RowMatcher,
    index: LookupIndex,
    allocator: GroupIdAllocator,
}

impl MatchEngine {
    /// Start a run over the given bindings.
    #[must_use]
    pub fn new(bindings: Vec<ColumnBinding>) -> Self {
        Self {
            matcher: RowMatcher::new(bindings),
            index: LookupIndex::new(),
            allocator: GroupIdAllocator::new(),
        }
    }

    /// Classify a row as new or duplicate and record its values.
    pub fn classify<S: AsRef<str>>(&mut self, row: &[S]) -> MatchOutcome {
        let normalized = self.matcher.normalize_row(row);

        let outcome = match self.matcher.find_group(&normalized, &self.index) {
            Some(group_id) => MatchOutcome {
                group_id,
                is_duplicate: true,
            },
            None => MatchOutcome {
                group_id: self.allocator.allocate(),
                is_duplicate: false,
            },
        };

        self.matcher
            .record(&normalized, &mut self.index, outcome.group_id);

        log::trace!(
            "Row -> group {} ({})",
            outcome.group_id,
            if outcome.is_duplicate { "duplicate" } else { "new" }
        );

        outcome
    }

    /// Read access to the lookup index.
    #[must_use]
    pub fn index(&self) -> &LookupIndex {
        &self.index
    }

    /// Number of groups allocated so far.
    #[must_use]
    pub fn groups_allocated(&self) -> u64 {
        self.allocator.allocated()
    }
}
