//! Batch-scoped running maxima of instance counts.

use crate::error::EngineError;
use crate::mapping::MappingId;
use log::trace;
use std::collections::HashMap;

/// The largest number of instances each mapping has produced for a single
/// context node across the batch so far.
///
/// Maxima only grow. After the first pass the table is frozen: from then on
/// it defines the column layout, and any observation that would grow it is
/// an error.
#[derive(Debug, Clone, Default)]
pub struct CardinalityTable {
    maxima: HashMap<MappingId, usize>,
    frozen: bool,
}

impl CardinalityTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// The running maximum for `id`, 0 if never observed.
    pub fn max(&self, id: MappingId) -> usize {
        self.maxima.get(&id).copied().unwrap_or(0)
    }

    /// Records that `id` produced `observed` instances and returns the
    /// maximum as it was before this observation.
    pub fn record(&mut self, id: MappingId, observed: usize) -> Result<usize, EngineError> {
        let previous = self.max(id);
        if observed > previous {
            if self.frozen {
                return Err(EngineError::FrozenCardinality {
                    mapping: id,
                    frozen: previous,
                    observed,
                });
            }
            trace!("Cardinality of mapping {} grows {} -> {}", id, previous, observed);
            self.maxima.insert(id, observed);
        }
        Ok(previous)
    }

    /// `max(running max, minimum)`: the number of columns a lazy mapping
    /// occupies.
    pub fn effective_count(&self, id: MappingId, minimum: usize) -> usize {
        self.max(id).max(minimum)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxima_only_grow() {
        let mut table = CardinalityTable::new();
        let id = MappingId(4);
        assert_eq!(table.record(id, 2).unwrap(), 0);
        assert_eq!(table.record(id, 1).unwrap(), 2);
        assert_eq!(table.record(id, 3).unwrap(), 2);
        assert_eq!(table.max(id), 3);
        assert_eq!(table.max(MappingId(5)), 0);
    }

    #[test]
    fn test_effective_count_respects_minimum() {
        let mut table = CardinalityTable::new();
        table.record(MappingId(0), 2).unwrap();
        assert_eq!(table.effective_count(MappingId(0), 1), 2);
        assert_eq!(table.effective_count(MappingId(0), 4), 4);
        assert_eq!(table.effective_count(MappingId(1), 1), 1);
        assert_eq!(table.effective_count(MappingId(1), 0), 0);
    }

    #[test]
    fn test_frozen_table_rejects_growth() {
        let mut table = CardinalityTable::new();
        table.record(MappingId(0), 2).unwrap();
        table.freeze();
        assert_eq!(table.record(MappingId(0), 2).unwrap(), 2);
        let err = table.record(MappingId(0), 3).unwrap_err();
        assert_eq!(
            err,
            EngineError::FrozenCardinality {
                mapping: MappingId(0),
                frozen: 2,
                observed: 3
            }
        );
        assert_eq!(table.max(MappingId(0)), 2);
    }
}
