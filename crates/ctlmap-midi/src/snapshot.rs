//! Persisting bindings.
//!
//! Only the address and path are stored. Types and scaling are re-derived
//! from the registry on restore, so a snapshot survives port metadata changes.

use crate::table::MidiTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSnapshot {
    pub channel: u8,
    pub controller: u8,
    pub path: String,
}

impl MidiTable {
    /// Live bindings in table order.
    pub fn snapshot(&self) -> Vec<BindingSnapshot> {
        self.iter()
            .map(|b| BindingSnapshot {
                channel: b.channel(),
                controller: b.controller(),
                path: b.path().to_string(),
            })
            .collect()
    }

    /// Replace all bindings with `snapshot`. Returns how many bound successfully.
    ///
    /// Entries that fail (stale paths, full table) are reported through the
    /// error callback and skipped.
    pub fn restore(&mut self, snapshot: &[BindingSnapshot]) -> usize {
        self.clear();
        let restored = snapshot
            .iter()
            .filter(|s| self.bind(s.channel, s.controller, &s.path).is_ok())
            .count();
        tracing::debug!("Restored {}/{} MIDI bindings", restored, snapshot.len());
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctlmap_core::{Message, Port, PortTree, ValueType};
    use std::sync::Arc;

    fn ports() -> Arc<PortTree<()>> {
        let noop = |_: &Message<'_>, _: &mut ()| {};
        Arc::new(
            PortTree::new()
                .with(Port::leaf("a::f", noop))
                .unwrap()
                .with(Port::leaf("b::i", noop))
                .unwrap(),
        )
    }

    #[test]
    fn test_snapshot_restore() {
        let mut table = MidiTable::new(ports());
        table.bind(0, 1, "/a").unwrap();
        table.bind(0, 2, "/b").unwrap();

        let bytes = bincode::serialize(&table.snapshot()).unwrap();
        let snapshot: Vec<BindingSnapshot> = bincode::deserialize(&bytes).unwrap();

        let mut restored = MidiTable::new(ports());
        restored.bind(5, 5, "/a").unwrap();
        assert_eq!(restored.restore(&snapshot), 2);

        assert!(!restored.is_bound(5, 5));
        assert_eq!(restored.lookup(0, 2).unwrap().value_type(), ValueType::Int);
        assert_eq!(restored.snapshot(), table.snapshot());
    }

    #[test]
    fn test_restore_skips_stale_paths() {
        let mut table = MidiTable::new(ports());
        let snapshot = vec![
            BindingSnapshot {
                channel: 0,
                controller: 1,
                path: "/a".into(),
            },
            BindingSnapshot {
                channel: 0,
                controller: 2,
                path: "/gone".into(),
            },
        ];
        assert_eq!(table.restore(&snapshot), 1);
        assert_eq!(table.len(), 1);
    }
}
