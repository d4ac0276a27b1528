use std::sync::Arc;

use arc_swap::ArcSwap;

use super::table::ResolutionTable;

/// Owner of the currently published [`ResolutionTable`].
///
/// Readers take a snapshot and keep using it for the whole request; a
/// reload builds the new table first and then swaps the pointer, so no
/// reader ever sees a partially built table.
#[derive(Debug)]
pub struct ActiveTable {
    current: ArcSwap<ResolutionTable>,
}

impl ActiveTable {
    pub fn new(table: ResolutionTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    /// Snapshot of the active table.
    pub fn snapshot(&self) -> Arc<ResolutionTable> {
        self.current.load_full()
    }

    /// Publish a new table, returning the one it replaced.
    pub fn replace(&self, table: ResolutionTable) -> Arc<ResolutionTable> {
        self.current.swap(Arc::new(table))
    }
}

impl Default for ActiveTable {
    fn default() -> Self {
        Self::new(ResolutionTable::empty())
    }
}
