//! Ownership of launched processes

use std::collections::BTreeSet;

/// Pids of the processes this run started itself.
///
/// A pid in the ledger owns its descendant tree, so shutdown may terminate the
/// whole tree. Any other process is only ever killed on its own.
#[derive(Debug, Default, Clone)]
pub struct LaunchLedger {
    owned: BTreeSet<u32>,
}

impl LaunchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pid: u32) {
        self.owned.insert(pid);
    }

    pub fn owns(&self, pid: u32) -> bool {
        self.owned.contains(&pid)
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}
