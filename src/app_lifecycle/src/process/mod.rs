//! Process management utilities

pub mod ledger;
pub mod system;
pub mod table;
pub mod tree;

// Re-export commonly used items
pub use ledger::LaunchLedger;
pub use system::SystemProcessTable;
pub use table::{process_name_matches, wait_for_exit, KillError, LiveProcess, ProcessTable};
