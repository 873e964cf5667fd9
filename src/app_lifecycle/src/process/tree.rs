//! Process tree traversal utilities

use std::collections::HashMap;
use sysinfo::System;

/// Recursively find all descendant PIDs of a given parent PID
///
/// Children are listed before their own descendants, so iterating the result
/// in reverse visits leaves first.
pub fn find_all_descendants(sys: &System, parent_pid: u32) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, process) in sys.processes() {
        if let Some(parent) = process.parent() {
            children
                .entry(parent.as_u32())
                .or_default()
                .push(pid.as_u32());
        }
    }
    collect_descendants(&children, parent_pid)
}

fn collect_descendants(children: &HashMap<u32, Vec<u32>>, parent_pid: u32) -> Vec<u32> {
    let mut result = Vec::new();
    let mut stack = vec![parent_pid];
    while let Some(pid) = stack.pop() {
        let Some(direct) = children.get(&pid) else {
            continue;
        };
        for &child in direct {
            // A pid can show up as its own ancestor when the table is read
            // mid-reuse; never walk into a cycle.
            if child == parent_pid || result.contains(&child) {
                continue;
            }
            result.push(child);
            stack.push(child);
        }
    }
    result
}
