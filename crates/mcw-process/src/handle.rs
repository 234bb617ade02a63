//! Identity of a launched child process.

use std::fmt;

/// Identifies a running child and, where supported, its process group.
///
/// On group-capable platforms the group id equals the child's own pid at
/// creation, so the child and every descendant it spawns can be signalled
/// as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildHandle {
    pid: u32,
    process_group: Option<i32>,
}

impl ChildHandle {
    /// A child that leads its own process group (pgid == pid).
    pub fn grouped(pid: u32) -> Self {
        Self {
            pid,
            process_group: Some(pid as i32),
        }
    }

    /// A child tracked individually, without a process group.
    pub fn single(pid: u32) -> Self {
        Self {
            pid,
            process_group: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn process_group(&self) -> Option<i32> {
        self.process_group
    }

    /// True when signals reach the whole group rather than a single process.
    pub fn is_group_leader(&self) -> bool {
        self.process_group == Some(self.pid as i32)
    }
}

impl fmt::Display for ChildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process_group {
            Some(pgid) => write!(f, "pid {} (pgid {})", self.pid, pgid),
            None => write!(f, "pid {}", self.pid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_handle_leads_its_group() {
        let handle = ChildHandle::grouped(4242);
        assert_eq!(handle.pid(), 4242);
        assert_eq!(handle.process_group(), Some(4242));
        assert!(handle.is_group_leader());
        assert_eq!(handle.to_string(), "pid 4242 (pgid 4242)");
    }

    #[test]
    fn test_single_handle_has_no_group() {
        let handle = ChildHandle::single(7);
        assert_eq!(handle.process_group(), None);
        assert!(!handle.is_group_leader());
        assert_eq!(handle.to_string(), "pid 7");
    }
}
