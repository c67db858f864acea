//! Core types for circuit representation.

use std::fmt;

/// Canonical spelling of the ground node.
pub const GROUND_NAME: &str = "GND";

/// Check whether a raw node token denotes ground (`GND` or SPICE `0`).
pub fn is_ground_name(name: &str) -> bool {
    name == GROUND_NAME || name == "0"
}

/// A unique identifier for a node in the circuit.
/// Node 0 is always ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "{}", GROUND_NAME)
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A unique identifier for a device in the circuit (its registration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Index of an auxiliary branch-current unknown (voltage-defined branches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// A registered node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub index: NodeId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_spellings() {
        assert!(is_ground_name("GND"));
        assert!(is_ground_name("0"));
        assert!(!is_ground_name("gnd1"));
        assert!(NodeId::GROUND.is_ground());
        assert_eq!(NodeId::GROUND.to_string(), "GND");
    }
}
