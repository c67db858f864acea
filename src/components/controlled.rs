//! Linear controlled sources (SPICE E, G, F, H elements).
//!
//! Voltage-controlled sources sense the difference between two control
//! nodes. Current-controlled sources sense the branch current of a named
//! independent voltage source, using the SPICE sign convention: positive
//! current flows into the controller's positive terminal.

use crate::circuit::{BranchId, DeviceId, NodeId};

/// Voltage-controlled voltage source: V(n+) - V(n-) = gain * (V(nc+) - V(nc-)).
#[derive(Debug, Clone, PartialEq)]
pub struct Vcvs {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub control: [NodeId; 2],
    pub gain: f64,
    pub branch: BranchId,
}

/// Voltage-controlled current source: I = gm * (V(nc+) - V(nc-)), flowing
/// from n+ through the source to n-.
#[derive(Debug, Clone, PartialEq)]
pub struct Vccs {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub control: [NodeId; 2],
    pub transconductance: f64,
}

impl Vccs {
    /// Output current for the given control voltages.
    pub fn current(&self, vc_pos: f64, vc_neg: f64) -> f64 {
        self.transconductance * (vc_pos - vc_neg)
    }
}

/// Current-controlled current source: I = gain * I(controller).
#[derive(Debug, Clone, PartialEq)]
pub struct Cccs {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    /// Name of the controlling voltage source
    pub controller: String,
    /// Branch of the controlling voltage source
    pub control_branch: BranchId,
    pub gain: f64,
}

/// Current-controlled voltage source: V(n+) - V(n-) = r * I(controller).
#[derive(Debug, Clone, PartialEq)]
pub struct Ccvs {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub controller: String,
    pub control_branch: BranchId,
    pub transresistance: f64,
    pub branch: BranchId,
}
