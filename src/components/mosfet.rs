//! MOSFET small-signal model.
//!
//! The transistor is linearized around the current node-voltage estimate
//! into a drain-source conductance `gds` and a transconductance `gm` coupled
//! from the gate. Region selection and the conductance formulas follow a
//! simple square-law picture:
//!
//! | Region     | gm                        | gds             |
//! |------------|---------------------------|-----------------|
//! | Off        | 0                         | 0               |
//! | Saturation | MU·COX·(W/L)·\|VGS−VT\|   | LAMBDA·gm·\|VDS\| |
//! | Triode     | MU·COX·(W/L)·\|VDS\|      | gm/\|VGS−VT\|   |
//!
//! For PMOS devices VGS and VDS are measured source-referred
//! (`V(s)−V(g)`, `V(s)−V(d)`) and every threshold comparison is reversed.

use std::fmt;

use crate::circuit::{DeviceId, NodeId};
use crate::error::{DcError, Result};

/// Channel polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Nmos,
    Pmos,
}

impl Polarity {
    /// Parse a `.MODEL` type keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NMOS" => Some(Polarity::Nmos),
            "PMOS" => Some(Polarity::Pmos),
            _ => None,
        }
    }

    /// Sign applied to the gate coupling in the matrix stamp.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Nmos => 1.0,
            Polarity::Pmos => -1.0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Nmos => write!(f, "NMOS"),
            Polarity::Pmos => write!(f, "PMOS"),
        }
    }
}

/// Parameters of a `.MODEL` card. Every parameter defaults to exactly 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct MosfetModel {
    pub name: String,
    pub polarity: Polarity,
    /// Threshold voltage (V)
    pub vt: f64,
    /// Carrier mobility
    pub mu: f64,
    /// Gate oxide capacitance per unit area
    pub cox: f64,
    /// Channel-length modulation (1/V)
    pub lambda: f64,
    /// Zero-bias junction capacitance; recorded, unused at DC
    pub cj0: f64,
}

impl MosfetModel {
    /// Recognized parameter keys.
    pub const PARAM_KEYS: [&'static str; 5] = ["VT", "MU", "COX", "LAMBDA", "CJ0"];

    /// Create a model with all parameters zero.
    pub fn new(name: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            name: name.into(),
            polarity,
            vt: 0.0,
            mu: 0.0,
            cox: 0.0,
            lambda: 0.0,
            cj0: 0.0,
        }
    }

    /// Set a parameter by key (case-insensitive). Returns false for an
    /// unrecognized key.
    pub fn set_param(&mut self, key: &str, value: f64) -> bool {
        let slot = match key.to_ascii_uppercase().as_str() {
            "VT" => &mut self.vt,
            "MU" => &mut self.mu,
            "COX" => &mut self.cox,
            "LAMBDA" => &mut self.lambda,
            "CJ0" => &mut self.cj0,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Builder form of [`set_param`](Self::set_param) for known keys.
    pub fn with_param(mut self, key: &str, value: f64) -> Self {
        self.set_param(key, value);
        self
    }
}

/// Operating region of a MOSFET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Off,
    Saturation,
    Triode,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Off => write!(f, "OFF"),
            Region::Saturation => write!(f, "saturation"),
            Region::Triode => write!(f, "triode"),
        }
    }
}

/// Linearized MOSFET at one bias point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmallSignal {
    pub polarity: Polarity,
    pub region: Region,
    /// Polarity-adjusted gate-source voltage
    pub vgs: f64,
    /// Polarity-adjusted drain-source voltage
    pub vds: f64,
    pub gm: f64,
    pub gds: f64,
}

impl SmallSignal {
    /// A device contributing nothing to the matrix.
    pub fn off(polarity: Polarity) -> Self {
        Self {
            polarity,
            region: Region::Off,
            vgs: 0.0,
            vds: 0.0,
            gm: 0.0,
            gds: 0.0,
        }
    }

    /// Transconductance as it enters the matrix (negated for PMOS).
    pub fn stamp_gm(&self) -> f64 {
        self.polarity.sign() * self.gm
    }

    /// Current into the drain terminal implied by the stamp at the given
    /// node voltages. The source terminal carries the negation.
    pub fn drain_current(&self, v_d: f64, v_g: f64, v_s: f64) -> f64 {
        self.gds * (v_d - v_s) + self.stamp_gm() * v_g
    }
}

/// A MOSFET instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Mosfet {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 3], // [drain, gate, source]
    /// Model ID this device references
    pub model: String,
    pub width: f64,
    pub length: f64,
    pub polarity: Polarity,
}

impl Mosfet {
    /// Create a new MOSFET. Width and length must be positive.
    pub fn new(
        id: DeviceId,
        name: String,
        nodes: [NodeId; 3],
        model: String,
        width: f64,
        length: f64,
        polarity: Polarity,
    ) -> Result<Self> {
        for (param, value) in [("width", width), ("length", length)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(DcError::invalid_parameter(
                    &name,
                    param,
                    format!("must be positive, got {}", value),
                ));
            }
        }
        Ok(Self {
            id,
            name,
            nodes,
            model,
            width,
            length,
            polarity,
        })
    }

    /// Get the drain node.
    pub fn drain(&self) -> NodeId {
        self.nodes[0]
    }

    /// Get the gate node.
    pub fn gate(&self) -> NodeId {
        self.nodes[1]
    }

    /// Get the source node.
    pub fn source(&self) -> NodeId {
        self.nodes[2]
    }

    /// W/L.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.length
    }

    /// Linearize the device at the given terminal voltages.
    pub fn evaluate(&self, model: &MosfetModel, v_d: f64, v_g: f64, v_s: f64) -> SmallSignal {
        let (vgs, vds) = match self.polarity {
            Polarity::Nmos => (v_g - v_s, v_d - v_s),
            Polarity::Pmos => (v_s - v_g, v_s - v_d),
        };
        let vt = model.vt;

        let on = match self.polarity {
            Polarity::Nmos => vgs > vt,
            Polarity::Pmos => vgs < vt,
        };
        if !on {
            return SmallSignal {
                vgs,
                vds,
                ..SmallSignal::off(self.polarity)
            };
        }

        let overdrive = vgs - vt;
        let saturated = match self.polarity {
            Polarity::Nmos => vds > overdrive,
            Polarity::Pmos => vds < overdrive,
        };
        let beta = model.mu * model.cox * self.aspect_ratio();

        let (region, gm, gds) = if saturated {
            let gm = beta * overdrive.abs();
            (Region::Saturation, gm, model.lambda * gm * vds.abs())
        } else {
            let gm = beta * vds.abs();
            (Region::Triode, gm, gm / overdrive.abs())
        };

        SmallSignal {
            polarity: self.polarity,
            region,
            vgs,
            vds,
            gm,
            gds,
        }
    }
}
