//! MNA matrix storage, stamps and the linear solve.

use nalgebra::{DMatrix, DVector};

use crate::circuit::NodeId;
use crate::error::{DcError, Result};

/// How an independent current source enters the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentStampPolarity {
    /// Add the value to the rows of both terminals.
    #[default]
    Additive,
    /// Current flows out of the first terminal and into the second:
    /// `rhs[n1] -= i`, `rhs[n2] += i`.
    Conventional,
}

/// MNA system Ax = z.
///
/// Rows and columns `0..num_nodes` are node voltages with ground at 0;
/// the remaining rows are auxiliary branch currents. Ground is stamped like
/// any other node and removed afterward by [`pin_ground`](Self::pin_ground).
#[derive(Debug, Clone)]
pub struct MnaMatrix {
    /// System matrix A
    a: DMatrix<f64>,
    /// Source vector z
    z: DVector<f64>,
    /// Number of node rows (ground included)
    num_nodes: usize,
}

impl MnaMatrix {
    /// Create a zeroed system for `num_nodes` nodes and `num_branches`
    /// auxiliary currents.
    pub fn new(num_nodes: usize, num_branches: usize) -> Self {
        let size = num_nodes + num_branches;
        Self {
            a: DMatrix::zeros(size, size),
            z: DVector::zeros(size),
            num_nodes,
        }
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.z.len()
    }

    /// Number of node rows, ground included.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Row of an auxiliary branch current.
    pub fn branch_row(&self, branch: usize) -> usize {
        self.num_nodes + branch
    }

    /// Get a reference to the coefficient matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Get a reference to the source vector.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.z
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[(row, col)]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a[(row, col)] = value;
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[(row, col)] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: NodeId, n2: NodeId, g: f64) {
        let (i, j) = (n1.0, n2.0);
        self.add(i, i, g);
        self.add(j, j, g);
        self.add(i, j, -g);
        self.add(j, i, -g);
    }

    /// Stamp a voltage source between two nodes with branch current at row `br`.
    /// V[n+] - V[n-] = E
    ///
    /// Coupling entries are assigned, not accumulated.
    pub fn stamp_voltage_source(&mut self, n_pos: NodeId, n_neg: NodeId, br: usize, voltage: f64) {
        self.set(n_pos.0, br, 1.0);
        self.set(br, n_pos.0, 1.0);
        self.set(n_neg.0, br, -1.0);
        self.set(br, n_neg.0, -1.0);
        self.z[br] = voltage;
    }

    /// Stamp an independent current source.
    pub fn stamp_current_source(
        &mut self,
        n1: NodeId,
        n2: NodeId,
        current: f64,
        polarity: CurrentStampPolarity,
    ) {
        match polarity {
            CurrentStampPolarity::Additive => {
                self.add_source(n1.0, current);
                self.add_source(n2.0, current);
            }
            CurrentStampPolarity::Conventional => {
                self.add_source(n1.0, -current);
                self.add_source(n2.0, current);
            }
        }
    }

    /// Stamp a VCVS (Voltage-Controlled Voltage Source).
    /// V[out+] - V[out-] = A * (V[ctrl+] - V[ctrl-])
    pub fn stamp_vcvs(
        &mut self,
        out: [NodeId; 2],
        ctrl: [NodeId; 2],
        br: usize,
        gain: f64,
    ) {
        self.stamp_voltage_source(out[0], out[1], br, 0.0);
        self.add(br, ctrl[0].0, -gain);
        self.add(br, ctrl[1].0, gain);
    }

    /// Stamp a VCCS (Voltage-Controlled Current Source).
    /// I = gm * (V[ctrl+] - V[ctrl-]), flowing from out+ to out- through the source.
    pub fn stamp_vccs(&mut self, out: [NodeId; 2], ctrl: [NodeId; 2], gm: f64) {
        let (i, j) = (out[0].0, out[1].0);
        let (k, l) = (ctrl[0].0, ctrl[1].0);
        self.add(i, k, gm);
        self.add(i, l, -gm);
        self.add(j, k, -gm);
        self.add(j, l, gm);
    }

    /// Stamp a CCCS sensing the auxiliary current at row `ctrl_br`.
    pub fn stamp_cccs(&mut self, out: [NodeId; 2], ctrl_br: usize, gain: f64) {
        self.add(out[0].0, ctrl_br, gain);
        self.add(out[1].0, ctrl_br, -gain);
    }

    /// Stamp a CCVS sensing the auxiliary current at row `ctrl_br`.
    /// V[out+] - V[out-] = R * I[ctrl]
    pub fn stamp_ccvs(&mut self, out: [NodeId; 2], ctrl_br: usize, br: usize, transresistance: f64) {
        self.stamp_voltage_source(out[0], out[1], br, 0.0);
        self.add(br, ctrl_br, -transresistance);
    }

    /// Stamp a transconductance from `gate` into the drain/source pair:
    /// A[d,g] += gm, A[s,g] -= gm.
    pub fn stamp_transconductance(&mut self, drain: NodeId, source: NodeId, gate: NodeId, gm: f64) {
        self.add(drain.0, gate.0, gm);
        self.add(source.0, gate.0, -gm);
    }

    /// Replace the ground row and column with the identity equation
    /// `V(ground) = 0`.
    pub fn pin_ground(&mut self) {
        if self.size() == 0 {
            return;
        }
        self.a.row_mut(0).fill(0.0);
        self.a.column_mut(0).fill(0.0);
        self.a[(0, 0)] = 1.0;
        self.z[0] = 0.0;
    }

    /// Infinity norm of A (maximum absolute row sum).
    pub fn norm_inf(&self) -> f64 {
        row_norms(&self.a).into_iter().fold(0.0, f64::max)
    }

    /// Solve the system by LU factorization with partial pivoting.
    ///
    /// Each row of A and z is first divided by its own absolute row sum, so
    /// node equations carrying conductances many decades apart are judged on
    /// the same scale. A pivot with `|U[i,i]| <= pivot_tolerance * ||A'||inf`
    /// on the scaled matrix `A'` is treated as zero and reported as
    /// [`DcError::SingularMatrix`].
    pub fn solve(&self, pivot_tolerance: f64) -> Result<DVector<f64>> {
        let mut a = self.a.clone();
        let mut z = self.z.clone();
        for (i, norm) in row_norms(&self.a).into_iter().enumerate() {
            if norm > 0.0 {
                for v in a.row_mut(i).iter_mut() {
                    *v /= norm;
                }
                z[i] /= norm;
            }
        }

        let threshold = pivot_tolerance * row_norms(&a).into_iter().fold(0.0, f64::max);
        let lu = a.lu();

        let u = lu.u();
        if let Some(pivot) = (0..u.nrows()).find(|&i| u[(i, i)].abs() <= threshold) {
            return Err(DcError::SingularMatrix { pivot });
        }

        lu.solve(&z)
            .ok_or(DcError::SingularMatrix { pivot: self.size() })
    }
}

fn row_norms(a: &DMatrix<f64>) -> Vec<f64> {
    a.row_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .collect()
}
