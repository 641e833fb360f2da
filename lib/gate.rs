//! Unitary gates tagged with the register qubits they act on.
//!
//! A [`Gate`] pairs a 2<sup>k</sup>×2<sup>k</sup> unitary matrix with the
//! ordered list of *k* target qubits it acts on, plus an optional list of
//! control qubits. Bit *b* of a matrix row/column index corresponds to
//! `targets[b]`, matching the register convention that qubit *i* is bit *i*
//! of a basis-state index. Controls are never folded into the matrix:
//! logically a controlled gate is its matrix embedded in the all-controls-1
//! block of a larger identity, and the state-vector engine realizes exactly
//! that with an index mask instead of materializing the embedding.
//!
//! [`Block`] is an ordered gate sequence treated as one composite operation:
//! the unit in which Fourier transforms, Grover iterations, and other
//! sub-circuits are handed around as plain values.

use std::f64::consts::FRAC_1_SQRT_2;
use nalgebra as na;
use num_complex::Complex64 as C64;
use once_cell::sync::Lazy;
use crate::TOL;
use crate::error::{ SimError, SimResult };

/// A single-qubit Hadamard matrix.
pub static HADAMARD: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let ort2 = C64::from(FRAC_1_SQRT_2);
        let mut h = na::DMatrix::zeros(2, 2);
        h[(0, 0)] =  ort2;
        h[(0, 1)] =  ort2;
        h[(1, 0)] =  ort2;
        h[(1, 1)] = -ort2;
        h
    });

/// A single-qubit Pauli *X* matrix.
pub static PAULI_X: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut x = na::DMatrix::zeros(2, 2);
        x[(0, 1)] = C64::from(1.0);
        x[(1, 0)] = C64::from(1.0);
        x
    });

/// A single-qubit Pauli *Z* matrix.
pub static PAULI_Z: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut z = na::DMatrix::zeros(2, 2);
        z[(0, 0)] = C64::from( 1.0);
        z[(1, 1)] = C64::from(-1.0);
        z
    });

/// A two-qubit swap matrix.
pub static SWAP: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut s = na::DMatrix::zeros(4, 4);
        s[(0, 0)] = C64::from(1.0);
        s[(1, 2)] = C64::from(1.0);
        s[(2, 1)] = C64::from(1.0);
        s[(3, 3)] = C64::from(1.0);
        s
    });

/// Hadamard gate on qubit `k`.
pub fn hadamard(k: usize) -> Gate {
    Gate { matrix: HADAMARD.clone(), targets: vec![k], controls: Vec::new() }
}

/// Pauli-*X* (NOT) gate on qubit `k`.
pub fn pauli_x(k: usize) -> Gate {
    Gate { matrix: PAULI_X.clone(), targets: vec![k], controls: Vec::new() }
}

/// Pauli-*Z* gate on qubit `k`.
pub fn pauli_z(k: usize) -> Gate {
    Gate { matrix: PAULI_Z.clone(), targets: vec![k], controls: Vec::new() }
}

/// Phase-rotation gate diag(1, e<sup>iθ</sup>) on qubit `k`.
pub fn phase(theta: f64, k: usize) -> Gate {
    let mut p = na::DMatrix::zeros(2, 2);
    p[(0, 0)] = C64::from(1.0);
    p[(1, 1)] = C64::cis(theta);
    Gate { matrix: p, targets: vec![k], controls: Vec::new() }
}

/// Swap gate exchanging qubits `a` and `b`.
///
/// *Panics if `a == b`.*
pub fn swap(a: usize, b: usize) -> Gate {
    if a == b { panic!("Gate: swap requires distinct qubits"); }
    Gate { matrix: SWAP.clone(), targets: vec![a, b], controls: Vec::new() }
}

/// A unitary operation on one or more target qubits, optionally conditioned
/// on control qubits being 1.
///
/// Immutable once constructed; the combinators return new values.
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    matrix: na::DMatrix<C64>,
    targets: Vec<usize>,
    controls: Vec<usize>,
}

impl Gate {
    /// Construct a gate from an arbitrary matrix over `targets`.
    ///
    /// Fails if `targets` is empty or repeats an index, if the matrix is not
    /// 2<sup>k</sup>×2<sup>k</sup> for *k* targets, or if the matrix deviates
    /// from unitarity by more than [`TOL`].
    pub fn unitary<I>(matrix: na::DMatrix<C64>, targets: I) -> SimResult<Self>
    where I: IntoIterator<Item = usize>
    {
        let targets: Vec<usize> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(SimError::Parameter(
                "gate needs at least one target".into()));
        }
        if has_repeat(&targets) {
            return Err(SimError::Parameter(
                "gate target indices must be distinct".into()));
        }
        let dim = 1_usize << targets.len();
        if matrix.nrows() != dim {
            return Err(
                SimError::Dimension { expected: dim, actual: matrix.nrows() });
        }
        if matrix.ncols() != dim {
            return Err(
                SimError::Dimension { expected: dim, actual: matrix.ncols() });
        }
        let dev = unitarity_dev(&matrix);
        if dev > TOL {
            return Err(SimError::Normalization { what: "gate matrix", dev });
        }
        Ok(Self { matrix, targets, controls: Vec::new() })
    }

    /// Add control qubits: the matrix then applies only where every control
    /// is 1 and the identity applies elsewhere.
    ///
    /// Fails if a new control coincides with a target or an existing control.
    pub fn controlled<I>(mut self, controls: I) -> SimResult<Self>
    where I: IntoIterator<Item = usize>
    {
        for c in controls.into_iter() {
            if self.targets.contains(&c) || self.controls.contains(&c) {
                return Err(SimError::Parameter(
                    format!("control qubit {} overlaps the gate", c)));
            }
            self.controls.push(c);
        }
        Ok(self)
    }

    // non-validating variant for builders whose indices are distinct by
    // construction
    pub(crate) fn with_controls<I>(mut self, controls: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        self.controls.extend(controls);
        debug_assert!(
            self.targets.iter().all(|t| !self.controls.contains(t)));
        self
    }

    /// Conjugate transpose of the matrix, acting on the same targets and
    /// controls.
    pub fn adjoint(&self) -> Self {
        Self {
            matrix: self.matrix.adjoint(),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
        }
    }

    /// Number of target qubits.
    pub fn num_targets(&self) -> usize { self.targets.len() }

    /// Target qubits, in matrix bit order.
    pub fn targets(&self) -> &[usize] { &self.targets }

    /// Control qubits.
    pub fn controls(&self) -> &[usize] { &self.controls }

    /// The 2<sup>k</sup>×2<sup>k</sup> matrix over the targets alone.
    pub fn matrix(&self) -> &na::DMatrix<C64> { &self.matrix }

    /// Every qubit the gate touches (targets, then controls).
    pub fn qubits(&self) -> impl Iterator<Item = usize> + '_ {
        self.targets.iter().chain(self.controls.iter()).copied()
    }

    /// Expand to the full 2<sup>n</sup>×2<sup>n</sup> operator on an
    /// `n`-qubit register, controls included.
    ///
    /// This is the reference against which the block-wise engine is checked;
    /// the engine itself never forms this matrix.
    ///
    /// Fails if any target or control index lies outside `0..n`.
    pub fn as_matrix(&self, n: usize) -> SimResult<na::DMatrix<C64>> {
        if let Some(q) = self.qubits().find(|&q| q >= n) {
            return Err(SimError::Parameter(
                format!("gate qubit {} outside register of size {}", q, n)));
        }
        let dim = 1_usize << n;
        let k = self.targets.len();
        let tmask: usize
            = self.targets.iter().fold(0, |acc, &t| acc | (1 << t));
        let cmask: usize
            = self.controls.iter().fold(0, |acc, &c| acc | (1 << c));
        let mut full = na::DMatrix::zeros(dim, dim);
        for col in 0..dim {
            if col & cmask != cmask {
                full[(col, col)] = C64::from(1.0);
                continue;
            }
            let j: usize
                = self.targets.iter().enumerate()
                .fold(0, |acc, (b, &t)| acc | (((col >> t) & 1) << b));
            let base = col & !tmask;
            for i in 0..(1_usize << k) {
                let row: usize
                    = self.targets.iter().enumerate()
                    .fold(base, |acc, (b, &t)| acc | (((i >> b) & 1) << t));
                full[(row, col)] = self.matrix[(i, j)];
            }
        }
        Ok(full)
    }
}

// largest elementwise deviation of U U† from the identity
fn unitarity_dev(u: &na::DMatrix<C64>) -> f64 {
    let prod = u * u.adjoint();
    let eye = na::DMatrix::<C64>::identity(prod.nrows(), prod.ncols());
    (prod - eye).iter().map(|z| z.norm()).fold(0.0, f64::max)
}

fn has_repeat(indices: &[usize]) -> bool {
    indices.iter().enumerate()
        .any(|(k, q)| indices[..k].contains(q))
}

/// An ordered sequence of gates treated as a single composite operation.
///
/// Built by pure combinators ([`compose`][Self::compose], [`then`][Self::then],
/// [`chain`][Self::chain]), never by mutating a circuit in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block(Vec<Gate>);

impl Block {
    /// Create an empty block.
    pub fn new() -> Self { Self(Vec::new()) }

    /// Collect gates into a block.
    pub fn compose<I>(gates: I) -> Self
    where I: IntoIterator<Item = Gate>
    {
        Self(gates.into_iter().collect())
    }

    /// Append a single gate, returning the extended block.
    pub fn then(mut self, gate: Gate) -> Self {
        self.0.push(gate);
        self
    }

    /// Concatenate another block onto the end of this one.
    pub fn chain(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    pub(crate) fn push(&mut self, gate: Gate) { self.0.push(gate); }

    /// Number of gates.
    pub fn len(&self) -> usize { self.0.len() }

    /// `true` if the block holds no gates.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Iterate over the gates in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Gate> { self.0.iter() }

    /// The inverse sequence: gates reversed, each replaced by its adjoint.
    pub fn adjoint(&self) -> Self {
        Self(self.0.iter().rev().map(Gate::adjoint).collect())
    }
}

impl From<Vec<Gate>> for Block {
    fn from(gates: Vec<Gate>) -> Self { Self(gates) }
}

impl FromIterator<Gate> for Block {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = Gate>
    {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Block {
    type Item = Gate;
    type IntoIter = std::vec::IntoIter<Gate>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a Block {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_eq(a: &na::DMatrix<C64>, b: &na::DMatrix<C64>) -> bool {
        a.shape() == b.shape()
            && (a - b).iter().map(|z| z.norm()).fold(0.0, f64::max) < 1e-12
    }

    #[test]
    fn canonical_gates_are_unitary() {
        let gates
            = [hadamard(0), pauli_x(0), pauli_z(0), phase(0.37, 0), swap(0, 1)];
        for gate in gates.iter() {
            assert!(unitarity_dev(gate.matrix()) < TOL);
        }
    }

    #[test]
    fn unitary_rejects_bad_dimension() {
        let m = na::DMatrix::<C64>::identity(2, 2);
        assert!(matches!(
            Gate::unitary(m, [0, 1]),
            Err(SimError::Dimension { expected: 4, actual: 2 }),
        ));
    }

    #[test]
    fn unitary_rejects_non_unitary() {
        let mut m = na::DMatrix::<C64>::zeros(2, 2);
        m[(0, 0)] = C64::from(2.0);
        m[(1, 1)] = C64::from(1.0);
        assert!(matches!(
            Gate::unitary(m, [0]),
            Err(SimError::Normalization { .. }),
        ));
    }

    #[test]
    fn unitary_rejects_repeated_targets() {
        let m = na::DMatrix::<C64>::identity(4, 4);
        assert!(matches!(
            Gate::unitary(m, [1, 1]),
            Err(SimError::Parameter(_)),
        ));
    }

    #[test]
    fn controlled_rejects_overlap() {
        assert!(matches!(
            hadamard(1).controlled([1]),
            Err(SimError::Parameter(_)),
        ));
        let cz = pauli_z(0).controlled([1]).unwrap();
        assert!(matches!(cz.controlled([1]), Err(SimError::Parameter(_))));
    }

    #[test]
    fn controlled_embedding_matches_identity_block() {
        // CX with control 0, target 1: ∣01⟩ ↔ ∣11⟩ (indices 1 and 3)
        let cx = pauli_x(1).controlled([0]).unwrap();
        let m = cx.as_matrix(2).unwrap();
        let mut expect = na::DMatrix::<C64>::zeros(4, 4);
        expect[(0, 0)] = C64::from(1.0);
        expect[(3, 1)] = C64::from(1.0);
        expect[(2, 2)] = C64::from(1.0);
        expect[(1, 3)] = C64::from(1.0);
        assert!(approx_eq(&m, &expect));
    }

    #[test]
    fn as_matrix_of_swap_is_swap() {
        let m = swap(0, 1).as_matrix(2).unwrap();
        assert!(approx_eq(&m, &SWAP));
    }

    #[test]
    fn as_matrix_respects_target_order() {
        // X⊗Z over targets [1, 0] equals Z on qubit 1, X on qubit 0
        let big = PAULI_X.kronecker(&PAULI_Z);
        let scrambled
            = Gate::unitary(big, [1, 0]).unwrap().as_matrix(2).unwrap();
        let plain = PAULI_Z.kronecker(&PAULI_X);
        assert!(approx_eq(&scrambled, &plain));
    }

    #[test]
    fn adjoint_inverts() {
        let p = phase(0.75, 0);
        let prod = p.matrix() * p.adjoint().matrix();
        assert!(approx_eq(&prod, &na::DMatrix::identity(2, 2)));
    }

    #[test]
    fn block_adjoint_reverses_order() {
        let block = Block::new()
            .then(hadamard(0))
            .then(phase(0.3, 1));
        let adj = block.adjoint();
        assert_eq!(adj.len(), 2);
        assert_eq!(adj.iter().next().map(Gate::targets), Some(&[1][..]));
    }

    #[test]
    fn block_conversions_preserve_order() {
        let from_vec = Block::from(vec![hadamard(0), pauli_x(1)]);
        let collected: Block = (0..2).map(hadamard).collect();
        assert_eq!(from_vec.len(), 2);
        assert_eq!(collected.len(), 2);
        assert_eq!(
            Block::compose(from_vec).iter().last().map(Gate::targets),
            Some(&[1][..]),
        );
    }

    #[test]
    #[should_panic]
    fn swap_panics_on_equal_qubits() {
        let _ = swap(2, 2);
    }
}
