//! Quantum Fourier transform as a reusable gate block.
//!
//! The forward transform on *n* qubits is the textbook ladder (a Hadamard on
//! qubit *i* followed by controlled phase rotations π/2<sup>k−1</sup> with
//! control *k*+*i*−1 for *k* = 2..*n*−*i*) closed out by a qubit-reversal
//! swap network. Qubit 0 plays the most-significant role, so reading measured
//! keys most-significant-first (character 0 first) matches the phase ladder
//! in [`phase_est`][crate::phase_est]. The inverse undoes the swaps first and
//! walks the ladder backwards with negated angles; the two compose to the
//! identity exactly (up to floating error), which is the module's central
//! test.

use std::f64::consts::PI;
use crate::gate::{ self, Block, Gate };

/// Single Fourier rotation: phase ±π/2<sup>k−1</sup> on `target`, controlled
/// by `control`, with the sign negated when `inverse` is set.
///
/// *Panics if `k == 0` or `control == target`.*
pub fn cr(k: usize, control: usize, target: usize, inverse: bool) -> Gate {
    if k == 0 { panic!("cr: rotation order must be positive"); }
    if control == target {
        panic!("cr: control and target must be distinct");
    }
    let sign = if inverse { -1.0 } else { 1.0 };
    let theta = sign * PI / 2_f64.powi((k - 1) as i32);
    gate::phase(theta, target).with_controls([control])
}

/// Fourier-transform block on qubits `0..n`.
///
/// With `inverse` set, the exact inverse sequence: swaps first, then the
/// rotation ladder unwound in reverse.
pub fn qft(n: usize, inverse: bool) -> Block {
    let mut gates = Block::new();
    if inverse {
        for i in 0..n / 2 {
            gates.push(gate::swap(i, n - 1 - i));
        }
        for i in (0..n).rev() {
            for k in (2..=(n - i)).rev() {
                gates.push(cr(k, k + i - 1, i, true));
            }
            gates.push(gate::hadamard(i));
        }
    } else {
        for i in 0..n {
            gates.push(gate::hadamard(i));
            for k in 2..=(n - i) {
                gates.push(cr(k, k + i - 1, i, false));
            }
        }
        for i in 0..n / 2 {
            gates.push(gate::swap(i, n - 1 - i));
        }
    }
    gates
}
