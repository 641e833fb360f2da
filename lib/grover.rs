//! Grover search over an *n*-bit space with a pattern-matching bit oracle.
//!
//! The search register is *n* primary qubits plus one ancilla held in ∣−⟩.
//! The oracle conditions a multi-controlled X onto the ancilla on the checked
//! bits matching a target pattern, so matching basis states pick up a sign by
//! phase kickback; diffusion is the usual inversion about the mean, built as
//! a Hadamard-conjugated phase shift about ∣0…0⟩. Restricting the oracle to a
//! checked subset of bit positions marks the whole family of states agreeing
//! with the target there.
//!
//! [`grover_search`] drives the full procedure: it validates the
//! (N, M, target) triple, widens the space once with a virtual free bit if
//! the marked fraction reaches 1/2 (amplitude amplification diverges
//! otherwise), runs ⌊π/2θ⌋ iterations, and samples the primary qubits.
//! Requiring M ≥ 1 keeps θ away from 0, so the iteration count is bounded by
//! ⌈π√N/4⌉ and can never run away.

use std::f64::consts::PI;
use itertools::Itertools;
use crate::circuit::{ Circuit, Simulator };
use crate::error::{ SimError, SimResult };
use crate::gate::{ self, Block };
use crate::register::Histogram;

/// Oracle block: flips the ancilla at index `ancilla` for the basis states
/// whose `checked` bits match `target`.
///
/// `target[i]` is the required value of qubit `i`; positions outside
/// `checked` are ignored. With the ancilla in ∣−⟩ the flip becomes a sign on
/// the matching states.
///
/// *Panics if an index in `checked` lies outside `target`, or if `ancilla`
/// collides with a checked position.*
pub fn oracle(target: &[bool], checked: &[usize], ancilla: usize) -> Block {
    let mut gates = Block::new();
    for &i in checked.iter() {
        if !target[i] { gates.push(gate::pauli_x(i)); }
    }
    gates.push(gate::pauli_x(ancilla).with_controls(checked.iter().copied()));
    for &i in checked.iter() {
        if !target[i] { gates.push(gate::pauli_x(i)); }
    }
    gates
}

/// Phase shift about ∣0…0⟩ on qubits `0..n` (2∣0⟩⟨0∣ − 1 up to global sign):
/// an X frame around an (*n*−1)-controlled Z.
///
/// *Panics if `n == 0`.*
pub fn phase_shift(n: usize) -> Block {
    if n == 0 { panic!("phase_shift: need at least one qubit"); }
    let mut gates = Block::new();
    for i in 0..n { gates.push(gate::pauli_x(i)); }
    gates.push(gate::pauli_z(n - 1).with_controls(0..n - 1));
    for i in 0..n { gates.push(gate::pauli_x(i)); }
    gates
}

/// Diffusion block on qubits `0..n`: Hadamard frame around
/// [`phase_shift`].
pub fn diffusion(n: usize) -> Block {
    Block::compose((0..n).map(gate::hadamard))
        .chain(phase_shift(n))
        .chain(Block::compose((0..n).map(gate::hadamard)))
}

/// One full Grover iteration on `n` primary qubits with the ancilla at
/// index `n`: oracle, then diffusion.
pub fn grover_iteration(n: usize, target: &[bool], checked: &[usize])
    -> Block
{
    oracle(target, checked, n).chain(diffusion(n))
}

/// Rotation angle θ = 2·arccos(√((N−M)/N)) of a single Grover iteration for
/// `marked` matching states in a space of `space`.
///
/// Meaningful for `1 ≤ marked ≤ space`; [`grover_search`] validates this
/// before calling.
pub fn rotation_angle(space: usize, marked: usize) -> f64 {
    2.0 * ((space - marked) as f64 / space as f64).sqrt().acos()
}

/// Iteration count ⌊π/(2θ)⌋ that lands the state nearest the marked
/// subspace.
pub fn optimal_iterations(space: usize, marked: usize) -> usize {
    (PI / (2.0 * rotation_angle(space, marked))) as usize
}

/// Run the full search and sample the primary qubits.
///
/// `space` must equal 2<sup>n</sup> for an *n*-character binary `target`
/// (character `i` = required value of qubit `i`); `marked` is the caller's
/// count of matching states, trusted for the iteration count; `checked`
/// restricts the oracle to a subset of bit positions (`None` checks all). If
/// the marked fraction reaches 1/2, the space is doubled once with a virtual
/// free bit so amplification still converges; the extra bit then shows up
/// in the reported keys. The histogram covers the primary qubits only, with
/// the ancilla marginalized out.
pub fn grover_search(
    sim: &mut Simulator,
    space: usize,
    marked: usize,
    target: &str,
    checked: Option<&[usize]>,
    shots: usize,
) -> SimResult<Histogram>
{
    let mut target: Vec<bool> = target.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(SimError::Parameter(
                format!("target pattern must be binary, found {:?}", c))),
        })
        .collect::<SimResult<_>>()?;
    let mut n = target.len();
    if n == 0 {
        return Err(SimError::Parameter(
            "target pattern must be non-empty".into()));
    }
    if space != 1 << n {
        return Err(SimError::Parameter(
            format!("space of size {} does not match a {}-bit target",
                space, n)));
    }
    if marked == 0 || marked >= space {
        return Err(SimError::Parameter(
            format!("marked count must lie in 1..{}, got {}", space, marked)));
    }
    let mut checked: Option<Vec<usize>> = checked.map(<[usize]>::to_vec);
    if let Some(list) = checked.as_ref() {
        if list.is_empty() {
            return Err(SimError::Parameter(
                "checked-bit list must be non-empty".into()));
        }
        if let Some(&q) = list.iter().find(|&&q| q >= n) {
            return Err(SimError::Parameter(
                format!("checked bit {} outside a {}-bit target", q, n)));
        }
        if !list.iter().all_unique() {
            return Err(SimError::Parameter(
                "repeated checked bit".into()));
        }
    }
    let mut space = space;
    if 2 * marked >= space {
        // widen once so the marked fraction drops below 1/2
        space *= 2;
        n += 1;
        target.push(false);
        if let Some(list) = checked.as_mut() { list.push(n - 1); }
    }
    let checked: Vec<usize>
        = checked.unwrap_or_else(|| (0..n).collect());

    let mut ckt = Circuit::new(n + 1);
    ckt.push(gate::pauli_x(n))?;
    for i in 0..=n { ckt.push(gate::hadamard(i))?; }
    for _ in 0..optimal_iterations(space, marked) {
        ckt.extend(grover_iteration(n, &target, &checked))?;
    }
    let primary: Vec<usize> = (0..n).collect();
    ckt.measure(&primary)?;
    sim.run(&ckt, shots)
}
