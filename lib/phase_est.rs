//! Iterative phase estimation for a unitary with a known eigenvector.
//!
//! A *t*-qubit counting register (qubits `0..t`) is put in uniform
//! superposition and entangled with an *m*-qubit eigenvector register
//! (qubits `t..t + m`) through controlled powers U<sup>2<sup>i</sup></sup>,
//! control `t − 1 − i` so that qubit 0 carries the most significant bit of
//! the accumulated phase. An inverse Fourier transform then concentrates the
//! counting register on the binary expansion of the eigenphase, and the most
//! frequent readout gives the estimate y/2<sup>t</sup>.
//!
//! [`precision_qubits`] sizes the counting register for a wanted number of
//! accurate bits at a given failure probability.
//!
//! # Example
//! ```
//! use std::f64::consts::TAU;
//! use nalgebra as na;
//! use num_complex::Complex64 as C64;
//! use statevec_sim::circuit::Simulator;
//! use statevec_sim::phase_est::estimate_phase;
//!
//! // diag(1, e^{2πi·3/8}) with eigenvector ∣1⟩
//! let mut u = na::DMatrix::<C64>::zeros(2, 2);
//! u[(0, 0)] = C64::from(1.0);
//! u[(1, 1)] = C64::cis(TAU * 0.375);
//! let evec = [C64::from(0.0), C64::from(1.0)];
//!
//! let mut sim = Simulator::new(Some(10546));
//! let est = estimate_phase(&mut sim, &u, &evec, 3, 100).unwrap();
//! assert!((est.phase - 0.375).abs() < 1e-12);
//! ```

use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::circuit::{ Circuit, Simulator };
use crate::error::{ SimError, SimResult };
use crate::gate::{ self, Gate };
use crate::qft::qft;
use crate::register::Histogram;

/// Counting-register size giving `bits` accurate bits of phase with failure
/// probability at most `fail_prob`: *t* = bits + ⌈log₂(2 + 1/(2·fail_prob))⌉.
///
/// *Panics if `fail_prob` does not lie in (0, 1).*
pub fn precision_qubits(bits: usize, fail_prob: f64) -> usize {
    if !(0.0..1.0).contains(&fail_prob) || fail_prob == 0.0 {
        panic!("precision_qubits: failure probability must lie in (0, 1)");
    }
    bits + (2.0 + 0.5 / fail_prob).log2().ceil() as usize
}

/// Result of a phase-estimation run.
#[derive(Clone, Debug)]
pub struct PhaseEstimate {
    /// Most frequent readout as a phase in [0, 1).
    pub phase: f64,
    /// Fraction of shots that produced the winning readout.
    pub confidence: f64,
    /// Full readout distribution over the counting register.
    pub counts: Histogram,
}

/// Estimate the eigenphase of `u` on `eigenvector` with `t` counting qubits.
///
/// `u` must be a square unitary of power-of-two dimension 2<sup>m</sup> and
/// `eigenvector` a normalized vector of matching length; `t + m` qubits are
/// simulated in total. The returned phase is y/2<sup>t</sup> for the most
/// frequent readout y, exact whenever the eigenphase has a `t`-bit binary
/// expansion and otherwise accurate to the register's resolution with high
/// probability.
pub fn estimate_phase(
    sim: &mut Simulator,
    u: &na::DMatrix<C64>,
    eigenvector: &[C64],
    t: usize,
    shots: usize,
) -> SimResult<PhaseEstimate>
{
    if t == 0 {
        return Err(SimError::Parameter(
            "counting register must hold at least one qubit".into()));
    }
    if shots == 0 {
        return Err(SimError::Parameter("shots must be positive".into()));
    }
    if u.nrows() != u.ncols() {
        return Err(SimError::Dimension {
            expected: u.nrows(), actual: u.ncols() });
    }
    let dim = u.nrows();
    if dim < 2 || !dim.is_power_of_two() {
        return Err(SimError::Parameter(
            format!("operator dimension must be a power of two ≥ 2, got {}",
                dim)));
    }
    if eigenvector.len() != dim {
        return Err(SimError::Dimension {
            expected: dim, actual: eigenvector.len() });
    }
    let m = dim.trailing_zeros() as usize;
    let evec_qubits: Vec<usize> = (t..t + m).collect();

    let mut ckt = Circuit::new(t + m);
    ckt.prepare(&evec_qubits, eigenvector)?;
    for i in 0..t { ckt.push(gate::hadamard(i))?; }
    // phase ladder: qubit t−1−i controls U^(2^i)
    let mut power = u.clone();
    for i in 0..t {
        ckt.push(
            Gate::unitary(power.clone(), evec_qubits.iter().copied())?
                .controlled([t - 1 - i])?
        )?;
        power = &power * &power;
    }
    ckt.extend(qft(t, true))?;
    let counting: Vec<usize> = (0..t).collect();
    ckt.measure(&counting)?;

    let counts = sim.run(&ckt, shots)?;
    let (key, wins) = counts.most_frequent()
        .ok_or_else(|| SimError::Parameter(
            "estimation produced no samples".into()))?;
    let y: usize = key.chars()
        .fold(0, |acc, c| (acc << 1) | usize::from(c == '1'));
    let phase = y as f64 / (1_u64 << t) as f64;
    let confidence = wins as f64 / shots as f64;
    Ok(PhaseEstimate { phase, confidence, counts })
}
