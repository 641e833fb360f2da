//! Circuits as data, plus the engine that runs them.
//!
//! A [`Circuit`] is a fixed register size and an ordered op list: state
//! preparations, gate applications, measurement requests. Building validates
//! eagerly, so a circuit that constructs at all will not fail a run for
//! structural reasons. A [`Simulator`] owns the sampling RNG and the qubit
//! ceiling and is the only thing that executes circuits; `run` borrows the
//! circuit, so one program can be sampled repeatedly, or from several
//! engines at once.
//!
//! Sampling never collapses the state, so measurement requests simply mark
//! qubits for the end-of-run sample, in the order first requested.

use num_complex::Complex64 as C64;
use rand::{ rngs::StdRng, SeedableRng };
use crate::TOL;
use crate::error::{ SimError, SimResult };
use crate::gate::Gate;
use crate::register::{
    check_qubit_list,
    Histogram,
    Register,
    DEFAULT_QUBIT_LIMIT,
};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Prepare { qubits: Vec<usize>, amps: Vec<C64> },
    Apply(Gate),
    Measure(Vec<usize>),
}

/// An ordered program over a fixed-size register.
///
/// Built top to bottom with [`push`][Self::push] / [`extend`][Self::extend] /
/// [`prepare`][Self::prepare] / [`measure`][Self::measure], all of which
/// validate immediately; read-only afterwards from the engine's point of
/// view.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    n: usize,
    ops: Vec<Op>,
}

impl Circuit {
    /// New empty circuit over `n` qubits.
    pub fn new(n: usize) -> Self {
        Self { n, ops: Vec::new() }
    }

    /// Register size the circuit runs on.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Number of recorded ops (preparations + gates + measure requests).
    pub fn len(&self) -> usize { self.ops.len() }

    /// `true` if no ops have been recorded.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    pub(crate) fn ops(&self) -> &[Op] { &self.ops }

    /// Append a gate application.
    ///
    /// Fails if the gate touches a qubit outside the register.
    pub fn push(&mut self, gate: Gate) -> SimResult<&mut Self> {
        if let Some(q) = gate.qubits().find(|&q| q >= self.n) {
            return Err(SimError::Parameter(
                format!("gate qubit {} outside register of size {}",
                    q, self.n)));
        }
        self.ops.push(Op::Apply(gate));
        Ok(self)
    }

    /// Append every gate of a block (or any other gate source) in order.
    pub fn extend<I>(&mut self, gates: I) -> SimResult<&mut Self>
    where I: IntoIterator<Item = Gate>
    {
        for gate in gates.into_iter() { self.push(gate)?; }
        Ok(self)
    }

    /// Record a preparation seeding `qubits` with the normalized amplitude
    /// vector `amps` (validated here, at build time).
    ///
    /// At run time the seeded subregister must still be in ∣0…0⟩, which holds
    /// for any preparation recorded before the first gate touching those
    /// qubits.
    pub fn prepare(&mut self, qubits: &[usize], amps: &[C64])
        -> SimResult<&mut Self>
    {
        check_qubit_list(self.n, qubits)?;
        if amps.len() != 1 << qubits.len() {
            return Err(SimError::Dimension {
                expected: 1 << qubits.len(),
                actual: amps.len(),
            });
        }
        let dev = (amps.iter().map(|a| a.norm_sqr()).sum::<f64>() - 1.0).abs();
        if dev > TOL {
            return Err(SimError::Normalization { what: "state vector", dev });
        }
        self.ops.push(Op::Prepare {
            qubits: qubits.to_vec(),
            amps: amps.to_vec(),
        });
        Ok(self)
    }

    /// Request that `qubits` be part of the end-of-run sample.
    pub fn measure(&mut self, qubits: &[usize]) -> SimResult<&mut Self> {
        check_qubit_list(self.n, qubits)?;
        self.ops.push(Op::Measure(qubits.to_vec()));
        Ok(self)
    }

    /// Qubits sampled at the end of a run: every measured qubit in
    /// first-requested order, or all qubits if none were requested.
    pub fn measured_qubits(&self) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for op in self.ops.iter() {
            if let Op::Measure(qubits) = op {
                for &q in qubits.iter() {
                    if !out.contains(&q) { out.push(q); }
                }
            }
        }
        if out.is_empty() { (0..self.n).collect() } else { out }
    }
}

/// Executes circuits against fresh registers.
///
/// Owns the sampling RNG and the qubit ceiling; there is no process-wide
/// simulator state, so independent engines can run on independent threads.
#[derive(Clone, Debug)]
pub struct Simulator {
    qubit_limit: usize,
    rng: StdRng,
}

impl Simulator {
    /// New engine under [`DEFAULT_QUBIT_LIMIT`].
    ///
    /// Passing `None` for `seed` draws one from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_limit(DEFAULT_QUBIT_LIMIT, seed)
    }

    /// New engine with an explicit qubit ceiling.
    pub fn with_limit(qubit_limit: usize, seed: Option<u64>) -> Self {
        let rng
            = seed.map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        Self { qubit_limit, rng }
    }

    /// The configured qubit ceiling.
    pub fn qubit_limit(&self) -> usize { self.qubit_limit }

    /// Run `circuit` against a fresh ∣0…0⟩ register and sample `shots`
    /// outcomes of its measured qubits.
    ///
    /// The register lives only for the duration of the call; the circuit is
    /// untouched and reusable.
    pub fn run(&mut self, circuit: &Circuit, shots: usize)
        -> SimResult<Histogram>
    {
        let mut reg
            = Register::with_limit(circuit.num_qubits(), self.qubit_limit)?;
        for op in circuit.ops() {
            match op {
                Op::Prepare { qubits, amps } => { reg.prepare(qubits, amps)?; }
                Op::Apply(gate) => { reg.apply(gate)?; }
                Op::Measure(_) => {}
            }
        }
        reg.sample(&circuit.measured_qubits(), shots, &mut self.rng)
    }
}
