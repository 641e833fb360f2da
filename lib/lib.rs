//! Dense state-vector simulation of quantum circuits, with a small set of
//! algorithm drivers built on top.
//!
//! States over *n* qubits are length-2<sup>n</sup> complex vectors indexed
//! with qubit *i* at bit *i* of the basis index; gates are arbitrary
//! unitaries over an ordered target list with optional control qubits,
//! applied block-wise without ever forming a full 2<sup>n</sup>-dimensional
//! operator. [`circuit`] wraps the register in a replayable gate program
//! with seedable sampling, and [`qft`], [`grover`], and [`phase_est`] build
//! the standard algorithm blocks on top of it.
//!
//! # Example
//! ```
//! use statevec_sim::circuit::{ Circuit, Simulator };
//! use statevec_sim::gate;
//!
//! // Bell pair: H on qubit 0, then X on qubit 1 controlled by qubit 0
//! let mut ckt = Circuit::new(2);
//! ckt.push(gate::hadamard(0)).unwrap();
//! ckt.push(gate::pauli_x(1).controlled([0]).unwrap()).unwrap();
//! ckt.measure(&[0, 1]).unwrap();
//!
//! let mut sim = Simulator::new(Some(10546));
//! let hist = sim.run(&ckt, 1000).unwrap();
//! assert_eq!(hist.get("01") + hist.get("10"), 0);
//! assert_eq!(hist.get("00") + hist.get("11"), 1000);
//! ```

pub mod error;
pub mod gate;
pub mod register;
pub mod circuit;
pub mod qft;
pub mod grover;
pub mod phase_est;

/// Numerical tolerance for unitarity and normalization checks.
pub const TOL: f64 = 1e-9;
