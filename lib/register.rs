//! Dense state vectors over small qubit registers.
//!
//! A [`Register`] stores all 2<sup>n</sup> complex amplitudes of an *n*-qubit
//! state and evolves them exactly under unitary gates. Gates touch amplitudes
//! in blocks that differ only in the target-qubit bits, so an application
//! costs *O*(2<sup>n</sup>·2<sup>k</sup>) for a *k*-target gate and never
//! forms the full 2<sup>n</sup>×2<sup>n</sup> operator; contrast
//! [`Gate::as_matrix`], which exists precisely to double-check this kernel.
//!
//! Convention used everywhere: qubit *i* is bit *i* of a basis-state index,
//! and the bitstrings produced by [`sample`][Register::sample] put qubit *i*
//! at character *i*.
//!
//! # Example
//! ```
//! use statevec_sim::{ gate, register::Register };
//!
//! fn main() -> statevec_sim::error::SimResult<()> {
//!     // Bell pair on two qubits
//!     let mut reg = Register::new(2)?;
//!     reg.apply(&gate::hadamard(0))?
//!        .apply(&gate::pauli_x(1).controlled([0])?)?;
//!
//!     let probs = reg.probabilities();
//!     assert!((probs[0] - 0.5).abs() < 1e-12);
//!     assert!((probs[3] - 0.5).abs() < 1e-12);
//!     Ok(())
//! }
//! ```

use std::fmt;
use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use rustc_hash::FxHashMap;
use crate::TOL;
use crate::error::{ SimError, SimResult };
use crate::gate::Gate;

/// Default ceiling on register sizes (2<sup>26</sup> amplitudes ≈ 1 GiB).
pub const DEFAULT_QUBIT_LIMIT: usize = 26;

/// Render a basis-state index over `len` qubits with qubit `i` at character
/// `i`.
pub fn bitstring(index: usize, len: usize) -> String {
    (0..len)
        .map(|b| if (index >> b) & 1 == 1 { '1' } else { '0' })
        .collect()
}

// distinct, in-range, non-empty qubit list
pub(crate) fn check_qubit_list(n: usize, qubits: &[usize]) -> SimResult<()> {
    if qubits.is_empty() {
        return Err(SimError::Parameter("empty qubit list".into()));
    }
    if let Some(&q) = qubits.iter().find(|&&q| q >= n) {
        return Err(SimError::Parameter(
            format!("qubit {} outside register of size {}", q, n)));
    }
    if !qubits.iter().all_unique() {
        return Err(SimError::Parameter("repeated qubit index".into()));
    }
    Ok(())
}

// offsets of every local bit pattern scattered to the global positions in
// `qubits`
fn scatter_table(qubits: &[usize]) -> Vec<usize> {
    (0..1_usize << qubits.len())
        .map(|j| {
            qubits.iter().enumerate()
                .fold(0, |acc, (b, &q)| acc | (((j >> b) & 1) << q))
        })
        .collect()
}

/* Register *******************************************************************/

/// A dense complex state vector over `n` qubits.
///
/// Amplitude `k` belongs to the basis state whose qubit values are the binary
/// digits of `k`, least significant first. The squared magnitudes sum to 1
/// within floating error at all times: unitary gates preserve the invariant
/// and [`prepare`][Self::prepare] validates its inputs against it.
#[derive(Clone, Debug, PartialEq)]
pub struct Register {
    n: usize,
    amps: na::DVector<C64>,
}

impl Register {
    /// Allocate ∣0…0⟩ over `n` qubits under [`DEFAULT_QUBIT_LIMIT`].
    pub fn new(n: usize) -> SimResult<Self> {
        Self::with_limit(n, DEFAULT_QUBIT_LIMIT)
    }

    /// Allocate ∣0…0⟩ over `n` qubits, failing fast (before any allocation)
    /// if `n` exceeds `limit`.
    pub fn with_limit(n: usize, limit: usize) -> SimResult<Self> {
        if n == 0 {
            return Err(SimError::Parameter(
                "register needs at least one qubit".into()));
        }
        if n > limit {
            return Err(SimError::ResourceLimit { requested: n, limit });
        }
        let mut amps: na::DVector<C64> = na::DVector::zeros(1 << n);
        amps[0] = C64::from(1.0);
        Ok(Self { n, amps })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// All 2<sup>n</sup> amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[C64] { self.amps.as_slice() }

    /// Squared amplitude magnitudes, indexed by basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Total probability mass; 1 within floating error for any valid state.
    pub fn norm_sqr(&self) -> f64 {
        self.amps.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Set the joint state of `qubits` to the amplitude vector `amps`, where
    /// element `j` weights the assignment placing bit `b` of `j` on qubit
    /// `qubits[b]`.
    ///
    /// This is a seeding operation, not a projection: the chosen subregister
    /// must still be in ∣0…0⟩. Fails on a repeated or out-of-range index, on
    /// a vector of length other than 2<sup>m</sup> for *m* qubits, or on a
    /// vector whose norm deviates from 1 by more than [`TOL`].
    pub fn prepare(&mut self, qubits: &[usize], amps: &[C64])
        -> SimResult<&mut Self>
    {
        check_qubit_list(self.n, qubits)?;
        let m = qubits.len();
        if amps.len() != 1 << m {
            return Err(
                SimError::Dimension { expected: 1 << m, actual: amps.len() });
        }
        let dev = (amps.iter().map(|a| a.norm_sqr()).sum::<f64>() - 1.0).abs();
        if dev > TOL {
            return Err(SimError::Normalization { what: "state vector", dev });
        }
        let qmask: usize = qubits.iter().fold(0, |acc, &q| acc | (1 << q));
        let leak: f64
            = self.amps.iter().enumerate()
            .filter(|(k, _)| k & qmask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        if leak > TOL {
            return Err(SimError::Parameter(
                "subregister must be in the all-zero state before prepare"
                .into()));
        }
        let offs = scatter_table(qubits);
        for base in 0..self.amps.len() {
            if base & qmask != 0 { continue; }
            let seed = self.amps[base];
            for (j, &o) in offs.iter().enumerate() {
                self.amps[base | o] = seed * amps[j];
            }
        }
        Ok(self)
    }

    /// Apply a gate in place.
    ///
    /// Amplitudes are processed in blocks differing only in the gate's target
    /// bits; each block whose control bits are all 1 is multiplied by the
    /// gate's matrix and the rest are left untouched. *O*(2<sup>n</sup>·2<sup>k</sup>)
    /// time, *O*(2<sup>k</sup>) scratch.
    pub fn apply(&mut self, gate: &Gate) -> SimResult<&mut Self> {
        if let Some(q) = gate.qubits().find(|&q| q >= self.n) {
            return Err(SimError::Parameter(
                format!("gate qubit {} outside register of size {}",
                    q, self.n)));
        }
        let dim = self.amps.len();
        let k = gate.num_targets();
        let mat = gate.matrix();
        let tmask: usize
            = gate.targets().iter().fold(0, |acc, &t| acc | (1 << t));
        let cmask: usize
            = gate.controls().iter().fold(0, |acc, &c| acc | (1 << c));
        let offs = scatter_table(gate.targets());
        let mut scratch: Vec<C64> = vec![C64::from(0.0); 1 << k];
        for base in 0..dim {
            if base & tmask != 0 || base & cmask != cmask { continue; }
            for (j, &o) in offs.iter().enumerate() {
                scratch[j] = self.amps[base | o];
            }
            for (i, &o) in offs.iter().enumerate() {
                let mut acc = C64::from(0.0);
                for (j, s) in scratch.iter().enumerate() {
                    acc += mat[(i, j)] * s;
                }
                self.amps[base | o] = acc;
            }
        }
        Ok(self)
    }

    /// Apply every gate of a block in order.
    pub fn apply_block<'a, I>(&mut self, block: I) -> SimResult<&mut Self>
    where I: IntoIterator<Item = &'a Gate>
    {
        for gate in block.into_iter() { self.apply(gate)?; }
        Ok(self)
    }

    /// Draw `shots` independent outcomes over `qubits`, leaving the state
    /// untouched.
    ///
    /// Character `i` of every histogram key is the measured value of
    /// `qubits[i]`; qubits not requested are marginalized by summing their
    /// probability mass. Counts total exactly `shots` and only outcomes with
    /// nonzero mass can appear as keys. Deterministic for a given state and
    /// RNG state.
    pub fn sample<R>(&self, qubits: &[usize], shots: usize, rng: &mut R)
        -> SimResult<Histogram>
    where R: Rng + ?Sized
    {
        check_qubit_list(self.n, qubits)?;
        let m = qubits.len();
        let mut probs: Vec<f64> = vec![0.0; 1 << m];
        for (idx, amp) in self.amps.iter().enumerate() {
            let p = amp.norm_sqr();
            if p == 0.0 { continue; }
            let key: usize
                = qubits.iter().enumerate()
                .fold(0, |acc, (b, &q)| acc | (((idx >> q) & 1) << b));
            probs[key] += p;
        }
        let mut outcomes: Vec<usize> = Vec::new();
        let mut cumul: Vec<f64> = Vec::new();
        let mut total: f64 = 0.0;
        for (key, &p) in probs.iter().enumerate() {
            if p > 0.0 {
                total += p;
                outcomes.push(key);
                cumul.push(total);
            }
        }
        if outcomes.is_empty() {
            return Err(
                SimError::Normalization { what: "state vector", dev: 1.0 });
        }
        let mut hist = Histogram::new();
        for _ in 0..shots {
            let r: f64 = rng.gen::<f64>() * total;
            let pos
                = cumul.partition_point(|&c| c <= r)
                .min(outcomes.len() - 1);
            hist.record(bitstring(outcomes[pos], m));
        }
        Ok(hist)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (idx, amp) in self.amps.iter().enumerate() {
            if amp.norm() < TOL { continue; }
            if !first { write!(f, " ")?; }
            write!(f, "({:+.5}{:+.5}i)∣{}⟩",
                amp.re, amp.im, bitstring(idx, self.n))?;
            first = false;
        }
        if first { write!(f, "0")?; }
        Ok(())
    }
}

/* Histogram ******************************************************************/

/// Frequency counts over measured bitstrings.
///
/// Keys follow the sampling convention: character `i` of a key is the value
/// measured on the `i`-th requested qubit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: FxHashMap<String, usize>,
}

impl Histogram {
    /// Create an empty histogram.
    pub fn new() -> Self { Self::default() }

    pub(crate) fn record(&mut self, key: String) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize { self.counts.len() }

    /// `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Count recorded for `key`; zero if absent.
    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize { self.counts.values().sum() }

    /// Outcomes with their counts, most frequent first; ties broken by key.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        self.counts.iter()
            .map(|(key, &count)| (key.as_str(), count))
            .sorted_by(|l, r| r.1.cmp(&l.1).then_with(|| l.0.cmp(r.0)))
            .collect()
    }

    /// Most frequent outcome, if any; ties broken by key.
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.sorted().first().copied()
    }

    /// Iterate over `(key, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(key, &count)| (key.as_str(), count))
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = (&'a String, &'a usize);
    type IntoIter = std::collections::hash_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter { self.counts.iter() }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.counts.len();
        for (k, (key, count)) in self.sorted().into_iter().enumerate() {
            write!(f, "{} {}", key, count)?;
            if k + 1 < n { writeln!(f)?; }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::TAU;
    use rand::{ rngs::StdRng, SeedableRng };
    use crate::gate::{ self, Gate };
    use super::*;

    fn max_dev(reg: &Register, expect: &[C64]) -> f64 {
        reg.amplitudes().iter().zip(expect)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    // arbitrary single-qubit unitary from Euler angles
    fn random_unitary<R: Rng + ?Sized>(rng: &mut R) -> na::DMatrix<C64> {
        let alpha: f64 = rng.gen::<f64>() * TAU;
        let beta: f64 = rng.gen::<f64>() * TAU;
        let gamma: f64 = rng.gen::<f64>() * TAU;
        let (sin, cos) = (alpha / 2.0).sin_cos();
        let mut u = na::DMatrix::zeros(2, 2);
        u[(0, 0)] = C64::from(cos);
        u[(0, 1)] = -C64::cis(gamma) * sin;
        u[(1, 0)] = C64::cis(beta) * sin;
        u[(1, 1)] = C64::cis(beta + gamma) * cos;
        u
    }

    #[test]
    fn new_register_is_zero_state() {
        let reg = Register::new(3).unwrap();
        assert_eq!(reg.num_qubits(), 3);
        assert_eq!(reg.amplitudes().len(), 8);
        assert_eq!(reg.amplitudes()[0], C64::from(1.0));
        assert!((reg.norm_sqr() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn qubit_limit_is_enforced() {
        assert!(matches!(
            Register::with_limit(5, 4),
            Err(SimError::ResourceLimit { requested: 5, limit: 4 }),
        ));
        assert!(Register::with_limit(4, 4).is_ok());
    }

    #[test]
    fn empty_register_is_rejected() {
        assert!(matches!(Register::new(0), Err(SimError::Parameter(_))));
    }

    #[test]
    fn bell_pair_probabilities() {
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::hadamard(0)).unwrap()
            .apply(&gate::pauli_x(1).controlled([0]).unwrap()).unwrap();
        let probs = reg.probabilities();
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!(probs[1].abs() < 1e-12);
        assert!(probs[2].abs() < 1e-12);
        assert!((probs[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gate_then_adjoint_restores_state() {
        let mut rng = StdRng::seed_from_u64(10546);
        for n in 1..=10 {
            let mut reg = Register::new(n).unwrap();
            // scramble a bit first
            for q in 0..n {
                let g = Gate::unitary(random_unitary(&mut rng), [q]).unwrap();
                reg.apply(&g).unwrap();
            }
            let snapshot = reg.clone();
            for _ in 0..20 {
                let q = rng.gen_range(0..n);
                let g = Gate::unitary(random_unitary(&mut rng), [q]).unwrap();
                reg.apply(&g).unwrap();
                reg.apply(&g.adjoint()).unwrap();
            }
            assert!(max_dev(&reg, snapshot.amplitudes()) < 1e-9);
            assert!((reg.norm_sqr() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn blockwise_matches_full_matrix() {
        let mut rng = StdRng::seed_from_u64(10547);
        let n: usize = 3;
        let mut reg = Register::new(n).unwrap();
        for q in 0..n {
            let g = Gate::unitary(random_unitary(&mut rng), [q]).unwrap();
            reg.apply(&g).unwrap();
        }
        // two-target controlled gate with scrambled target order
        let big = random_unitary(&mut rng).kronecker(&random_unitary(&mut rng));
        let gate = Gate::unitary(big, [2, 0]).unwrap()
            .controlled([1]).unwrap();

        let expect
            = gate.as_matrix(n).unwrap()
            * na::DVector::from_column_slice(reg.amplitudes());
        reg.apply(&gate).unwrap();
        assert!(max_dev(&reg, expect.as_slice()) < 1e-12);
    }

    #[test]
    fn prepare_seeds_subregister() {
        let a = C64::from(0.6);
        let b = C64::new(0.0, 0.8);
        let mut reg = Register::new(3).unwrap();
        reg.prepare(&[1], &[a, b]).unwrap();
        assert!((reg.amplitudes()[0] - a).norm() < 1e-15);
        assert!((reg.amplitudes()[2] - b).norm() < 1e-15);
        assert!((reg.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prepare_whole_register() {
        let amps: Vec<C64>
            = vec![C64::from(0.5), C64::from(0.5), C64::from(0.5),
                C64::new(0.0, 0.5)];
        let mut reg = Register::new(2).unwrap();
        reg.prepare(&[0, 1], &amps).unwrap();
        assert!(max_dev(&reg, &amps) < 1e-15);
    }

    #[test]
    fn prepare_rejects_bad_length() {
        let mut reg = Register::new(2).unwrap();
        let amps = [C64::from(1.0)];
        assert!(matches!(
            reg.prepare(&[0], &amps),
            Err(SimError::Dimension { expected: 2, actual: 1 }),
        ));
    }

    #[test]
    fn prepare_rejects_unnormalized() {
        let mut reg = Register::new(2).unwrap();
        let amps = [C64::from(1.0), C64::from(1.0)];
        assert!(matches!(
            reg.prepare(&[0], &amps),
            Err(SimError::Normalization { .. }),
        ));
    }

    #[test]
    fn prepare_requires_zeroed_subregister() {
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::pauli_x(1)).unwrap();
        let amps = [C64::from(0.0), C64::from(1.0)];
        assert!(matches!(
            reg.prepare(&[1], &amps),
            Err(SimError::Parameter(_)),
        ));
    }

    #[test]
    fn sample_counts_match_shots() {
        let mut rng = StdRng::seed_from_u64(10548);
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::hadamard(0)).unwrap()
            .apply(&gate::pauli_x(1).controlled([0]).unwrap()).unwrap();
        let hist = reg.sample(&[0, 1], 500, &mut rng).unwrap();
        assert_eq!(hist.total(), 500);
        assert_eq!(hist.get("00") + hist.get("11"), 500);
        assert_eq!(hist.get("01"), 0);
        assert_eq!(hist.get("10"), 0);
    }

    #[test]
    fn sample_marginalizes_unrequested_qubits() {
        let mut rng = StdRng::seed_from_u64(10549);
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::hadamard(0)).unwrap()
            .apply(&gate::pauli_x(1).controlled([0]).unwrap()).unwrap();
        let hist = reg.sample(&[0], 2000, &mut rng).unwrap();
        assert_eq!(hist.total(), 2000);
        assert!(hist.get("0") > 0);
        assert!(hist.get("1") > 0);
    }

    #[test]
    fn sample_is_deterministic_under_seed() {
        let mut reg = Register::new(3).unwrap();
        for q in 0..3 { reg.apply(&gate::hadamard(q)).unwrap(); }
        let mut rng0 = StdRng::seed_from_u64(777);
        let mut rng1 = StdRng::seed_from_u64(777);
        let h0 = reg.sample(&[0, 1, 2], 250, &mut rng0).unwrap();
        let h1 = reg.sample(&[0, 1, 2], 250, &mut rng1).unwrap();
        assert_eq!(h0, h1);
    }

    #[test]
    fn sample_leaves_state_untouched() {
        let mut rng = StdRng::seed_from_u64(10550);
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::hadamard(0)).unwrap();
        let snapshot = reg.clone();
        reg.sample(&[0, 1], 100, &mut rng).unwrap();
        assert_eq!(reg, snapshot);
    }

    #[test]
    fn sample_respects_qubit_order() {
        let mut rng = StdRng::seed_from_u64(10551);
        let mut reg = Register::new(2).unwrap();
        reg.apply(&gate::pauli_x(1)).unwrap();
        let hist = reg.sample(&[1, 0], 10, &mut rng).unwrap();
        assert_eq!(hist.get("10"), 10);
    }

    #[test]
    fn bitstring_puts_qubit_zero_first() {
        assert_eq!(bitstring(6, 5), "01100");
        assert_eq!(bitstring(1, 3), "100");
        assert_eq!(bitstring(0, 2), "00");
    }

    #[test]
    fn histogram_sorts_by_descending_count() {
        let mut hist = Histogram::new();
        for _ in 0..3 { hist.record("00".into()); }
        for _ in 0..5 { hist.record("10".into()); }
        hist.record("11".into());
        assert_eq!(
            hist.sorted(),
            vec![("10", 5), ("00", 3), ("11", 1)],
        );
        assert_eq!(hist.most_frequent(), Some(("10", 5)));
        assert_eq!(hist.total(), 9);
        assert_eq!(hist.iter().map(|(_, count)| count).sum::<usize>(), 9);
        let mut seen = 0;
        for (key, &count) in &hist {
            seen += 1;
            assert_eq!(hist.get(key), count);
        }
        assert_eq!(seen, hist.len());
    }
}
