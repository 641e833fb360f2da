use std::f64::consts::TAU;
use num_complex::Complex64 as C64;
use rayon::iter::{ IntoParallelIterator, ParallelIterator };
use statevec_sim::{
    circuit::Simulator,
    gate,
    phase_est::{ estimate_phase, precision_qubits },
};

const PHASE: f64 = 0.6772; // eigenphase to recover
const BITS: usize = 5;
const FAIL_PROB: f64 = 0.01;
const SHOTS: usize = 2000;
const REPS: usize = 8;

fn main() {
    let u = gate::phase(TAU * PHASE, 0).matrix().clone();
    let evec = [C64::from(0.0), C64::from(1.0)];
    let t = precision_qubits(BITS, FAIL_PROB);
    println!(
        "{} estimation qubits for {} bits at {:.0}% failure",
        t, BITS, 100.0 * FAIL_PROB,
    );

    let mut sim = Simulator::new(None);
    let est = estimate_phase(&mut sim, &u, &evec, t, SHOTS).unwrap();
    println!(
        "true phase {:.6} : estimated {:.6} : confidence {:.1}%",
        PHASE, est.phase, 100.0 * est.confidence,
    );
    println!("leading candidates:");
    for (key, count) in est.counts.sorted().into_iter().take(5) {
        let y: usize = key.chars()
            .fold(0, |acc, c| (acc << 1) | usize::from(c == '1'));
        println!(
            "  {} : {:>4} / {} : {:.6}",
            key, count, SHOTS, y as f64 / (1_u64 << t) as f64,
        );
    }

    let mean_confidence: f64
        = (0..REPS).into_par_iter()
        .map(|_| {
            let mut sim = Simulator::new(None);
            estimate_phase(&mut sim, &u, &evec, t, SHOTS)
                .unwrap()
                .confidence
        })
        .sum::<f64>() / REPS as f64;
    println!(
        "mean confidence over {} runs: {:.1}%",
        REPS, 100.0 * mean_confidence,
    );
}
