use num_complex::Complex64 as C64;
use rand::{ Rng, thread_rng };
use statevec_sim::{ gate, qft::qft, register::Register };

const N: usize = 8; // round-trip register size
const REPS: usize = 25;

fn random_state<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<C64> {
    let mut amps: Vec<C64>
        = (0..1_usize << n)
        .map(|_| C64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5))
        .collect();
    let norm: f64 = amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    amps.iter_mut().for_each(|a| { *a /= norm; });
    amps
}

fn main() {
    let mut rng = thread_rng();
    let qubits: Vec<usize> = (0..N).collect();
    let forward = qft(N, false);
    let inverse = qft(N, true);

    let mut worst: f64 = 0.0;
    for _ in 0..REPS {
        let amps = random_state(N, &mut rng);
        let mut reg = Register::new(N).unwrap();
        reg.prepare(&qubits, &amps).unwrap();
        reg.apply_block(&forward).unwrap();
        reg.apply_block(&inverse).unwrap();
        let dev: f64
            = reg.amplitudes().iter().zip(&amps)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max);
        worst = worst.max(dev);
    }
    println!(
        "worst round-trip deviation over {} random {}-qubit states: {:.3e}",
        REPS, N, worst,
    );

    let mut reg = Register::new(3).unwrap();
    reg.apply(&gate::pauli_x(0)).unwrap();
    reg.apply(&gate::pauli_x(2)).unwrap();
    reg.apply_block(&qft(3, false)).unwrap();
    println!("QFT of ∣101⟩:");
    println!("{}", reg);
}
