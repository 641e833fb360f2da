use statevec_sim::{
    circuit::Simulator,
    grover::{ grover_search, optimal_iterations, rotation_angle },
};

const TARGET: &str = "10111";
const SPACE: usize = 32; // 2^5 basis states
const MARKED: usize = 1;
const SHOTS: usize = 2000;

fn main() {
    let theta = rotation_angle(SPACE, MARKED);
    let iters = optimal_iterations(SPACE, MARKED);
    println!(
        "space {} : {} marked : half-angle {:.4} deg : {} iterations",
        SPACE, MARKED, (theta / 2.0).to_degrees(), iters,
    );

    // checked-bit order is immaterial to the oracle
    let checked: Vec<usize> = vec![1, 4, 2, 3, 0];
    let mut sim = Simulator::new(None);
    let hist
        = grover_search(&mut sim, SPACE, MARKED, TARGET, Some(&checked), SHOTS)
        .unwrap();
    println!("{}", hist);
    let (winner, count) = hist.most_frequent().unwrap();
    println!(
        "target {} : winner {} with {} / {} shots",
        TARGET, winner, count, SHOTS,
    );
}
