use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ideal_fit::sink::{CsvSink, Sink};
use ideal_fit::{Frame, Table};

/// Number of ideal functions in the catalog.
const N_IDEAL: usize = 50;
/// Ideal functions the four training series are drawn from.
const TRAINING_SOURCES: [usize; 4] = [7, 18, 31, 42];
const N_TEST: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Write synthetic train/ideal/test CSV files", long_about = None)]
struct Args {
    /// Output directory
    #[arg(default_value = "Data")]
    out_dir: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Ideal function `k` (1-based) evaluated at `x`.
fn ideal(k: usize, x: f64) -> f64 {
    let a = 1.0 + (k % 5) as f64;
    match k % 5 {
        0 => a * x,
        1 => (x / a).sin() * 10.0,
        2 => 0.05 * a * x * x - 5.0,
        3 => (x / a).cos() * 8.0 + a,
        _ => a * (x / 10.0).tanh() * 12.0 - x,
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { out_dir, seed } = Args::parse();
    let mut rng = SimpleRng::new(seed);

    // x: -20.0 → 19.9, step 0.1
    let xs: Vec<f64> = (0..400).map(|i| -20.0 + i as f64 * 0.1).collect();

    let ideal_frame = Frame {
        x: xs.clone(),
        columns: (1..=N_IDEAL)
            .map(|k| (format!("y{k}"), xs.iter().map(|&x| ideal(k, x)).collect()))
            .collect(),
    };

    let train_frame = Frame {
        x: xs.clone(),
        columns: TRAINING_SOURCES
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let y = xs.iter().map(|&x| ideal(k, x) + rng.gauss(0.0, 0.2)).collect();
                (format!("y{}", i + 1), y)
            })
            .collect(),
    };

    // Test points sit on a training source's curve with a little noise;
    // roughly one in ten is pushed far off so it stays unmapped.
    let mut test_x = Vec::with_capacity(N_TEST);
    let mut test_y = Vec::with_capacity(N_TEST);
    for _ in 0..N_TEST {
        let x = xs[rng.below(xs.len())];
        let k = TRAINING_SOURCES[rng.below(TRAINING_SOURCES.len())];
        let mut y = ideal(k, x) + rng.gauss(0.0, 0.15);
        if rng.next_f64() < 0.1 {
            y += rng.gauss(0.0, 5.0).abs() + 5.0;
        }
        test_x.push(x);
        test_y.push(y);
    }
    let test_table = Table::new()
        .with_float("x", test_x)
        .with_float("y", test_y);

    let mut sink = CsvSink::new(&out_dir);
    sink.write_table("train", &train_frame.to_table())?;
    sink.write_table("ideal", &ideal_frame.to_table())?;
    sink.write_table("test", &test_table)?;

    println!(
        "Wrote {} training series, {N_IDEAL} ideal functions ({} samples each) and {N_TEST} test points to {}",
        TRAINING_SOURCES.len(),
        xs.len(),
        out_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_to_data_dir_and_fixed_seed() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.out_dir, PathBuf::from("Data"));
        assert_eq!(args.seed, 42);

        let args = Args::try_parse_from(["generate_sample", "out", "--seed", "7"]).unwrap();
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert_eq!(args.seed, 7);
    }

    #[test]
    fn same_seed_gives_same_stream() {
        let (mut a, mut b) = (SimpleRng::new(7), SimpleRng::new(7));
        for _ in 0..10 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
        assert!(SimpleRng::new(7).below(5) < 5);
    }
}
