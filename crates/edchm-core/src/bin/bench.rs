/// Pure Rust core benchmarks for the edchm assemblies.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for data generation,
/// and std::hint::black_box to prevent dead-code elimination.
use std::hint::black_box;
use std::time::{Duration, Instant};

use edchm_core::{gr4j, mini, snow};
use edchm_core::{Forcing, Gr4jParameters, MiniParameters, ModelResult, Resolution, SnowParameters};
use ndarray::Array2;

const REPEATS: usize = 7;

type BenchResult = (&'static str, usize, usize, Duration);

/// Simple LCG PRNG for deterministic data generation.
fn make_data(n_time: usize, n_spat: usize, seed: u64) -> ModelResult<Forcing> {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let shape = (n_time, n_spat);
    let precip = Array2::from_shape_simple_fn(shape, || next_f64() * 10.0);
    let pet = Array2::from_shape_simple_fn(shape, || 0.5 + next_f64() * 4.5);
    let temp = Array2::from_shape_simple_fn(shape, || -10.0 + next_f64() * 30.0);
    Forcing::new(precip, pet, Some(temp), Resolution::Daily)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench<F>(model: &'static str, sizes: &[(usize, usize)], run: F) -> ModelResult<Vec<BenchResult>>
where
    F: Fn(usize, &Forcing) -> ModelResult<Array2<f64>>,
{
    let mut results = Vec::new();
    for &(n_time, n_spat) in sizes {
        let forcing = make_data(n_time, n_spat, 42)?;

        // Warmup, also surfaces parameter errors once
        black_box(run(n_spat, &forcing)?);

        let dur = median_time(|| {
            let _ = black_box(run(n_spat, &forcing));
        });
        results.push((model, n_time, n_spat, dur));
    }
    Ok(results)
}

fn run_all() -> ModelResult<Vec<BenchResult>> {
    let sizes = [(3650, 1), (36500, 1), (3650, 64)];
    let mut all_results = Vec::new();

    all_results.extend(bench("mini", &sizes, |n, f| mini::run(&MiniParameters::uniform(n), f))?);
    all_results.extend(bench("snow", &sizes, |n, f| snow::run(&SnowParameters::uniform(n), f))?);
    all_results.extend(bench("gr4j", &sizes, |n, f| {
        gr4j::run(&Gr4jParameters::uniform(n, 350.0, 0.0, 90.0, 1.7), f)
    })?);
    Ok(all_results)
}

fn main() {
    env_logger::init();
    println!("Pure Rust Core Benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6} {:>6}   {:>12}", "Model", "N", "Units", "Median (ms)");
    println!("----------------------------------------------------");

    match run_all() {
        Ok(all_results) => {
            for (model, n_time, n_spat, dur) in &all_results {
                let ms = dur.as_secs_f64() * 1000.0;
                println!("{:<18} {:>6} {:>6}      {:>8.2}", model, n_time, n_spat, ms);
            }
        }
        Err(e) => eprintln!("benchmark failed: {e}"),
    }

    println!("============================================================");
}
