//! Benchmarking CLI for the bnb-mip branch-and-bound engine.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use bnb_mip::{solve_mip, KnapsackRelaxation, LinearModel, MipSettings, MipSolution};
use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "bnb-bench", about = "Solve seeded random knapsack instances")]
struct Args {
    /// Number of items
    #[arg(long, default_value_t = 30)]
    items: usize,

    /// Instance seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Wall-clock limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Soft iteration budget
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Relative optimality gap
    #[arg(long)]
    gap: Option<f64>,

    /// Skip nodes whose bound set was already explored
    #[arg(long)]
    dedup: bool,

    /// Log search progress
    #[arg(long)]
    verbose: bool,

    /// Print a JSON record instead of the summary
    #[arg(long)]
    json: bool,
}

/// One benchmark record.
#[derive(Debug, Serialize)]
struct BenchRecord {
    items: usize,
    seed: u64,
    threads: usize,
    capacity: f64,
    status: String,
    obj_val: f64,
    selected: Vec<usize>,
    nodes_explored: u64,
    integer_solutions: u64,
    incumbent_updates: u64,
    iterations: u64,
    solve_time_ms: u64,
    wall_time_ms: f64,
}

/// Generate a binary knapsack:
///   maximize    v^T x
///   subject to  w^T x <= capacity
///               x binary
///
/// Values and weights are integers in [1, 100]; capacity is half the total
/// weight, so roughly half the items fit.
fn generate_knapsack(n: usize, seed: u64) -> Result<(LinearModel, f64)> {
    // Simple LCG random number generator, uniform in [0, 1)
    let mut rng_state = seed;
    let mut rand = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((rng_state >> 33) as f64) / ((1u64 << 31) as f64)
    };

    let mut values = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    for _ in 0..n {
        // Correlated values make the instance harder to prune
        let w = (rand() * 100.0).floor() + 1.0;
        let v = (w + rand() * 20.0).floor().min(100.0);
        weights.push(w);
        values.push(v);
    }
    let capacity = (weights.iter().sum::<f64>() / 2.0).floor();

    let model = (0..n)
        .try_fold(LinearModel::maximize(values), |m, j| m.binary(j))?
        .with_constraint(weights, capacity)?;
    Ok((model, capacity))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if args.items == 0 {
        bail!("--items must be at least 1");
    }

    let mut settings = MipSettings::default()
        .with_threads(args.threads)
        .with_dedup(args.dedup);
    settings.verbose = args.verbose;
    if let Some(secs) = args.time_limit {
        settings = settings.with_time_limit(secs);
    }
    if let Some(max_iterations) = args.max_iterations {
        settings = settings.with_max_iterations(max_iterations);
    }
    if let Some(gap) = args.gap {
        settings = settings.with_gap_tol(gap);
    }

    let (model, capacity) =
        generate_knapsack(args.items, args.seed).context("Failed to build knapsack model")?;
    let relaxation = KnapsackRelaxation::new(&model)?;

    log::info!(
        "Knapsack: {} items, capacity {}, seed {}",
        args.items,
        capacity,
        args.seed
    );

    let start = Instant::now();
    let sol = solve_mip(&model, &relaxation, &settings).context("Solve failed")?;
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let record = BenchRecord {
        items: args.items,
        seed: args.seed,
        threads: args.threads,
        capacity,
        status: format!("{:?}", sol.status),
        obj_val: sol.obj_val,
        selected: selected_items(&sol),
        nodes_explored: sol.nodes_explored,
        integer_solutions: sol.integer_solutions,
        incumbent_updates: sol.incumbent_updates,
        iterations: sol.iterations,
        solve_time_ms: sol.solve_time_ms,
        wall_time_ms,
    };

    if args.json {
        let out = serde_json::to_string_pretty(&record).context("Failed to encode record")?;
        println!("{}", out);
    } else {
        print_summary(&record);
    }

    Ok(())
}

fn selected_items(sol: &MipSolution) -> Vec<usize> {
    sol.x
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.5)
        .map(|(j, _)| j)
        .collect()
}

fn print_summary(record: &BenchRecord) {
    println!("\n{}", "=".repeat(60));
    println!("Knapsack (n={}, seed={})", record.items, record.seed);
    println!("{}", "=".repeat(60));
    println!("Status:           {}", record.status);
    println!("Objective:        {:.6e}", record.obj_val);
    println!("Items selected:   {}", record.selected.len());
    println!("Nodes explored:   {}", record.nodes_explored);
    println!("Integer sols:     {}", record.integer_solutions);
    println!("Incumbent moves:  {}", record.incumbent_updates);
    println!("Iterations:       {}", record.iterations);
    println!("Solve time:       {} ms", record.solve_time_ms);
    println!("Wall time:        {:.3} ms", record.wall_time_ms);
    if record.nodes_explored > 0 {
        println!(
            "Time/node:        {:.3} ms",
            record.wall_time_ms / record.nodes_explored as f64
        );
    }
}
