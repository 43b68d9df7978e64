//! Solve a small knapsack with progress logging.
//!
//! Run with: RUST_LOG=info cargo run --release -p bnb-mip --example knapsack

use bnb_mip::{solve_mip, solve_mip_with_start, KnapsackRelaxation, LinearModel, MipResult, MipSettings};

/// max 10x0 + 13x1 + 7x2 + 8x3 + 9x4 + 4x5
/// s.t. 5x0 + 7x1 + 4x2 + 5x3 + 6x4 + 3x5 <= 15
///      x binary
fn build_model() -> MipResult<LinearModel> {
    let values = vec![10.0, 13.0, 7.0, 8.0, 9.0, 4.0];
    let weights = vec![5.0, 7.0, 4.0, 5.0, 6.0, 3.0];
    (0..values.len())
        .try_fold(LinearModel::maximize(values), |m, j| m.binary(j))?
        .with_constraint(weights, 15.0)
}

fn main() -> MipResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model = build_model()?;
    let relaxation = KnapsackRelaxation::new(&model)?;

    let mut settings = MipSettings::verbose().with_gap_tol(0.0);
    settings.log_freq = 1;

    println!("--- Cold start ---");
    let sol = solve_mip(&model, &relaxation, &settings)?;
    println!("Status:    {:?}", sol.status);
    println!("Objective: {}", sol.obj_val);
    println!("Solution:  {:?}", sol.x);
    println!("Nodes:     {}", sol.nodes_explored);

    println!("\n--- Warm start from the optimum ---");
    let warm = solve_mip_with_start(&model, &relaxation, &settings, &sol.x)?;
    println!("Status:    {:?}", warm.status);
    println!("Objective: {}", warm.obj_val);
    println!("Nodes:     {}", warm.nodes_explored);

    Ok(())
}
