use anyhow::Result;
use heteroswarm::behavior::{BehaviorPool, ClampBoundary};
use heteroswarm::config::EngineConfig;
use heteroswarm::measurement::diversity;
use heteroswarm::problem::SimpleProblem;
use heteroswarm::topology::Ring;
use heteroswarm::Pso;
use ndarray::Array1;
use std::sync::Arc;

const CONFIG: &str = r#"
swarm:
  population_size: 40
  max_iterations: 300
  seed: 2024
adaptive:
  window_size: 10
  tournament_fraction: 0.4
  stagnation_threshold: 5
"#;

fn rastrigin(x: &Array1<f64>) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|v| v * v - 10.0 * (2.0 * std::f64::consts::PI * v).cos())
            .sum::<f64>()
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    heteroswarm::init();

    println!("Heteroswarm v{}", heteroswarm::version());
    println!("==========================================");
    println!();

    let config = EngineConfig::from_yaml_str(CONFIG)?;
    let problem = SimpleProblem::new(rastrigin, 10, -5.12, 5.12);
    let pool = BehaviorPool::classic(Arc::new(ClampBoundary));
    let names: Vec<String> = pool.iter().map(|b| b.name().to_string()).collect();

    let mut pso = Pso::adaptive(&config, problem, pool, Ring::default())?;

    println!("=== Rastrigin, 10 dimensions, lbest ring ===");
    for _ in 0..config.swarm.max_iterations {
        pso.step()?;
        if pso.iteration() % 50 == 0 {
            let best = pso.best().map(|p| p.best_fitness()).unwrap_or(f64::NAN);
            let profile = pso.behavior_profile().unwrap_or_default();
            println!(
                "iter {:>4}  best {:>10.4}  diversity {:>8.4}  profile {:?}",
                pso.iteration(),
                best,
                diversity(pso.topology()),
                profile
            );
        }
    }

    let result = pso.result();
    println!();
    println!("Best fitness: {:.6}", result.best_fitness);
    println!("Evaluations:  {}", result.evaluations);
    println!();
    println!("{:<16} {:>10} {:>10} {:>8}", "behavior", "selected", "successes", "weight");
    for (name, stats) in names.iter().zip(pso.behavior_stats()) {
        println!(
            "{:<16} {:>10} {:>10} {:>8}",
            name, stats.selections, stats.successes, stats.weight
        );
    }
    Ok(())
}
