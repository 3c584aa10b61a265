use anyhow::Result;
use ek_aggregate::{DistributionAggregator, RldOptions, DEFAULT_SMALLEST_EVALUATION_TO_USE};
use ek_engine::{AlgorithmCollection, ProblemUnit};
use ek_targets::{ReferenceMap, RunlengthBasedTargetValues, TargetValues, Targets};
use ek_types::{ProblemId, UnitHeader};
use tracing_subscriber::EnvFilter;

/// Three trials on instances 1..=3, one row per threshold.
fn unit(algorithm: &str, function: u32, rows: Vec<Vec<f64>>) -> Result<ProblemUnit> {
    Ok(ProblemUnit::new(
        UnitHeader::new(algorithm, function, 5).with_precision(1e-8),
        rows,
        vec![500.0, 600.0, 700.0],
        vec![1, 2, 3],
    )?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let nan = f64::NAN;
    let mut collection = AlgorithmCollection::new();
    collection.extend(vec![
        unit("BFGS", 1, vec![vec![1e2, 1.0, 2.0, 1.0], vec![1e-2, 30.0, 45.0, 40.0], vec![1e-8, 90.0, 120.0, nan]])?,
        unit("BFGS", 2, vec![vec![1e2, 3.0, 1.0, 2.0], vec![1e-2, 80.0, nan, 95.0], vec![1e-8, 300.0, nan, nan]])?,
        unit("NM", 1, vec![vec![1e2, 1.0, 1.0, 1.0], vec![1e-2, 60.0, 70.0, 65.0], vec![1e-8, 200.0, 250.0, 210.0]])?,
        unit("NM", 2, vec![vec![1e2, 2.0, 2.0, 5.0], vec![1e-2, 150.0, 140.0, 160.0], vec![1e-8, nan, nan, nan]])?,
    ])?;

    for unit in &collection {
        println!("{}\n", unit.summary(None));
    }

    let fixed = TargetValues::new([1e1, 1e-1, 1e-3, 1e-5, 1e-7]);
    let aggregator = DistributionAggregator::new(&collection);
    let rld = aggregator.run_length_distributions(5, &fixed, None, None, &RldOptions::default())?;
    for (algorithm, distribution) in &rld.per_algorithm {
        println!(
            "{algorithm}: {} entries, solved {:?}",
            distribution.len(),
            distribution.functions_solved
        );
    }

    let ranking = aggregator.get_sorted_algorithms(5, &fixed, None, None, DEFAULT_SMALLEST_EVALUATION_TO_USE)?;
    for (rank, entry) in ranking.ranked.iter().enumerate() {
        println!("#{} {} (score {:.2})", rank + 1, entry.algorithm, entry.score);
    }

    // NM serves as reference for budget-based targets
    let reference: ReferenceMap = collection.iter().filter(|u| u.algorithm_id() == "NM").cloned().collect();
    let budgets = RunlengthBasedTargetValues::new([0.5, 2.0, 10.0, 50.0], reference);
    println!("{} ({})", budgets.short_info(), budgets.labels().join(", "));
    println!("targets on f1: {:?}", budgets.call(ProblemId::new(1, 5))?);

    Ok(())
}
