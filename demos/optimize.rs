//! Evolves a steel truss frame and reports the best design found.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example optimize
//! ```

use girder::{
    Evolver, GenerationRecord, Material, PenaltyFitness, SequentialEvaluator, TrussxAnalyzer,
};
use rand::SeedableRng;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let material = Material::steel();
    let deflection_limit = girder::DEFAULT_DEFLECTION_LIMIT;
    let analyzer = TrussxAnalyzer::new(material, girder::DEFAULT_APEX_LOAD);
    let fitness = PenaltyFitness::new(material.yield_stress, deflection_limit);

    let mut evolver = Evolver::builder(SequentialEvaluator::new(analyzer, fitness))
        .population_size(30)
        .generations(100)
        .observer(|record: &GenerationRecord| {
            if let Some(assessment) = &record.assessment {
                println!(
                    "generation {:>3}: fitness {:>10.2}, mass {:>8.2} kg",
                    record.generation, record.fitness, assessment.mass
                );
            }
        })
        .build()?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    let report = evolver.run(&mut rng)?;

    println!("\nbest design: {}", report.best_frame);
    if let Some(assessment) = report.best_assessment {
        println!("mass = {:.2} kg", assessment.mass);
        println!(
            "max stress = {:.2} MPa (yield = {:.0} MPa)",
            assessment.max_stress / 1.0e6,
            material.yield_stress / 1.0e6
        );
        println!(
            "max deflection = {:.2} mm (limit = {:.0} mm)",
            assessment.max_deflection * 1.0e3,
            deflection_limit * 1.0e3
        );
    }
    Ok(())
}
